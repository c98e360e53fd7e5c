//! Recurring weekly availability templates.
//!
//! Each owner has at most one template. A template holds, per trimester, a map
//! from weekday to an ordered list of time-of-day intervals plus a default
//! location per weekday. Edits only ever replace one trimester at a time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dst::DstPolicy;
use crate::error::{AvailabilityError, Result};
use crate::localize::{self, LocalInterval, LocalTimeInterval};
use crate::owner::{Owner, OwnerRef};
use crate::trimester::{Trimester, TrimesterCalendar};

/// Day name used as a map key. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// A time-of-day span with no date, written as `"HH:mm"` on the wire.
///
/// `end` earlier than `start` means the span runs past midnight into the next
/// day; `end == start` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeOfDay", into = "RawTimeOfDay")]
pub struct TimeOfDayInterval {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeOfDayInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start == end {
            return Err(AvailabilityError::InvalidTimeOfDay(format!(
                "empty interval {}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a pair of `"HH:mm"` strings (seconds are accepted but optional).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| AvailabilityError::InvalidTimeOfDay(format!("expected HH:mm, got {:?}", s)))
}

#[derive(Serialize, Deserialize)]
struct RawTimeOfDay {
    start: String,
    end: String,
}

impl TryFrom<RawTimeOfDay> for TimeOfDayInterval {
    type Error = AvailabilityError;

    fn try_from(raw: RawTimeOfDay) -> Result<Self> {
        TimeOfDayInterval::parse(&raw.start, &raw.end)
    }
}

impl From<TimeOfDayInterval> for RawTimeOfDay {
    fn from(iv: TimeOfDayInterval) -> Self {
        RawTimeOfDay {
            start: iv.start.format("%H:%M").to_string(),
            end: iv.end.format("%H:%M").to_string(),
        }
    }
}

pub type WeekdayMap = BTreeMap<Weekday, Vec<TimeOfDayInterval>>;
pub type LocationMap = BTreeMap<Weekday, Option<u64>>;

/// An owner's standing weekly availability, varied by trimester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub owner: Owner,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub availability: BTreeMap<Trimester, WeekdayMap>,
    #[serde(default)]
    pub locations: BTreeMap<Trimester, LocationMap>,
}

fn default_active() -> bool {
    true
}

/// A recurring template as the Data API sends it, owner split across two
/// optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub owner: OwnerRef,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub availability: BTreeMap<Trimester, WeekdayMap>,
    #[serde(default)]
    pub locations: BTreeMap<Trimester, LocationMap>,
}

impl TryFrom<RecurringRecord> for RecurringTemplate {
    type Error = AvailabilityError;

    fn try_from(record: RecurringRecord) -> Result<Self> {
        Ok(RecurringTemplate {
            owner: Owner::try_from(record.owner)?,
            active: record.active,
            availability: record.availability,
            locations: record.locations,
        })
    }
}

impl RecurringTemplate {
    /// A template with every trimester and weekday present and empty.
    pub fn empty(owner: Owner) -> Self {
        let availability = Trimester::ALL
            .iter()
            .map(|t| (*t, normalize_days(WeekdayMap::new())))
            .collect();
        let locations = Trimester::ALL
            .iter()
            .map(|t| (*t, normalize_locations(LocationMap::new())))
            .collect();
        Self {
            owner,
            active: true,
            availability,
            locations,
        }
    }

    /// Intervals for one weekday of one trimester; empty when absent.
    pub fn day(&self, trimester: Trimester, weekday: Weekday) -> &[TimeOfDayInterval] {
        self.availability
            .get(&trimester)
            .and_then(|days| days.get(&weekday))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Default location for one weekday of one trimester.
    pub fn location(&self, trimester: Trimester, weekday: Weekday) -> Option<u64> {
        self.locations
            .get(&trimester)
            .and_then(|days| days.get(&weekday))
            .copied()
            .flatten()
    }

    fn set_trimester(&mut self, trimester: Trimester, days: WeekdayMap, locations: LocationMap) {
        self.availability.insert(trimester, normalize_days(days));
        self.locations
            .insert(trimester, normalize_locations(locations));
    }
}

fn normalize_days(mut days: WeekdayMap) -> WeekdayMap {
    for weekday in Weekday::ALL {
        days.entry(weekday)
            .or_default()
            .sort_by_key(|iv| (iv.start(), iv.end()));
    }
    days
}

fn normalize_locations(mut locations: LocationMap) -> LocationMap {
    for weekday in Weekday::ALL {
        locations.entry(weekday).or_insert(None);
    }
    locations
}

/// One template per owner, edited a trimester at a time.
#[derive(Debug, Clone, Default)]
pub struct RecurringTemplateStore {
    templates: BTreeMap<Owner, RecurringTemplate>,
}

impl RecurringTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: Owner) -> Option<&RecurringTemplate> {
        self.templates.get(&owner)
    }

    /// Replace one trimester's weekday and location maps, leaving the other
    /// trimesters alone. Creates the template on first save.
    pub fn upsert_trimester(
        &mut self,
        owner: Owner,
        trimester: Trimester,
        days: WeekdayMap,
        locations: LocationMap,
    ) -> &RecurringTemplate {
        let template = self
            .templates
            .entry(owner)
            .or_insert_with(|| RecurringTemplate::empty(owner));
        template.set_trimester(trimester, days, locations);
        debug!(%owner, %trimester, "upserted recurring trimester");
        template
    }

    /// Reset a trimester to empty days with no default locations.
    pub fn clear_trimester(&mut self, owner: Owner, trimester: Trimester) -> &RecurringTemplate {
        self.upsert_trimester(owner, trimester, WeekdayMap::new(), LocationMap::new())
    }

    pub fn set_active(&mut self, owner: Owner, active: bool) -> &RecurringTemplate {
        let template = self
            .templates
            .entry(owner)
            .or_insert_with(|| RecurringTemplate::empty(owner));
        template.active = active;
        template
    }

    /// Store a whole template as returned by the Data API.
    pub fn put(&mut self, mut template: RecurringTemplate) {
        for trimester in Trimester::ALL {
            let days = template.availability.remove(&trimester).unwrap_or_default();
            let locations = template.locations.remove(&trimester).unwrap_or_default();
            template.set_trimester(trimester, days, locations);
        }
        self.templates.insert(template.owner, template);
    }

    /// [`localize::localize_week`] for the owner's stored template.
    pub fn localize_week(
        &self,
        owner: Owner,
        start_date: NaiveDate,
        timezone: &str,
        calendar: &TrimesterCalendar,
        policy: DstPolicy,
    ) -> Result<BTreeMap<String, Vec<LocalInterval>>> {
        localize::localize_week(self.get(owner), start_date, timezone, calendar, policy)
    }

    /// [`localize::localize_trimester`] for the owner's stored template.
    pub fn localize_trimester(
        &self,
        owner: Owner,
        trimester: Trimester,
        timezone: &str,
    ) -> Result<BTreeMap<Weekday, Vec<LocalTimeInterval>>> {
        localize::localize_trimester(self.get(owner), trimester, timezone)
    }
}
