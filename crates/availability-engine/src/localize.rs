//! Project recurring templates onto concrete dates and timezones.
//!
//! Both entry points are pure: the timezone is an explicit argument and the
//! current time is never consulted, so repeated calls with the same inputs
//! return the same result.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{AvailabilityError, Result};
use crate::template::{RecurringTemplate, TimeOfDayInterval, Weekday};
use crate::trimester::{Trimester, TrimesterCalendar};

/// A template interval anchored on a specific date in a specific zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub location: Option<u64>,
}

/// A template interval anchored only on time of day, for season editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub timezone: String,
    pub location: Option<u64>,
}

/// Parse an IANA timezone name.
///
/// # Errors
/// Returns `AvailabilityError::InvalidTimezone` for unknown names.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| AvailabilityError::InvalidTimezone(timezone.to_string()))
}

/// Localize seven consecutive days starting at `start_date`.
///
/// For each day the trimester is resolved from that day's own month, so a
/// week straddling a cutover mixes trimesters. The result always has seven
/// keys (`YYYY-MM-DD`); days without template data, and every day when the
/// template is absent or inactive, map to empty lists.
///
/// # Errors
/// - `InvalidTimezone` if `timezone` is not a valid IANA identifier.
/// - `InvalidWindow` if the week runs past the last representable date.
pub fn localize_week(
    template: Option<&RecurringTemplate>,
    start_date: NaiveDate,
    timezone: &str,
    calendar: &TrimesterCalendar,
    policy: DstPolicy,
) -> Result<BTreeMap<String, Vec<LocalInterval>>> {
    let tz = parse_timezone(timezone)?;
    let template = template.filter(|t| t.active);

    let mut week = BTreeMap::new();
    for offset in 0..7u64 {
        let day = start_date.checked_add_days(Days::new(offset)).ok_or_else(|| {
            AvailabilityError::InvalidWindow(format!("week starting {} overflows", start_date))
        })?;

        let intervals = match template {
            Some(template) => {
                let trimester = calendar.resolve(day);
                let weekday = Weekday::from(day.weekday());
                let location = template.location(trimester, weekday);
                template
                    .day(trimester, weekday)
                    .iter()
                    .filter_map(|tod| anchor(tod, day, &tz, policy, location))
                    .collect()
            }
            None => Vec::new(),
        };

        week.insert(day.format("%Y-%m-%d").to_string(), intervals);
    }

    Ok(week)
}

/// Localize one trimester of a template by weekday, without any concrete date.
///
/// Always returns all seven weekdays. The `active` flag is ignored: editing a
/// paused template still shows its content.
///
/// # Errors
/// Returns `InvalidTimezone` if `timezone` is not a valid IANA identifier.
pub fn localize_trimester(
    template: Option<&RecurringTemplate>,
    trimester: Trimester,
    timezone: &str,
) -> Result<BTreeMap<Weekday, Vec<LocalTimeInterval>>> {
    let tz = parse_timezone(timezone)?;

    Ok(Weekday::ALL
        .iter()
        .map(|&weekday| {
            let intervals = template
                .map(|t| {
                    let location = t.location(trimester, weekday);
                    t.day(trimester, weekday)
                        .iter()
                        .map(|tod| LocalTimeInterval {
                            start: tod.start(),
                            end: tod.end(),
                            timezone: tz.name().to_string(),
                            location,
                        })
                        .collect()
                })
                .unwrap_or_default();
            (weekday, intervals)
        })
        .collect())
}

fn anchor(
    tod: &TimeOfDayInterval,
    day: NaiveDate,
    tz: &Tz,
    policy: DstPolicy,
    location: Option<u64>,
) -> Option<LocalInterval> {
    let end_day = if tod.crosses_midnight() {
        day.succ_opt()?
    } else {
        day
    };

    let start = resolve_local(tz, day.and_time(tod.start()), policy);
    let end = resolve_local(tz, end_day.and_time(tod.end()), policy);

    match (start, end) {
        (Some(start), Some(end)) if start < end => Some(LocalInterval {
            start: start.fixed_offset(),
            end: end.fixed_offset(),
            location,
        }),
        _ => {
            debug!(
                %day,
                start = %tod.start(),
                end = %tod.end(),
                timezone = tz.name(),
                "dropping interval that does not exist in local time"
            );
            None
        }
    }
}
