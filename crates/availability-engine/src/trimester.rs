//! Trimester buckets: a three-way partition of the calendar year by month.
//!
//! Recurring templates vary by season. [`TrimesterCalendar`] holds the two
//! cutover months (the first month of Summer and the first month of Fall);
//! Spring always starts in January and Fall always runs through December, so
//! every month lands in exactly one bucket.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    Spring,
    Summer,
    Fall,
}

impl Trimester {
    pub const ALL: [Trimester; 3] = [Trimester::Spring, Trimester::Summer, Trimester::Fall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trimester::Spring => "spring",
            Trimester::Summer => "summer",
            Trimester::Fall => "fall",
        }
    }
}

impl fmt::Display for Trimester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trimester {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Trimester::Spring),
            "summer" => Ok(Trimester::Summer),
            "fall" => Ok(Trimester::Fall),
            other => Err(AvailabilityError::InvalidConfig(format!(
                "unknown trimester {:?}",
                other
            ))),
        }
    }
}

/// Month cutovers for the trimester partition.
///
/// Spring = `[1, summer_start)`, Summer = `[summer_start, fall_start)`,
/// Fall = `[fall_start, 12]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCalendar")]
pub struct TrimesterCalendar {
    summer_start: u32,
    fall_start: u32,
}

impl TrimesterCalendar {
    /// Build a calendar from the first month of Summer and of Fall.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidConfig` unless
    /// `2 <= summer_start < fall_start <= 12`, which is what keeps each
    /// trimester non-empty.
    pub fn new(summer_start: u32, fall_start: u32) -> Result<Self> {
        if !(2..=12).contains(&summer_start) || !(2..=12).contains(&fall_start) {
            return Err(AvailabilityError::InvalidConfig(format!(
                "trimester cutover months must be in 2..=12, got summer_start={} fall_start={}",
                summer_start, fall_start
            )));
        }
        if summer_start >= fall_start {
            return Err(AvailabilityError::InvalidConfig(format!(
                "summer_start ({}) must come before fall_start ({})",
                summer_start, fall_start
            )));
        }
        Ok(Self {
            summer_start,
            fall_start,
        })
    }

    pub fn summer_start(&self) -> u32 {
        self.summer_start
    }

    pub fn fall_start(&self) -> u32 {
        self.fall_start
    }

    /// Resolve a date to its trimester. Only the month matters.
    pub fn resolve(&self, date: NaiveDate) -> Trimester {
        self.resolve_month(date.month())
    }

    /// Resolve a 1-based month number. Months past 12 fall into Fall.
    pub fn resolve_month(&self, month: u32) -> Trimester {
        if month < self.summer_start {
            Trimester::Spring
        } else if month < self.fall_start {
            Trimester::Summer
        } else {
            Trimester::Fall
        }
    }
}

impl Default for TrimesterCalendar {
    /// Spring January–April, Summer May–August, Fall September–December.
    fn default() -> Self {
        Self {
            summer_start: 5,
            fall_start: 9,
        }
    }
}

#[derive(Deserialize)]
struct RawCalendar {
    #[serde(default = "default_summer_start")]
    summer_start: u32,
    #[serde(default = "default_fall_start")]
    fall_start: u32,
}

fn default_summer_start() -> u32 {
    TrimesterCalendar::default().summer_start
}

fn default_fall_start() -> u32 {
    TrimesterCalendar::default().fall_start
}

impl TryFrom<RawCalendar> for TrimesterCalendar {
    type Error = AvailabilityError;

    fn try_from(raw: RawCalendar) -> Result<Self> {
        TrimesterCalendar::new(raw.summer_start, raw.fall_start)
    }
}

/// Resolve a date using the default calendar.
pub fn resolve_trimester(date: NaiveDate) -> Trimester {
    TrimesterCalendar::default().resolve(date)
}
