//! Concrete, dated availability intervals.
//!
//! [`AvailabilityInterval`] is the validated engine type: one owner, a strictly
//! positive span, and an optional location. [`AvailabilityRecord`] is the shape
//! the Data API speaks, with the owner split across two optional fields and an
//! optional backend id/slug carried along for traceability only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::owner::{Owner, OwnerRef};

/// A single availability interval for one owner.
///
/// Identity is structural: two intervals are equal when owner, start, end, and
/// location all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AvailabilityInterval {
    owner: Owner,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: Option<u64>,
}

impl AvailabilityInterval {
    /// Build an interval, rejecting empty or inverted spans.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidInterval` unless `start < end`.
    pub fn new(
        owner: Owner,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Option<u64>,
    ) -> Result<Self> {
        if start >= end {
            return Err(AvailabilityError::InvalidInterval(format!(
                "start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            owner,
            start,
            end,
            location,
        })
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn location(&self) -> Option<u64> {
        self.location
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether this interval is *not* fully outside `[window_start, window_end]`.
    ///
    /// "Fully outside" uses strict comparison (`end < window_start` or
    /// `start > window_end`), so an interval that only touches a window edge
    /// counts as inside.
    pub fn overlaps_window(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        !(self.end < window_start || self.start > window_end)
    }

    /// Extend the end of an interval already known to be valid. Only merge
    /// calls this, and only with `end` later than the current end.
    pub(crate) fn extend_to(&mut self, end: DateTime<Utc>) {
        debug_assert!(end > self.start);
        self.end = end;
    }

    /// The wire form of this interval, without backend id or slug.
    pub fn to_record(&self) -> AvailabilityRecord {
        AvailabilityRecord {
            id: None,
            slug: None,
            owner: self.owner.to_ref(),
            start: self.start,
            end: self.end,
            location: self.location,
        }
    }
}

/// An availability interval as the Data API sends and accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub owner: OwnerRef,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<u64>,
}

impl TryFrom<AvailabilityRecord> for AvailabilityInterval {
    type Error = AvailabilityError;

    fn try_from(record: AvailabilityRecord) -> Result<Self> {
        let owner = Owner::try_from(record.owner)?;
        AvailabilityInterval::new(owner, record.start, record.end, record.location)
    }
}

impl From<&AvailabilityInterval> for AvailabilityRecord {
    fn from(interval: &AvailabilityInterval) -> Self {
        interval.to_record()
    }
}
