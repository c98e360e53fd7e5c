//! Authoritative in-memory table of dated availability, keyed by owner.
//!
//! The store supports two distinct window operations that must not be confused:
//!
//! - [`WindowReplaceStore::replace`] swaps everything an owner has in a window
//!   for a new, non-empty list. An empty list is rejected outright.
//! - [`WindowReplaceStore::clear`] removes everything an owner has in a window.
//!
//! Both use the boundary rule of [`AvailabilityInterval::overlaps_window`]: an
//! interval that merely touches a window edge is inside the window. Every check
//! runs before the first mutation, so an operation either fully applies or
//! leaves the store unchanged.
//!
//! The store performs no locking. At most one writer per owner is assumed;
//! callers serialize `replace`/`clear` for the same owner themselves.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{AvailabilityError, Result};
use crate::interval::{AvailabilityInterval, AvailabilityRecord};
use crate::merge::merge;
use crate::owner::Owner;

#[derive(Debug, Clone, Default)]
pub struct WindowReplaceStore {
    intervals: BTreeMap<Owner, Vec<AvailabilityInterval>>,
}

impl WindowReplaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every interval of `owner` inside the window with `merge(intervals)`.
    ///
    /// Intervals of other owners, and intervals of `owner` fully outside the
    /// window, are kept.
    ///
    /// # Errors
    /// - `InvalidReplace` if `intervals` is empty (use [`clear`](Self::clear)).
    /// - `InvalidWindow` if `window_start > window_end`.
    /// - `InvariantViolation` if any interval belongs to another owner.
    pub fn replace(
        &mut self,
        owner: Owner,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        intervals: Vec<AvailabilityInterval>,
    ) -> Result<()> {
        if intervals.is_empty() {
            return Err(AvailabilityError::InvalidReplace(format!(
                "empty interval list for {}; clear the window instead",
                owner
            )));
        }
        check_window(window_start, window_end)?;
        if let Some(foreign) = intervals.iter().find(|iv| iv.owner() != owner) {
            return Err(AvailabilityError::InvariantViolation(format!(
                "interval for {} passed to replace for {}",
                foreign.owner(),
                owner
            )));
        }

        let merged = merge(intervals);
        let entry = self.intervals.entry(owner).or_default();
        let before = entry.len();
        entry.retain(|iv| !iv.overlaps_window(window_start, window_end));
        let removed = before - entry.len();
        let inserted = merged.len();
        entry.extend(merged);
        entry.sort_by_key(|iv| (iv.start(), iv.end()));

        debug!(
            %owner,
            window_start = %window_start,
            window_end = %window_end,
            removed,
            inserted,
            "replaced availability window"
        );
        Ok(())
    }

    /// Remove every interval of `owner` that is not fully outside the window.
    ///
    /// Returns the number of intervals removed.
    ///
    /// # Errors
    /// `InvalidWindow` if `window_start > window_end`.
    pub fn clear(
        &mut self,
        owner: Owner,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<usize> {
        check_window(window_start, window_end)?;

        let removed = match self.intervals.get_mut(&owner) {
            Some(entry) => {
                let before = entry.len();
                entry.retain(|iv| !iv.overlaps_window(window_start, window_end));
                let removed = before - entry.len();
                if entry.is_empty() {
                    self.intervals.remove(&owner);
                }
                removed
            }
            None => 0,
        };

        debug!(
            %owner,
            window_start = %window_start,
            window_end = %window_end,
            removed,
            "cleared availability window"
        );
        Ok(removed)
    }

    /// Intervals of `owner` touching the window, sorted by start, unmerged.
    pub fn query(
        &self,
        owner: Owner,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<AvailabilityInterval> {
        let mut found: Vec<AvailabilityInterval> = self
            .intervals
            .get(&owner)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|iv| iv.overlaps_window(window_start, window_end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|iv| (iv.start(), iv.end()));
        found
    }

    /// Reconcile raw Data API records into the window.
    ///
    /// Every record is validated first; a record with both or neither owner
    /// field, or one filed under another owner, fails the whole call with the
    /// store untouched. A non-empty result replaces the window, an empty one
    /// clears it.
    pub fn ingest(
        &mut self,
        owner: Owner,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        records: Vec<AvailabilityRecord>,
    ) -> Result<Vec<AvailabilityInterval>> {
        let intervals = records
            .into_iter()
            .map(AvailabilityInterval::try_from)
            .collect::<Result<Vec<_>>>()?;

        if intervals.is_empty() {
            self.clear(owner, window_start, window_end)?;
            return Ok(Vec::new());
        }

        let merged = merge(intervals);
        self.replace(owner, window_start, window_end, merged.clone())?;
        Ok(merged)
    }

    /// Whether `owner` is available for the whole of `[start, end)`.
    ///
    /// Location is ignored: contiguous intervals at different locations still
    /// cover the span together.
    pub fn covers(&self, owner: Owner, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start >= end {
            return false;
        }

        let mut cursor = start;
        for iv in self.query(owner, start, end) {
            if iv.start() > cursor {
                return false;
            }
            cursor = cursor.max(iv.end());
            if cursor >= end {
                return true;
            }
        }
        false
    }

    pub fn owners(&self) -> impl Iterator<Item = Owner> + '_ {
        self.intervals.keys().copied()
    }

    /// Total number of stored intervals across all owners.
    pub fn len(&self) -> usize {
        self.intervals.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_window(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Result<()> {
    if window_start > window_end {
        return Err(AvailabilityError::InvalidWindow(format!(
            "window start {} is after window end {}",
            window_start.to_rfc3339(),
            window_end.to_rfc3339()
        )));
    }
    Ok(())
}
