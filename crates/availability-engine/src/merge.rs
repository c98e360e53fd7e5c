//! Collapse an owner's availability intervals into the minimal sorted form.
//!
//! Sorts intervals by start time, then folds left, joining an interval onto the
//! previous one only when it begins exactly where the previous one ends *and*
//! both carry the same location. A location change always starts a new
//! interval, even when the times are contiguous.

use chrono::Duration;

use crate::interval::AvailabilityInterval;

/// Merge exactly-adjacent, same-location intervals for a single owner.
///
/// Overlapping (as opposed to adjacent) input is a caller precondition
/// violation; such intervals are passed through side by side, not collapsed.
/// The result is idempotent: `merge(merge(x)) == merge(x)`.
pub fn merge(mut intervals: Vec<AvailabilityInterval>) -> Vec<AvailabilityInterval> {
    if intervals.len() < 2 {
        return intervals;
    }

    // Sort by start time (then by end time for stability).
    intervals.sort_by_key(|iv| (iv.start(), iv.end()));

    let mut merged: Vec<AvailabilityInterval> = Vec::with_capacity(intervals.len());
    for current in intervals {
        if let Some(last) = merged.last_mut() {
            if last.end() == current.start() && last.location() == current.location() {
                last.extend_to(current.end());
                continue;
            }
        }
        merged.push(current);
    }

    merged
}

/// Total owner-time represented by a list of intervals.
pub fn total_duration(intervals: &[AvailabilityInterval]) -> Duration {
    intervals
        .iter()
        .fold(Duration::zero(), |acc, iv| acc + iv.duration())
}
