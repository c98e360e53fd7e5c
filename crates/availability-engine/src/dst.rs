//! DST transition policies for localized availability.

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for wall-clock times that fall in a DST gap.
///
/// Ambiguous wall-clock times (the repeated hour when clocks fall back) always
/// resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop intervals whose start or end falls in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid minute after the gap
    ShiftForward,
    /// Keep the offset in force before the gap, so 2:30 AM reads as 3:30 AM
    #[default]
    WallClock,
}

/// Anchor a local wall-clock time in `tz`, applying `policy` to DST gaps.
///
/// Returns `None` only under [`DstPolicy::Skip`] when the time does not exist.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&local).earliest() {
        return Some(dt);
    }

    match policy {
        DstPolicy::Skip => None,
        DstPolicy::ShiftForward => (1..=24 * 60)
            .map(|m| local + Duration::minutes(m))
            .find_map(|candidate| tz.from_local_datetime(&candidate).earliest()),
        DstPolicy::WallClock => {
            // Gaps are at most a few hours wide; six hours back is safely before it.
            let before = tz
                .offset_from_local_datetime(&(local - Duration::hours(6)))
                .earliest()?
                .fix();
            before
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(tz))
        }
    }
}
