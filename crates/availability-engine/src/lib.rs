//! # availability-engine
//!
//! Availability scheduling for tutors and counselors.
//!
//! The engine keeps two kinds of availability data correct: concrete dated
//! intervals fetched from the backend, and recurring weekly templates that vary
//! by trimester. It merges and window-replaces the former and projects the
//! latter onto real calendar dates in an explicit timezone, with DST handled by
//! `chrono-tz`.
//!
//! ## Modules
//!
//! - [`owner`]: `Owner = Tutor | Counselor`, checked against the two-field wire form
//! - [`interval`]: Dated availability intervals and their wire records
//! - [`merge`]: Collapse adjacent, same-location intervals
//! - [`store`]: Window replace/clear/query over dated intervals
//! - [`trimester`]: Month → Spring/Summer/Fall resolution
//! - [`template`]: Recurring weekly templates and their store
//! - [`dst`]: DST gap policies (skip, shift, wall clock)
//! - [`localize`]: Template → concrete local intervals for a week or a season
//! - [`client`]: Data API port and `reqwest` adapter
//! - [`sync`]: Fetch/sync coordination into the stores
//! - [`clock`]: Injectable "now"
//! - [`config`]: TOML configuration
//! - [`error`]: Error types

pub mod client;
pub mod clock;
pub mod config;
pub mod dst;
pub mod error;
pub mod interval;
pub mod localize;
pub mod merge;
pub mod owner;
pub mod store;
pub mod sync;
pub mod template;
pub mod trimester;

pub use client::{
    ApiError, AvailabilityApi, AvailabilityQuery, CreateRequest, HttpAvailabilityApi,
    RecurringSave,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ApiConfig, EngineConfig, LocalizeConfig, SyncConfig};
pub use dst::DstPolicy;
pub use error::{AvailabilityError, Result};
pub use interval::{AvailabilityInterval, AvailabilityRecord};
pub use localize::{localize_trimester, localize_week, LocalInterval, LocalTimeInterval};
pub use merge::merge;
pub use owner::{Owner, OwnerRef};
pub use store::WindowReplaceStore;
pub use sync::{SyncCoordinator, SyncParams};
pub use template::{
    LocationMap, RecurringRecord, RecurringTemplate, RecurringTemplateStore, TimeOfDayInterval,
    Weekday, WeekdayMap,
};
pub use trimester::{resolve_trimester, Trimester, TrimesterCalendar};
