//! Error types for availability-engine operations.

use thiserror::Error;

use crate::client::ApiError;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// `replace` was called with an empty interval list. Empty results go to `clear`.
    #[error("Invalid replace: {0}")]
    InvalidReplace(String),

    /// A record with both or neither owner field set, or an interval filed
    /// under the wrong owner.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Any failure at the Data API boundary. Stores are left untouched.
    #[error("External fetch failed: {0}")]
    ExternalFetch(#[from] ApiError),

    /// An owner string that is not `tutor:<id>` or `counselor:<id>`.
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
