//! TOML configuration for the engine and its Data API client.
//!
//! Every section and field has a default, so an empty file is a valid config:
//!
//! ```toml
//! [trimesters]
//! summer_start = 5
//! fall_start = 9
//!
//! [sync]
//! horizon_days = 14
//!
//! [api]
//! base_url = "https://api.example.com/v1"
//! timeout_seconds = 30
//!
//! [localize]
//! dst_policy = "wall_clock"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dst::DstPolicy;
use crate::error::{AvailabilityError, Result};
use crate::trimester::TrimesterCalendar;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trimesters: TrimesterCalendar,
    pub sync: SyncConfig,
    pub api: ApiConfig,
    pub localize: LocalizeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Days past "now" covered by a sync with no explicit end.
    pub horizon_days: i64,
}

impl SyncConfig {
    /// Longest accepted horizon, about ten years.
    pub const MAX_HORIZON_DAYS: i64 = 3660;
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { horizon_days: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: 30,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizeConfig {
    pub dst_policy: DstPolicy,
}

impl EngineConfig {
    /// Load and validate a config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the types alone do not enforce.
    ///
    /// Trimester cutovers are already validated while deserializing.
    pub fn validate(&self) -> Result<()> {
        if !(1..=SyncConfig::MAX_HORIZON_DAYS).contains(&self.sync.horizon_days) {
            return Err(AvailabilityError::InvalidConfig(format!(
                "sync.horizon_days must be in 1..={}, got {}",
                SyncConfig::MAX_HORIZON_DAYS,
                self.sync.horizon_days
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(AvailabilityError::InvalidConfig(
                "api.timeout_seconds must be positive".to_string(),
            ));
        }
        if let Some(base_url) = &self.api.base_url {
            let url = Url::parse(base_url).map_err(|e| {
                AvailabilityError::InvalidConfig(format!("api.base_url {:?}: {}", base_url, e))
            })?;
            if url.cannot_be_a_base() {
                return Err(AvailabilityError::InvalidConfig(format!(
                    "api.base_url {:?} cannot be a base URL",
                    base_url
                )));
            }
        }
        Ok(())
    }
}
