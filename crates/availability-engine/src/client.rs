//! Data API port and its HTTP adapter.
//!
//! The engine never talks to the network directly; [`crate::sync`] goes
//! through the [`AvailabilityApi`] trait. [`HttpAvailabilityApi`] implements it
//! with `reqwest` against the backend's REST endpoints:
//!
//! - `GET  {base}/availability`
//! - `POST {base}/availability`
//! - `GET  {base}/recurring-availability`
//! - `POST {base}/recurring-availability`
//!
//! There is no retry or backoff here. Each call is a single request.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::interval::{AvailabilityInterval, AvailabilityRecord};
use crate::owner::{Owner, OwnerRef};
use crate::template::{LocationMap, RecurringRecord, WeekdayMap};
use crate::trimester::Trimester;

/// Failures at the Data API boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Data API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Data API unavailable: {0}")]
    Unavailable(String),
}

/// Parameters of `GET availability`. The boolean flags change what the
/// backend returns (e.g. booked sessions subtracted) and are opaque here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub owner: Owner,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude_sessions: Option<bool>,
    pub use_recurring_availability: Option<bool>,
    pub location: Option<u64>,
    pub for_availability_view: Option<bool>,
}

impl AvailabilityQuery {
    /// Query-string pairs; unset flags are omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (self.owner.param_name(), self.owner.id().to_string()),
            ("start", self.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", self.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        if let Some(flag) = self.exclude_sessions {
            params.push(("exclude_sessions", flag.to_string()));
        }
        if let Some(flag) = self.use_recurring_availability {
            params.push(("use_recurring_availability", flag.to_string()));
        }
        if let Some(location) = self.location {
            params.push(("location", location.to_string()));
        }
        if let Some(flag) = self.for_availability_view {
            params.push(("for_availability_view", flag.to_string()));
        }
        params
    }
}

/// Body of `POST availability`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub owner: Owner,
    pub intervals: Vec<AvailabilityInterval>,
    pub exclude_sessions: Option<bool>,
    /// IANA zone of the caller, so the backend can honor local offsets.
    pub timezone: Option<String>,
}

/// Body of `POST recurring-availability`: one trimester of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringSave {
    pub owner: Owner,
    pub trimester: Trimester,
    pub availability: WeekdayMap,
    pub locations: LocationMap,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    owner: OwnerRef,
    availability: Vec<AvailabilityRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_sessions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
}

#[derive(Serialize)]
struct RecurringBody<'a> {
    #[serde(flatten)]
    owner: OwnerRef,
    trimester: Trimester,
    availability: &'a WeekdayMap,
    locations: &'a LocationMap,
}

#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    /// `GET availability` for one owner and window.
    async fn fetch_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailabilityRecord>, ApiError>;

    /// `POST availability`; returns the server's authoritative merged result.
    async fn create_availability(
        &self,
        request: &CreateRequest,
    ) -> Result<Vec<AvailabilityRecord>, ApiError>;

    /// `GET recurring-availability`; `None` when the owner has no template yet.
    async fn fetch_recurring(
        &self,
        owner: Owner,
        trimester: Option<Trimester>,
    ) -> Result<Option<RecurringRecord>, ApiError>;

    /// `POST recurring-availability`; returns the whole updated template.
    async fn save_recurring(&self, save: &RecurringSave) -> Result<RecurringRecord, ApiError>;
}

/// `reqwest`-backed [`AvailabilityApi`].
#[derive(Debug, Clone)]
pub struct HttpAvailabilityApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpAvailabilityApi {
    /// Build a client from `[api]` configuration.
    ///
    /// # Errors
    /// `ApiError::Unavailable` when no `base_url` is configured,
    /// `ApiError::Url` when it does not parse.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| ApiError::Unavailable("no api.base_url configured".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Unavailable(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "data api response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AvailabilityApi for HttpAvailabilityApi {
    async fn fetch_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailabilityRecord>, ApiError> {
        let url = self.endpoint("availability")?;
        self.send(self.client.get(url).query(&query.to_params()))
            .await
    }

    async fn create_availability(
        &self,
        request: &CreateRequest,
    ) -> Result<Vec<AvailabilityRecord>, ApiError> {
        let url = self.endpoint("availability")?;
        let body = CreateBody {
            owner: request.owner.to_ref(),
            availability: request.intervals.iter().map(AvailabilityRecord::from).collect(),
            exclude_sessions: request.exclude_sessions,
            timezone: request.timezone.as_deref(),
        };
        self.send(self.client.post(url).json(&body)).await
    }

    async fn fetch_recurring(
        &self,
        owner: Owner,
        trimester: Option<Trimester>,
    ) -> Result<Option<RecurringRecord>, ApiError> {
        let url = self.endpoint("recurring-availability")?;
        let mut params = vec![(owner.param_name(), owner.id().to_string())];
        if let Some(trimester) = trimester {
            params.push(("trimester", trimester.to_string()));
        }
        match self.send(self.client.get(url).query(&params)).await {
            Ok(record) => Ok(Some(record)),
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn save_recurring(&self, save: &RecurringSave) -> Result<RecurringRecord, ApiError> {
        let url = self.endpoint("recurring-availability")?;
        let body = RecurringBody {
            owner: save.owner.to_ref(),
            trimester: save.trimester,
            availability: &save.availability,
            locations: &save.locations,
        };
        self.send(self.client.post(url).json(&body)).await
    }
}
