//! Fetch/sync coordination between the Data API and the local stores.
//!
//! [`SyncCoordinator::sync`] fetches an owner's availability for a window and
//! reconciles it into a [`WindowReplaceStore`]:
//!
//! 1. The window defaults to `now .. now + horizon` (14 days unless configured).
//! 2. The Data API is called once, with the pass-through flags untouched.
//! 3. A non-empty response replaces the window.
//! 4. An empty response clears the window. Stale data never survives a
//!    confirmed-empty fetch, and `replace` is never handed an empty list.
//!
//! API failures surface as [`AvailabilityError::ExternalFetch`] and leave the
//! store exactly as it was. There is no retry; callers own retry policy and
//! must serialize concurrent syncs for the same owner.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use crate::client::{AvailabilityApi, AvailabilityQuery, CreateRequest, RecurringSave};
use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::{AvailabilityError, Result};
use crate::interval::AvailabilityInterval;
use crate::owner::Owner;
use crate::store::WindowReplaceStore;
use crate::template::{LocationMap, RecurringTemplate, RecurringTemplateStore, WeekdayMap};
use crate::trimester::Trimester;

/// Window and pass-through flags for one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncParams {
    /// Defaults to now.
    pub start: Option<DateTime<Utc>>,
    /// Defaults to now plus the sync horizon.
    pub end: Option<DateTime<Utc>>,
    pub exclude_sessions: Option<bool>,
    pub use_recurring_availability: Option<bool>,
    pub location: Option<u64>,
    pub for_availability_view: Option<bool>,
}

pub struct SyncCoordinator<A, C = SystemClock> {
    api: A,
    clock: C,
    horizon: Duration,
}

impl<A: AvailabilityApi> SyncCoordinator<A, SystemClock> {
    pub fn new(api: A) -> Self {
        Self::with_clock(api, SystemClock)
    }
}

impl<A: AvailabilityApi, C: Clock> SyncCoordinator<A, C> {
    pub fn with_clock(api: A, clock: C) -> Self {
        Self {
            api,
            clock,
            horizon: horizon(&SyncConfig::default()),
        }
    }

    pub fn from_config(api: A, clock: C, config: &SyncConfig) -> Self {
        Self {
            api,
            clock,
            horizon: horizon(config),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve the effective `[start, end]` window for `params`.
    ///
    /// # Errors
    /// `InvalidWindow` if the resolved start is after the resolved end, or if
    /// the default end lies past the last representable instant.
    pub fn window(&self, params: &SyncParams) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let now = self.clock.now();
        let start = params.start.unwrap_or(now);
        let end = match params.end {
            Some(end) => end,
            None => now.checked_add_signed(self.horizon).ok_or_else(|| {
                AvailabilityError::InvalidWindow(format!(
                    "sync horizon of {} days from {} is out of range",
                    self.horizon.num_days(),
                    now.to_rfc3339()
                ))
            })?,
        };
        if start > end {
            return Err(AvailabilityError::InvalidWindow(format!(
                "sync window start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok((start, end))
    }

    /// Fetch `owner`'s availability and reconcile it into `store`.
    ///
    /// Returns the merged intervals now stored for the window (empty when the
    /// window was cleared).
    #[instrument(skip(self, store, params), fields(%owner))]
    pub async fn sync(
        &self,
        store: &mut WindowReplaceStore,
        owner: Owner,
        params: SyncParams,
    ) -> Result<Vec<AvailabilityInterval>> {
        let (start, end) = self.window(&params)?;
        let query = AvailabilityQuery {
            owner,
            start,
            end,
            exclude_sessions: params.exclude_sessions,
            use_recurring_availability: params.use_recurring_availability,
            location: params.location,
            for_availability_view: params.for_availability_view,
        };

        let records = self.api.fetch_availability(&query).await.map_err(|e| {
            warn!(error = %e, "availability fetch failed; store left unchanged");
            AvailabilityError::ExternalFetch(e)
        })?;

        let fetched = records.len();
        let stored = store.ingest(owner, start, end, records)?;
        info!(
            fetched,
            stored = stored.len(),
            window_start = %start,
            window_end = %end,
            "availability synced"
        );
        Ok(stored)
    }

    /// Create intervals through the Data API and reconcile the server's
    /// authoritative result into `store`.
    ///
    /// The reconciled window spans both the submitted intervals and whatever
    /// the server returns, since the server may merge with neighbors.
    ///
    /// # Errors
    /// - `InvalidInterval` if `intervals` is empty.
    /// - `InvariantViolation` if any interval belongs to another owner.
    /// - `ExternalFetch` on API failure, with the store untouched.
    #[instrument(skip(self, store, intervals, timezone), fields(%owner, submitted = intervals.len()))]
    pub async fn create(
        &self,
        store: &mut WindowReplaceStore,
        owner: Owner,
        intervals: Vec<AvailabilityInterval>,
        exclude_sessions: Option<bool>,
        timezone: Option<String>,
    ) -> Result<Vec<AvailabilityInterval>> {
        if let Some(foreign) = intervals.iter().find(|iv| iv.owner() != owner) {
            return Err(AvailabilityError::InvariantViolation(format!(
                "interval for {} submitted as {}",
                foreign.owner(),
                owner
            )));
        }
        let (mut start, mut end) =
            bounding_window(intervals.iter().map(|iv| (iv.start(), iv.end()))).ok_or_else(
                || AvailabilityError::InvalidInterval("nothing to create".to_string()),
            )?;

        let request = CreateRequest {
            owner,
            intervals,
            exclude_sessions,
            timezone,
        };
        let records = self.api.create_availability(&request).await.map_err(|e| {
            warn!(error = %e, "availability create failed; store left unchanged");
            AvailabilityError::ExternalFetch(e)
        })?;

        if let Some((lo, hi)) = bounding_window(records.iter().map(|r| (r.start, r.end))) {
            start = start.min(lo);
            end = end.max(hi);
        }

        let stored = store.ingest(owner, start, end, records)?;
        info!(stored = stored.len(), "availability created");
        Ok(stored)
    }

    /// Pull `owner`'s recurring template into `templates`.
    ///
    /// Returns `None`, leaving any local copy alone, when the backend has no
    /// template for the owner.
    #[instrument(skip(self, templates), fields(%owner))]
    pub async fn sync_recurring(
        &self,
        templates: &mut RecurringTemplateStore,
        owner: Owner,
    ) -> Result<Option<RecurringTemplate>> {
        let record = self.api.fetch_recurring(owner, None).await.map_err(|e| {
            warn!(error = %e, "recurring template fetch failed");
            AvailabilityError::ExternalFetch(e)
        })?;

        let Some(record) = record else {
            info!("no recurring template on server");
            return Ok(None);
        };

        let template = checked_template(owner, RecurringTemplate::try_from(record)?)?;
        templates.put(template);
        info!("recurring template synced");
        Ok(templates.get(owner).cloned())
    }

    /// Save one trimester of `owner`'s template through the Data API and store
    /// the server's copy of the whole template.
    #[instrument(skip(self, templates, availability, locations), fields(%owner, %trimester))]
    pub async fn save_trimester(
        &self,
        templates: &mut RecurringTemplateStore,
        owner: Owner,
        trimester: Trimester,
        availability: WeekdayMap,
        locations: LocationMap,
    ) -> Result<RecurringTemplate> {
        let save = RecurringSave {
            owner,
            trimester,
            availability,
            locations,
        };
        let record = self.api.save_recurring(&save).await.map_err(|e| {
            warn!(error = %e, "recurring template save failed");
            AvailabilityError::ExternalFetch(e)
        })?;

        let template = checked_template(owner, RecurringTemplate::try_from(record)?)?;
        templates.put(template);
        info!("recurring trimester saved");
        templates.get(owner).cloned().ok_or_else(|| {
            AvailabilityError::InvariantViolation(format!("template for {} not stored", owner))
        })
    }

    /// Reset a trimester to empty days through the Data API.
    pub async fn reset_trimester(
        &self,
        templates: &mut RecurringTemplateStore,
        owner: Owner,
        trimester: Trimester,
    ) -> Result<RecurringTemplate> {
        self.save_trimester(
            templates,
            owner,
            trimester,
            WeekdayMap::new(),
            LocationMap::new(),
        )
        .await
    }
}

/// Out-of-range day counts saturate; `window` then reports the overflow.
fn horizon(config: &SyncConfig) -> Duration {
    Duration::try_days(config.horizon_days).unwrap_or(if config.horizon_days < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

fn checked_template(owner: Owner, template: RecurringTemplate) -> Result<RecurringTemplate> {
    if template.owner != owner {
        return Err(AvailabilityError::InvariantViolation(format!(
            "server returned template for {} when asked for {}",
            template.owner, owner
        )));
    }
    Ok(template)
}

fn bounding_window(
    bounds: impl Iterator<Item = (DateTime<Utc>, DateTime<Utc>)>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    bounds.fold(None, |acc, (start, end)| match acc {
        None => Some((start, end)),
        Some((lo, hi)) => Some((lo.min(start), hi.max(end))),
    })
}
