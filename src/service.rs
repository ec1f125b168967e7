//! Calendar cache service
//!
//! Serves this week's economic events while keeping upstream traffic low.
//! The cached snapshot stays fresh until its latest event has passed (its
//! horizon); after that the next request refetches. When the upstream is
//! unavailable, whatever snapshot exists is served, however old.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::CacheStore;
use crate::calendar::{CacheEntry, EconomicEvent};
use crate::upstream::{EventFeed, FeedError};

/// Errors returned to callers of [`CalendarService::get_events`]
///
/// Only produced when no snapshot of any age exists. The feed error is shared
/// because every request waiting on the same refresh receives it.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Upstream could not be reached or refused the request
    #[error("upstream calendar feed unavailable: {0}")]
    UpstreamUnavailable(#[source] Arc<FeedError>),

    /// Upstream answered with a body that is not an event list
    #[error("upstream calendar feed returned a malformed payload: {0}")]
    MalformedPayload(#[source] Arc<FeedError>),
}

impl From<Arc<FeedError>> for ServiceError {
    fn from(error: Arc<FeedError>) -> Self {
        if error.is_malformed() {
            ServiceError::MalformedPayload(error)
        } else {
            ServiceError::UpstreamUnavailable(error)
        }
    }
}

impl From<FeedError> for ServiceError {
    fn from(error: FeedError) -> Self {
        Arc::new(error).into()
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of one refresh, handed to every request that waited on it
type RefreshOutcome = Result<Vec<EconomicEvent>, Arc<FeedError>>;

/// A refresh in progress that any number of requests can await
type InFlightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Returns cached or freshly fetched economic events
#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn CacheStore>,
    feed: Arc<dyn EventFeed>,
    clock: Arc<dyn Clock>,
    /// Refresh currently running, if any; concurrent misses all await it
    in_flight: Arc<Mutex<Option<InFlightRefresh>>>,
}

impl CalendarService {
    /// Creates a service using the system clock
    pub fn new(store: Arc<dyn CacheStore>, feed: Arc<dyn EventFeed>) -> Self {
        Self::with_clock(store, feed, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn CacheStore>,
        feed: Arc<dyn EventFeed>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            feed,
            clock,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns this week's events
    ///
    /// # Behavior
    /// - Serves the cached snapshot while `now` is before its horizon
    /// - Otherwise fetches from upstream and replaces the snapshot
    /// - On fetch failure, serves the existing snapshot without rewriting it
    /// - Fails only when the fetch fails and nothing is cached
    ///
    /// Requests that miss while a refresh is running wait for that refresh
    /// and share its outcome, stale fallback included. They never start a
    /// second upstream fetch.
    pub async fn get_events(&self) -> Result<Vec<EconomicEvent>, ServiceError> {
        if let Some(entry) = self.read_cache().await {
            if entry.is_fresh_at(self.clock.now()) {
                tracing::debug!(horizon = %entry.horizon, "serving cached economic events");
                return Ok(entry.events);
            }
        }

        let refresh = self.join_refresh().await;
        refresh.await.map_err(ServiceError::from)
    }

    /// Returns the running refresh, starting one if none is in flight
    async fn join_refresh(&self) -> InFlightRefresh {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(refresh) = in_flight.as_ref() {
            tracing::debug!("joining in-flight economic events refresh");
            return refresh.clone();
        }

        let service = self.clone();
        let refresh = async move {
            let outcome = service.refresh().await;
            *service.in_flight.lock().await = None;
            outcome
        }
        .boxed()
        .shared();

        *in_flight = Some(refresh.clone());
        refresh
    }

    /// Fetches from upstream, falling back to whatever snapshot exists
    async fn refresh(&self) -> RefreshOutcome {
        // A refresh that finished just before this one started may have
        // already replaced the snapshot.
        let cached = self.read_cache().await;
        let now = self.clock.now();
        if let Some(entry) = &cached {
            if entry.is_fresh_at(now) {
                tracing::debug!(horizon = %entry.horizon, "snapshot refreshed by a concurrent request");
                return Ok(entry.events.clone());
            }
        }

        tracing::info!(source = %self.feed.describe(), "fetching fresh economic events");
        match self.feed.fetch(now).await {
            Ok(events) => {
                let entry = CacheEntry::new(events, self.clock.now());
                tracing::info!(
                    count = entry.events.len(),
                    horizon = %entry.horizon,
                    "fetched economic events"
                );
                self.write_cache(&entry).await;
                Ok(entry.events)
            }
            Err(error) => match cached {
                Some(entry) => {
                    tracing::warn!(
                        error = %error,
                        captured_at = %entry.captured_at,
                        "upstream fetch failed, serving stale economic events"
                    );
                    Ok(entry.events)
                }
                None => {
                    tracing::error!(error = %error, "upstream fetch failed and no cached events exist");
                    Err(Arc::new(error))
                }
            },
        }
    }

    /// Reads the snapshot, treating store errors as a miss
    async fn read_cache(&self) -> Option<CacheEntry> {
        match self.store.read().await {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(error = %error, "failed to read economic events cache");
                None
            }
        }
    }

    /// Writes the snapshot; failures are logged and ignored
    async fn write_cache(&self, entry: &CacheEntry) {
        if let Err(error) = self.store.write(entry).await {
            tracing::warn!(error = %error, "failed to write economic events cache");
        }
    }
}
