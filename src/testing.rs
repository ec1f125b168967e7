//! Test doubles shared by unit tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::cache::{CacheError, CacheStore};
use crate::calendar::{CacheEntry, EconomicEvent, Impact};
use crate::service::Clock;
use crate::upstream::{EventFeed, FeedError};

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn event_at(title: &str, scheduled_at: DateTime<Utc>) -> EconomicEvent {
    EconomicEvent {
        title: title.to_string(),
        country: "USD".to_string(),
        date: scheduled_at.to_rfc3339(),
        time: None,
        scheduled_at: Some(scheduled_at),
        impact: Impact::High,
        forecast: String::new(),
        previous: String::new(),
        actual: String::new(),
    }
}

/// Clock that only moves when told to
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

enum Outcome {
    Events(Vec<EconomicEvent>),
    Unavailable,
    Malformed,
}

/// Feed with a scripted outcome that counts its calls
pub struct FakeFeed {
    outcome: Outcome,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeFeed {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(events: Vec<EconomicEvent>) -> Self {
        Self::with_outcome(Outcome::Events(events))
    }

    pub fn failing() -> Self {
        Self::with_outcome(Outcome::Unavailable)
    }

    pub fn malformed() -> Self {
        Self::with_outcome(Outcome::Malformed)
    }

    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventFeed for FakeFeed {
    async fn fetch(&self, _reference: DateTime<Utc>) -> Result<Vec<EconomicEvent>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Events(events) => Ok(events.clone()),
            Outcome::Unavailable => Err(FeedError::Status(503)),
            Outcome::Malformed => Err(FeedError::Malformed(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            )),
        }
    }

    fn describe(&self) -> String {
        "fake feed".to_string()
    }
}

/// In-memory store that records writes
#[derive(Default)]
pub struct RecordingStore {
    slot: Mutex<Option<CacheEntry>>,
    writes: AtomicUsize,
}

impl RecordingStore {
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            slot: Mutex::new(Some(entry)),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn last_written(&self) -> Option<CacheEntry> {
        if self.writes() == 0 {
            return None;
        }
        self.slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn read(&self) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = Some(entry.clone());
        Ok(())
    }
}

/// Store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn read(&self) -> Result<Option<CacheEntry>, CacheError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
    }

    async fn write(&self, _entry: &CacheEntry) -> Result<(), CacheError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
    }
}
