//! Core data models for the economic calendar
//!
//! This module contains the event type served to callers and the snapshot
//! persisted by the cache store.

pub mod normalize;

pub use normalize::{decode_payload, parse_schedule, FeedPayload, RawRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market impact of a scheduled release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
    Holiday,
    Unknown,
}

impl Impact {
    /// Maps an upstream impact label to an `Impact`
    ///
    /// Accepts plain labels ("High", "medium") as well as the longer
    /// descriptions some sources use ("High Impact Expected"). Anything
    /// unrecognized becomes `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        let first = label.split_whitespace().next().unwrap_or("");
        match first {
            "high" => Impact::High,
            "medium" | "med" => Impact::Medium,
            "low" => Impact::Low,
            "holiday" => Impact::Holiday,
            _ => Impact::Unknown,
        }
    }
}

/// One scheduled entry on the economic calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicEvent {
    /// Event name, e.g. "CPI m/m"
    pub title: String,
    /// Country or currency code the release affects
    pub country: String,
    /// Date exactly as the upstream sent it
    pub date: String,
    /// Time of day as the upstream sent it, when separate from the date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Parsed release instant; `None` when the upstream date is unparseable
    pub scheduled_at: Option<DateTime<Utc>>,
    pub impact: Impact,
    pub forecast: String,
    pub previous: String,
    /// Only populated once the release has happened
    pub actual: String,
}

/// Snapshot of one successful upstream fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Events in upstream order
    pub events: Vec<EconomicEvent>,
    /// When the fetch completed
    pub captured_at: DateTime<Utc>,
    /// Scheduled time of the latest event; the entry expires once it passes
    pub horizon: DateTime<Utc>,
}

impl CacheEntry {
    /// Builds an entry, deriving the horizon from the events
    pub fn new(events: Vec<EconomicEvent>, captured_at: DateTime<Utc>) -> Self {
        let horizon = compute_horizon(&events, captured_at);
        Self {
            events,
            captured_at,
            horizon,
        }
    }

    /// Whether the entry can be served without asking upstream
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.horizon
    }
}

/// Latest scheduled time among `events`, or `fallback` when none is scheduled
///
/// Events with an unparseable date are skipped.
pub fn compute_horizon(events: &[EconomicEvent], fallback: DateTime<Utc>) -> DateTime<Utc> {
    events
        .iter()
        .filter_map(|event| event.scheduled_at)
        .max()
        .unwrap_or(fallback)
}
