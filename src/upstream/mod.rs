//! Upstream sources of economic events
//!
//! Every source returns events already normalized to [`EconomicEvent`], so
//! the cache layer never sees upstream field names or date formats.

mod command;
mod http;

pub use command::CommandFeed;
pub use http::{HttpFeed, DEFAULT_FEED_URL};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::calendar::{decode_payload, normalize::normalize, EconomicEvent, FeedPayload};

/// Errors that can occur when fetching from an upstream source
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream responded with status {0}")]
    Status(u16),

    /// Upstream did not answer in time
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),

    /// Feed command could not be started
    #[error("failed to run feed command: {0}")]
    Spawn(#[from] std::io::Error),

    /// Feed command exited unsuccessfully
    #[error("feed command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    /// Upstream returned `{"error": ...}` instead of events
    #[error("upstream reported an error: {0}")]
    Reported(String),

    /// Body could not be decoded into event records
    #[error("malformed upstream payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FeedError {
    /// Whether the upstream answered but its body was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Malformed(_))
    }
}

/// A source of this period's economic events
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Fetches and normalizes the current event list
    ///
    /// `reference` is the fetch time; sources that omit the year from their
    /// dates resolve it relative to this instant.
    async fn fetch(&self, reference: DateTime<Utc>) -> Result<Vec<EconomicEvent>, FeedError>;

    /// Short description for log output
    fn describe(&self) -> String;
}

/// Decodes an upstream body and normalizes its records
pub(crate) fn events_from_body(
    body: &str,
    reference: DateTime<Utc>,
    source_offset: FixedOffset,
) -> Result<Vec<EconomicEvent>, FeedError> {
    match decode_payload(body)? {
        FeedPayload::Events(records) => Ok(normalize(records, reference, source_offset)),
        FeedPayload::Failure { error } => Err(FeedError::Reported(error)),
    }
}
