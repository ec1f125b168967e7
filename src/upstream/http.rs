//! HTTP client for the weekly calendar feed
//!
//! Fetches the public "this week" JSON feed. The feed is not parameterized:
//! one GET returns every event scheduled for the current week.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use std::time::Duration;

use super::{events_from_body, EventFeed, FeedError};
use crate::calendar::EconomicEvent;

/// Public weekly economic calendar feed
pub const DEFAULT_FEED_URL: &str = "https://nfs.faireconomy.media/ff_calendar_thisweek.json";

/// Client for a calendar feed served over HTTP
#[derive(Debug, Clone)]
pub struct HttpFeed {
    /// HTTP client for making requests, with the request timeout applied
    http_client: Client,
    /// Feed URL
    url: String,
    /// Request timeout, kept for error reporting
    timeout: Duration,
    /// Offset applied to dates sent without one
    source_offset: FixedOffset,
}

impl HttpFeed {
    /// Creates a client for `url` whose requests give up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("econcal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            url: url.into(),
            timeout,
            source_offset: Utc.fix(),
        })
    }

    /// Sets the UTC offset used for dates without one
    pub fn with_source_offset(mut self, source_offset: FixedOffset) -> Self {
        self.source_offset = source_offset;
        self
    }

    /// Maps client errors, singling out timeouts
    fn classify(&self, error: reqwest::Error) -> FeedError {
        if error.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::Http(error)
        }
    }
}

#[async_trait]
impl EventFeed for HttpFeed {
    async fn fetch(&self, reference: DateTime<Utc>) -> Result<Vec<EconomicEvent>, FeedError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        events_from_body(&body, reference, self.source_offset)
    }

    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }
}
