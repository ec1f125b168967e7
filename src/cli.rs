//! Command-line interface parsing for econcal
//!
//! Every flag can also be set through an environment variable; flags take
//! precedence over the environment.

use chrono::{FixedOffset, Offset, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::upstream::DEFAULT_FEED_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The source offset is not of the form +HH:MM / -HH:MM / Z
    #[error("Invalid source offset: '{0}'. Expected +HH:MM, -HH:MM or Z")]
    InvalidOffset(String),

    /// The upstream timeout must be positive
    #[error("Upstream timeout must be at least 1 second")]
    ZeroTimeout,

    /// The feed command has no program
    #[error("Feed command is empty")]
    EmptyFeedCommand,
}

/// econcal - Economic calendar API that caches each week until its last event passes
#[derive(Parser, Debug)]
#[command(name = "econcal")]
#[command(about = "Economic calendar API with horizon-based caching")]
#[command(version)]
pub struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 5000, env = "PORT")]
    pub port: u16,

    /// URL of the weekly calendar JSON feed
    #[arg(long, value_name = "URL", env = "ECONCAL_FEED_URL", conflicts_with = "feed_command")]
    pub feed_url: Option<String>,

    /// Command whose stdout is the calendar JSON, used instead of the HTTP feed
    ///
    /// Split on whitespace; no shell quoting is applied.
    /// Example: --feed-command "python3 scripts/calendar_fetch.py"
    #[arg(long, value_name = "COMMAND", env = "ECONCAL_FEED_COMMAND")]
    pub feed_command: Option<String>,

    /// Directory for the persisted calendar snapshot (defaults to the XDG cache dir)
    #[arg(long, value_name = "DIR", env = "ECONCAL_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Seconds to wait for the upstream feed before falling back to the cache
    #[arg(long, value_name = "SECONDS", default_value_t = 10, env = "ECONCAL_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    /// UTC offset of upstream dates that carry none (e.g. -04:00)
    #[arg(
        long,
        value_name = "OFFSET",
        default_value = "+00:00",
        env = "ECONCAL_SOURCE_OFFSET",
        allow_hyphen_values = true
    )]
    pub source_offset: String,
}

/// Where economic events are fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// HTTP GET to this URL
    Http(String),
    /// Run this command and read its stdout
    Command(String),
}

/// Validated settings derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub feed: FeedSource,
    /// `None` means the XDG default
    pub cache_dir: Option<PathBuf>,
    pub upstream_timeout: Duration,
    pub source_offset: FixedOffset,
}

/// Parses a UTC offset such as "+05:30", "-0400", "+09" or "Z"
///
/// # Returns
/// * `Ok(FixedOffset)` if the string is a valid offset
/// * `Err(CliError::InvalidOffset)` otherwise
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, CliError> {
    let invalid = || CliError::InvalidOffset(s.to_string());
    let trimmed = s.trim();

    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let sign = match trimmed.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(invalid()),
    };
    let rest = &trimmed[1..];
    if rest.matches(':').count() > 1 {
        return Err(invalid());
    }

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(digits.len() == 2 || digits.len() == 4) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().map_err(|_| invalid())?
    } else {
        0
    };
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

impl Settings {
    /// Creates Settings from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Settings)` with validated values
    /// * `Err(CliError)` if any value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let feed = match (&cli.feed_command, &cli.feed_url) {
            (Some(command), _) => {
                if command.trim().is_empty() {
                    return Err(CliError::EmptyFeedCommand);
                }
                FeedSource::Command(command.clone())
            }
            (None, Some(url)) => FeedSource::Http(url.clone()),
            (None, None) => FeedSource::Http(DEFAULT_FEED_URL.to_string()),
        };

        if cli.upstream_timeout == 0 {
            return Err(CliError::ZeroTimeout);
        }

        Ok(Settings {
            host: cli.host.clone(),
            port: cli.port,
            feed,
            cache_dir: cli.cache_dir.clone(),
            upstream_timeout: Duration::from_secs(cli.upstream_timeout),
            source_offset: parse_utc_offset(&cli.source_offset)?,
        })
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
