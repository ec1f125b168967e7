//! Calendar feed produced by an external command
//!
//! Runs a configured program (typically a scraper) and reads its stdout as
//! the feed body. Scrapers signal their own failures by printing
//! `{"error": "..."}` and exiting non-zero.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{events_from_body, EventFeed, FeedError};
use crate::calendar::{decode_payload, EconomicEvent, FeedPayload};

/// Longest stderr excerpt kept in error messages
const STDERR_EXCERPT_LEN: usize = 512;

/// Feed backed by a subprocess that prints the event list as JSON
#[derive(Debug, Clone)]
pub struct CommandFeed {
    program: String,
    args: Vec<String>,
    /// The child is killed once this elapses
    timeout: Duration,
    source_offset: FixedOffset,
}

impl CommandFeed {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            source_offset: Utc.fix(),
        }
    }

    /// Builds a feed from a whitespace-separated command line
    ///
    /// No shell quoting is applied. Returns `None` for a blank line.
    pub fn from_command_line(line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    /// Sets the UTC offset used for dates without one
    pub fn with_source_offset(mut self, source_offset: FixedOffset) -> Self {
        self.source_offset = source_offset;
        self
    }
}

#[async_trait]
impl EventFeed for CommandFeed {
    async fn fetch(&self, reference: DateTime<Utc>) -> Result<Vec<EconomicEvent>, FeedError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FeedError::Timeout(self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            if let Ok(FeedPayload::Failure { error }) = decode_payload(&stdout) {
                return Err(FeedError::Reported(error));
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FeedError::CommandFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().chars().take(STDERR_EXCERPT_LEN).collect(),
            });
        }

        events_from_body(&stdout, reference, self.source_offset)
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            format!("command `{}`", self.program)
        } else {
            format!("command `{} {}`", self.program, self.args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandFeed {
        CommandFeed::new("sh", vec!["-c".to_string(), script.to_string()], Duration::from_secs(5))
    }

    #[test]
    fn test_from_command_line_splits_on_whitespace() {
        let feed = CommandFeed::from_command_line("python3  scraper.py --week", Duration::from_secs(1))
            .expect("command");

        assert_eq!(feed.program, "python3");
        assert_eq!(feed.args, vec!["scraper.py", "--week"]);
        assert_eq!(feed.describe(), "command `python3 scraper.py --week`");
        assert!(CommandFeed::from_command_line("   ", Duration::from_secs(1)).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reads_events_from_stdout() {
        let feed = sh(r#"echo '[{"event":"CPI y/y","currency":"USD","date":"Thu Jun 5","time":"8:30am","impact":"High","actual":"","forecast":"2.4%","previous":"2.3%"}]'"#);
        let reference = "2025-06-01T00:00:00Z".parse().unwrap();

        let events = feed.fetch(reference).await.expect("fetch");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "CPI y/y");
        assert_eq!(
            events[0].scheduled_at,
            Some("2025-06-05T08:30:00Z".parse().unwrap())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reported_error_on_failed_exit() {
        let feed = sh(r#"echo '{"error": "No event rows found"}'; exit 1"#);

        let result = feed.fetch(Utc::now()).await;

        match result {
            Err(FeedError::Reported(message)) => assert_eq!(message, "No event rows found"),
            other => panic!("expected reported error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_without_payload() {
        let feed = sh("echo boom >&2; exit 3");

        let result = feed.fetch(Utc::now()).await;

        match result {
            Err(FeedError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected command failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_garbage_stdout_is_malformed() {
        let feed = sh("echo '<html>captcha</html>'");

        let err = feed.fetch(Utc::now()).await.unwrap_err();

        assert!(err.is_malformed());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_command_times_out() {
        let feed = CommandFeed::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(100),
        );

        let result = feed.fetch(Utc::now()).await;

        assert!(matches!(result, Err(FeedError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let feed = CommandFeed::new("econcal-no-such-program", Vec::new(), Duration::from_secs(1));

        let result = feed.fetch(Utc::now()).await;

        assert!(matches!(result, Err(FeedError::Spawn(_))));
    }
}
