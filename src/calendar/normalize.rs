//! Normalization of upstream calendar payloads
//!
//! Upstream sources disagree on field names and date formats. The public
//! weekly feed sends `title`/`country` with RFC 3339 dates, while the scraper
//! sends `event`/`currency` with a year-less date ("Sun May 25") and a
//! separate clock time ("2:40pm"). Both are mapped onto [`EconomicEvent`]
//! here so nothing past the feed layer has to care which source was used.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use super::{EconomicEvent, Impact};

/// Year-less date as produced by the scraper, with the year appended
const SCRAPED_DATE_FORMAT: &str = "%a %b %d %Y";

/// Full date formats accepted when the date carries no offset
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m-%d-%Y"];

/// Date-time formats accepted when the date carries no offset
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Body returned by an upstream source
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FeedPayload {
    /// A list of raw event records
    Events(Vec<RawRecord>),
    /// The source reported its own failure, e.g. `{"error": "blocked"}`
    Failure { error: String },
}

/// A single event record in either upstream shape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "event")]
    pub title: Option<String>,
    #[serde(default, alias = "currency")]
    pub country: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub forecast: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

/// Parses an upstream body
pub fn decode_payload(body: &str) -> Result<FeedPayload, serde_json::Error> {
    serde_json::from_str(body)
}

/// Converts raw records into events, preserving upstream order
///
/// # Arguments
/// * `records` - Records as decoded from the upstream body
/// * `reference` - Fetch time, used to infer the year of year-less dates
/// * `source_offset` - UTC offset of dates that carry none
///
/// Records whose date cannot be parsed are kept with `scheduled_at = None`.
pub fn normalize(
    records: Vec<RawRecord>,
    reference: DateTime<Utc>,
    source_offset: FixedOffset,
) -> Vec<EconomicEvent> {
    records
        .into_iter()
        .map(|record| {
            let date = record.date.unwrap_or_default();
            let time = record.time.filter(|t| !t.trim().is_empty());
            let title = record.title.unwrap_or_default();
            let scheduled_at = parse_schedule(&date, time.as_deref(), reference, source_offset);

            if scheduled_at.is_none() {
                tracing::warn!(
                    title = %title,
                    date = %date,
                    time = ?time,
                    "unparseable event date, excluding it from the cache horizon"
                );
            }

            EconomicEvent {
                title,
                country: record.country.unwrap_or_default(),
                date,
                time,
                scheduled_at,
                impact: Impact::from_label(record.impact.as_deref().unwrap_or_default()),
                forecast: record.forecast.unwrap_or_default(),
                previous: record.previous.unwrap_or_default(),
                actual: record.actual.unwrap_or_default(),
            }
        })
        .collect()
}

/// Resolves an upstream date (and optional time) to a UTC instant
///
/// Dates with an explicit offset are taken as-is. Everything else is read in
/// `source_offset`. Returns `None` rather than guessing when either part is
/// unparseable.
pub fn parse_schedule(
    date: &str,
    time: Option<&str>,
    reference: DateTime<Utc>,
    source_offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(date) {
        return Some(at.with_timezone(&Utc));
    }

    let local = match parse_naive_date_time(date) {
        Some(local) => local,
        None => {
            let reference_day = reference.with_timezone(&source_offset).date_naive();
            let day = parse_day(date, reference_day)?;
            day.and_time(parse_clock(time)?)
        }
    };

    source_offset
        .from_local_datetime(&local)
        .single()
        .map(|at| at.with_timezone(&Utc))
}

fn parse_naive_date_time(date: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
}

/// Parses a calendar day, inferring the year when the source omits it
///
/// For "Sun May 25" the candidate years around `reference_day` are tried and
/// the one whose weekday matches and lies closest to the reference wins.
fn parse_day(date: &str, reference_day: NaiveDate) -> Option<NaiveDate> {
    if let Some(day) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
    {
        return Some(day);
    }

    let year = reference_day.year();
    [year - 1, year, year + 1]
        .into_iter()
        .filter_map(|candidate| {
            NaiveDate::parse_from_str(&format!("{} {}", date, candidate), SCRAPED_DATE_FORMAT).ok()
        })
        .min_by_key(|day| (*day - reference_day).num_days().abs())
}

/// Parses a clock label such as "2:40pm", "14:30" or "All Day"
///
/// A missing time or "All Day" maps to noon. Labels like "Tentative" return
/// `None`.
fn parse_clock(time: Option<&str>) -> Option<NaiveTime> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0);
    let Some(time) = time else {
        return noon;
    };

    let compact: String = time
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if compact.is_empty() || compact == "ALLDAY" {
        return noon;
    }

    NaiveTime::parse_from_str(&compact, "%I:%M%p")
        .or_else(|_| NaiveTime::parse_from_str(&compact, "%H:%M"))
        .ok()
}
