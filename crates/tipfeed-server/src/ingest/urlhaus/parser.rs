//! URLhaus payload parsers
//!
//! URLhaus publishes the same recent-URL list in two shapes:
//!
//! - a comma-separated table (`csv_recent`) whose header row names the columns, with
//!   `#`-prefixed comment lines sprinkled around it
//! - a plain text list (`text_recent`) with one URL per line
//!
//! Column names are matched case-insensitively. Rows without a usable `url` are skipped
//! silently; a payload that is not tabular at all simply yields nothing so the fetcher can fall
//! back to the text list.

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use tipfeed_common::time::{parse_timestamp, utc_now};
use tracing::debug;

use crate::ingest::error::Result;
use crate::ingest::models::{Indicator, IndicatorStatus, IndicatorType};

/// Source tag stored on every URLhaus indicator
pub const URLHAUS_SOURCE: &str = "urlhaus";
/// Confidence assigned to URLhaus indicators
pub const URLHAUS_CONFIDENCE: u8 = 80;

const DATE_ADDED_COLUMNS: &[&str] = &["dateadded", "date_added"];
const FIRST_SEEN_COLUMNS: &[&str] = &["firstseen", "first_seen"];
const STATUS_COLUMNS: &[&str] = &["url_status", "status"];

/// Parser for both URLhaus payload shapes
#[derive(Debug, Clone)]
pub struct UrlhausParser {
    /// Fallback timestamp for rows that carry none (and for every text-list entry)
    observed_at: DateTime<Utc>,
}

impl Default for UrlhausParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlhausParser {
    /// Parser stamping undated rows with the current time
    pub fn new() -> Self {
        Self::observed_at(utc_now())
    }

    /// Parser stamping undated rows with `ts`
    pub fn observed_at(ts: DateTime<Utc>) -> Self {
        Self { observed_at: ts }
    }

    /// Parse the tabular feed.
    ///
    /// Comment lines and blank lines are dropped before the table is read. Each remaining row
    /// becomes one `url` indicator:
    ///
    /// - timestamp: `dateadded`, else `firstseen`, else the observation time
    /// - tags: the `tags` column verbatim
    /// - status: `inactive` when `url_status` (or `status`) is `offline`, otherwise `active`
    pub fn parse_csv(&self, payload: &str) -> Result<Vec<Indicator>> {
        let table: String = payload
            .lines()
            .filter(|line| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .map(|line| format!("{line}\n"))
            .collect();

        if table.is_empty() {
            debug!("URLhaus CSV contained only comments");
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(table.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_ascii_lowercase()).collect();

        let mut indicators = Vec::new();
        let mut skipped = 0usize;

        for (row_num, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!(row = row_num + 1, error = %e, "skipping unreadable URLhaus row");
                    skipped += 1;
                    continue;
                },
            };

            match self.parse_row(&Row::new(&headers, &record)) {
                Some(indicator) => indicators.push(indicator),
                None => skipped += 1,
            }
        }

        debug!(parsed = indicators.len(), skipped, "parsed URLhaus CSV");
        Ok(indicators)
    }

    /// Parse the plain-text list: every line starting with `http` is a URL.
    pub fn parse_text(&self, payload: &str) -> Vec<Indicator> {
        let indicators: Vec<Indicator> = payload
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
            .map(|url| self.indicator(url, self.observed_at))
            .collect();

        debug!(parsed = indicators.len(), "parsed URLhaus text list");
        indicators
    }

    fn parse_row(&self, row: &Row<'_>) -> Option<Indicator> {
        let url = row.get("url").filter(|u| !u.is_empty())?;

        let seen_at = row
            .first_timestamp(DATE_ADDED_COLUMNS)
            .or_else(|| row.first_timestamp(FIRST_SEEN_COLUMNS))
            .unwrap_or(self.observed_at);

        let status = match row.first_non_empty(STATUS_COLUMNS) {
            Some(s) if s.eq_ignore_ascii_case("offline") => IndicatorStatus::Inactive,
            _ => IndicatorStatus::Active,
        };

        Some(
            self.indicator(url, seen_at)
                .with_tags(row.get("tags").unwrap_or_default())
                .with_status(status),
        )
    }

    fn indicator(&self, url: &str, seen_at: DateTime<Utc>) -> Indicator {
        Indicator::new(IndicatorType::Url, url, URLHAUS_SOURCE, seen_at, URLHAUS_CONFIDENCE)
    }
}

/// One CSV record viewed through lowercased header names
struct Row<'a> {
    headers: &'a [String],
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn new(headers: &'a [String], record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Field under `name`; short rows yield `None` for their missing columns
    fn get(&self, name: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == name)?;
        self.record.get(idx)
    }

    fn first_non_empty(&self, names: &[&str]) -> Option<&'a str> {
        names.iter().filter_map(|n| self.get(n)).find(|v| !v.is_empty())
    }

    /// First column among `names` holding a parseable timestamp
    fn first_timestamp(&self, names: &[&str]) -> Option<DateTime<Utc>> {
        names
            .iter()
            .filter_map(|n| self.get(n))
            .find_map(|v| parse_timestamp(v).ok())
    }
}
