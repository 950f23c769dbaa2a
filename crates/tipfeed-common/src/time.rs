//! Canonical UTC timestamps
//!
//! Every timestamp tipfeed persists is ISO-8601 with second precision and a `Z` suffix,
//! e.g. `2024-05-01T12:00:00Z`. Because the format is fixed-width, lexical order of the
//! stored strings matches chronological order.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::{Result, TipError};

/// strftime pattern for the canonical stored form
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Layouts accepted from upstream feeds that omit a zone marker (assumed UTC)
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Current time truncated to whole seconds
pub fn utc_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Current time in canonical form
pub fn utc_now_iso() -> String {
    format_timestamp(&utc_now())
}

/// Render a timestamp in canonical form
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(CANONICAL_FORMAT).to_string()
}

/// Parse a timestamp coming from a feed or from storage.
///
/// Accepts RFC 3339 (any offset, converted to UTC) and the zone-less layouts feeds commonly
/// publish, which are read as UTC. Sub-second precision is dropped.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TipError::Timestamp("empty value".to_string()));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc).trunc_subsecs(0));
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Ok(naive.and_utc().trunc_subsecs(0));
        }
    }

    Err(TipError::Timestamp(raw.to_string()))
}
