//! Spamhaus DROP list parser
//!
//! # Format
//! ```text
//! ; Spamhaus DROP List 2024/05/01 - (c) 2024 The Spamhaus Project
//! 1.10.16.0/20 ; SBL256894
//! 2001:db8::/32 ; SBL000001
//! ```
//!
//! Lines starting with `;` are comments. The first token of every other line is kept when it
//! looks like a prefix (contains `/`); no further address validation is done.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tipfeed_common::time::utc_now;
use tracing::debug;

use crate::ingest::models::{Indicator, IndicatorType};

/// Tag stored on every drop-list indicator
pub const DROP_LIST_TAG: &str = "drop-list";
/// Confidence assigned to drop-list indicators
pub const SPAMHAUS_CONFIDENCE: u8 = 70;

/// One of the drop lists; each keeps its own source tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropListVariant {
    Drop,
    Edrop,
    DropV6,
}

impl DropListVariant {
    /// Fetch order within one family run
    pub const ALL: [DropListVariant; 3] =
        [DropListVariant::Drop, DropListVariant::Edrop, DropListVariant::DropV6];

    pub fn source(&self) -> &'static str {
        match self {
            DropListVariant::Drop => "spamhaus-drop",
            DropListVariant::Edrop => "spamhaus-edrop",
            DropListVariant::DropV6 => "spamhaus-dropv6",
        }
    }
}

impl fmt::Display for DropListVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Parser for the `;`-commented prefix lists
#[derive(Debug, Clone)]
pub struct DropListParser {
    observed_at: DateTime<Utc>,
}

impl Default for DropListParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DropListParser {
    pub fn new() -> Self {
        Self::observed_at(utc_now())
    }

    /// Parser stamping every entry with `ts`
    pub fn observed_at(ts: DateTime<Utc>) -> Self {
        Self { observed_at: ts }
    }

    /// Parse one list. Lines that are not prefixes are skipped.
    pub fn parse(&self, payload: &str, variant: DropListVariant) -> Vec<Indicator> {
        let mut indicators = Vec::new();
        let mut skipped = 0usize;

        for line in payload.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            match Self::prefix(line) {
                Some(cidr) => indicators.push(
                    Indicator::new(
                        IndicatorType::Cidr,
                        cidr,
                        variant.source(),
                        self.observed_at,
                        SPAMHAUS_CONFIDENCE,
                    )
                    .with_tags(DROP_LIST_TAG),
                ),
                None => skipped += 1,
            }
        }

        debug!(list = %variant, parsed = indicators.len(), skipped, "parsed drop list");
        indicators
    }

    /// First whitespace-delimited token of `line` when it contains a `/`
    fn prefix(line: &str) -> Option<&str> {
        line.split_whitespace().next().filter(|t| t.contains('/'))
    }
}
