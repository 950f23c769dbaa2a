//! Indicator and feed-run models
//!
//! Every parser produces [`Indicator`]s and every store operation consumes them. The pair
//! `(value, source)` is the natural key; see [`crate::ingest::store::IndicatorStore::upsert`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Raised when a stored or requested enum value is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Semantic category of an indicator value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorType {
    Url,
    Ip,
    Domain,
    Cidr,
}

impl IndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Url => "url",
            IndicatorType::Ip => "ip",
            IndicatorType::Domain => "domain",
            IndicatorType::Cidr => "cidr",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(IndicatorType::Url),
            "ip" => Ok(IndicatorType::Ip),
            "domain" => Ok(IndicatorType::Domain),
            "cidr" => Ok(IndicatorType::Cidr),
            other => Err(UnknownVariant::new("indicator type", other)),
        }
    }
}

/// Liveness as reported by the upstream feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    #[default]
    Active,
    Inactive,
}

impl IndicatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorStatus::Active => "active",
            IndicatorStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for IndicatorStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(IndicatorStatus::Active),
            "inactive" => Ok(IndicatorStatus::Inactive),
            other => Err(UnknownVariant::new("indicator status", other)),
        }
    }
}

/// A normalized threat artifact with provenance and freshness metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    /// Fine-grained origin tag, one per feed variant
    pub source: String,
    #[serde(with = "canonical_ts")]
    pub first_seen: DateTime<Utc>,
    #[serde(with = "canonical_ts")]
    pub last_seen: DateTime<Utc>,
    /// Comma-joined label set
    pub tags: String,
    /// 0..=100
    pub confidence: u8,
    pub status: IndicatorStatus,
}

impl Indicator {
    /// New active indicator first and last seen at `seen_at`, with no tags
    pub fn new(
        indicator_type: IndicatorType,
        value: impl Into<String>,
        source: impl Into<String>,
        seen_at: DateTime<Utc>,
        confidence: u8,
    ) -> Self {
        Self {
            indicator_type,
            value: value.into(),
            source: source.into(),
            first_seen: seen_at,
            last_seen: seen_at,
            tags: String::new(),
            confidence,
            status: IndicatorStatus::Active,
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_status(mut self, status: IndicatorStatus) -> Self {
        self.status = status;
        self
    }

    /// Tags as a set of trimmed, non-empty tokens
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Logical upstream source category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFamily {
    /// URL-list feed (tabular with line-oriented fallback)
    Urlhaus,
    /// CIDR drop lists
    Spamhaus,
}

impl FeedFamily {
    pub const ALL: [FeedFamily; 2] = [FeedFamily::Urlhaus, FeedFamily::Spamhaus];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFamily::Urlhaus => "urlhaus",
            FeedFamily::Spamhaus => "spamhaus",
        }
    }
}

impl fmt::Display for FeedFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedFamily {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urlhaus" => Ok(FeedFamily::Urlhaus),
            "spamhaus" => Ok(FeedFamily::Spamhaus),
            _ => Err(UnknownVariant::new("feed family", s)),
        }
    }
}

/// Lifecycle of one ingestion attempt. `Running` transitions exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl FromStr for RunStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "success" => Ok(RunStatus::Success),
            "error" => Ok(RunStatus::Error),
            other => Err(UnknownVariant::new("run status", other)),
        }
    }
}

/// Audit record of a single ingestion attempt (maps to `feed_runs`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRun {
    pub id: i64,
    pub source: String,
    #[serde(with = "canonical_ts")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "canonical_ts::option")]
    pub finished_at: Option<DateTime<Utc>>,
    pub items_ingested: i64,
    pub status: RunStatus,
    pub error_text: Option<String>,
}

/// Serde adapter writing timestamps as `YYYY-MM-DDTHH:MM:SSZ`
pub(crate) mod canonical_ts {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use tipfeed_common::time::{format_timestamp, parse_timestamp};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&format_timestamp(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_indicator_serializes_with_type_key_and_canonical_times() {
        let ind = Indicator::new(IndicatorType::Cidr, "198.51.100.0/24", "spamhaus-drop", seen(), 70)
            .with_tags("drop-list");
        let json = serde_json::to_value(&ind).unwrap();

        assert_eq!(json["type"], "cidr");
        assert_eq!(json["first_seen"], "2024-03-09T10:00:00Z");
        assert_eq!(json["last_seen"], "2024-03-09T10:00:00Z");
        assert_eq!(json["status"], "active");

        let back: Indicator = serde_json::from_value(json).unwrap();
        assert_eq!(back, ind);
    }

    #[test]
    fn test_tag_set_ignores_blanks_and_duplicates() {
        let ind = Indicator::new(IndicatorType::Url, "http://x", "urlhaus", seen(), 80)
            .with_tags("elf, mirai,,elf ");
        let tags: Vec<_> = ind.tag_set().into_iter().collect();
        assert_eq!(tags, vec!["elf", "mirai"]);
    }

    #[test]
    fn test_feed_family_parse_is_case_insensitive() {
        assert_eq!("URLhaus".parse::<FeedFamily>().unwrap(), FeedFamily::Urlhaus);
        assert_eq!("spamhaus".parse::<FeedFamily>().unwrap(), FeedFamily::Spamhaus);
        let err = "abuseipdb".parse::<FeedFamily>().unwrap_err();
        assert_eq!(err.to_string(), "unknown feed family 'abuseipdb'");
    }

    #[test]
    fn test_run_status_terminality() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Error.is_terminal());
        assert_eq!("error".parse::<RunStatus>().unwrap(), RunStatus::Error);
    }

    #[test]
    fn test_feed_run_unfinished_serializes_null() {
        let run = FeedRun {
            id: 1,
            source: "urlhaus".into(),
            started_at: seen(),
            finished_at: None,
            items_ingested: 0,
            status: RunStatus::Running,
            error_text: None,
        };
        let json = serde_json::to_value(&run).unwrap();
        assert!(json["finished_at"].is_null());
        assert_eq!(json["started_at"], "2024-03-09T10:00:00Z");
    }
}
