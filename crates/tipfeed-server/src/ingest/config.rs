//! Ingestion configuration
//!
//! Endpoints, schedule intervals and HTTP client settings for every feed family.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ingest::models::FeedFamily;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_URLHAUS_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_SPAMHAUS_INTERVAL_SECS: u64 = 21600;

pub const URLHAUS_CSV_URL: &str = "https://urlhaus.abuse.ch/downloads/csv_recent/";
pub const URLHAUS_TEXT_URL: &str = "https://urlhaus.abuse.ch/downloads/text_recent/";
pub const SPAMHAUS_DROP_URL: &str = "https://www.spamhaus.org/drop/drop.txt";
pub const SPAMHAUS_EDROP_URL: &str = "https://www.spamhaus.org/drop/edrop.txt";
pub const SPAMHAUS_DROPV6_URL: &str = "https://www.spamhaus.org/drop/dropv6.txt";

fn default_user_agent() -> String {
    format!("tipfeed/{} (+threat-intel ingestion)", env!("CARGO_PKG_VERSION"))
}

/// Main ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Whether the background scheduler runs
    pub enabled: bool,
    /// Fire every family once as soon as the scheduler starts
    pub run_on_startup: bool,
    /// Per-request fetch timeout in seconds
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub urlhaus: UrlhausConfig,
    pub spamhaus: SpamhausConfig,
}

/// URL-list feed endpoints and schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlhausConfig {
    pub csv_url: String,
    /// Line-oriented fallback used when the table yields nothing
    pub text_url: String,
    pub interval_secs: u64,
}

/// Drop-list endpoints (fetched in this order) and schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpamhausConfig {
    pub drop_url: String,
    pub edrop_url: String,
    pub dropv6_url: String,
    pub interval_secs: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn validate_url(key: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{key} cannot be empty");
    }
    let url = reqwest::Url::parse(value)
        .map_err(|e| anyhow::anyhow!("{key} is not a valid URL ({value}): {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("{key} must use http or https, got: {}", url.scheme());
    }
    Ok(())
}

impl IngestConfig {
    /// Load ingestion configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            enabled: env_or("INGEST_ENABLED", true),
            run_on_startup: env_or("INGEST_RUN_ON_STARTUP", false),
            request_timeout_secs: env_or("INGEST_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: std::env::var("INGEST_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            urlhaus: UrlhausConfig::from_env(),
            spamhaus: SpamhausConfig::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("INGEST_REQUEST_TIMEOUT_SECS must be greater than 0");
        }
        if self.user_agent.trim().is_empty() {
            anyhow::bail!("INGEST_USER_AGENT cannot be empty");
        }
        self.urlhaus.validate()?;
        self.spamhaus.validate()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Schedule period for `family`
    pub fn interval_for(&self, family: FeedFamily) -> Duration {
        match family {
            FeedFamily::Urlhaus => Duration::from_secs(self.urlhaus.interval_secs),
            FeedFamily::Spamhaus => Duration::from_secs(self.spamhaus.interval_secs),
        }
    }
}

impl UrlhausConfig {
    pub fn from_env() -> Self {
        Self {
            csv_url: env_string("INGEST_URLHAUS_CSV_URL", URLHAUS_CSV_URL),
            text_url: env_string("INGEST_URLHAUS_TEXT_URL", URLHAUS_TEXT_URL),
            interval_secs: env_or("INGEST_URLHAUS_INTERVAL_SECS", DEFAULT_URLHAUS_INTERVAL_SECS),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_url("INGEST_URLHAUS_CSV_URL", &self.csv_url)?;
        validate_url("INGEST_URLHAUS_TEXT_URL", &self.text_url)?;
        if self.interval_secs == 0 {
            anyhow::bail!("INGEST_URLHAUS_INTERVAL_SECS must be greater than 0");
        }
        Ok(())
    }
}

impl SpamhausConfig {
    pub fn from_env() -> Self {
        Self {
            drop_url: env_string("INGEST_SPAMHAUS_DROP_URL", SPAMHAUS_DROP_URL),
            edrop_url: env_string("INGEST_SPAMHAUS_EDROP_URL", SPAMHAUS_EDROP_URL),
            dropv6_url: env_string("INGEST_SPAMHAUS_DROPV6_URL", SPAMHAUS_DROPV6_URL),
            interval_secs: env_or("INGEST_SPAMHAUS_INTERVAL_SECS", DEFAULT_SPAMHAUS_INTERVAL_SECS),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_url("INGEST_SPAMHAUS_DROP_URL", &self.drop_url)?;
        validate_url("INGEST_SPAMHAUS_EDROP_URL", &self.edrop_url)?;
        validate_url("INGEST_SPAMHAUS_DROPV6_URL", &self.dropv6_url)?;
        if self.interval_secs == 0 {
            anyhow::bail!("INGEST_SPAMHAUS_INTERVAL_SECS must be greater than 0");
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_startup: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            urlhaus: UrlhausConfig::default(),
            spamhaus: SpamhausConfig::default(),
        }
    }
}

impl Default for UrlhausConfig {
    fn default() -> Self {
        Self {
            csv_url: URLHAUS_CSV_URL.to_string(),
            text_url: URLHAUS_TEXT_URL.to_string(),
            interval_secs: DEFAULT_URLHAUS_INTERVAL_SECS,
        }
    }
}

impl Default for SpamhausConfig {
    fn default() -> Self {
        Self {
            drop_url: SPAMHAUS_DROP_URL.to_string(),
            edrop_url: SPAMHAUS_EDROP_URL.to_string(),
            dropv6_url: SPAMHAUS_DROPV6_URL.to_string(),
            interval_secs: DEFAULT_SPAMHAUS_INTERVAL_SECS,
        }
    }
}
