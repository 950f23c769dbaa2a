//! In-crate test fixtures

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::app::AppContext;
use crate::config::Config;
use crate::db;
use crate::ingest::{FeedError, FeedFamily, FeedFetcher, Indicator, IndicatorType, IngestionCoordinator};

/// Fetcher returning canned indicators, or a transport-style failure
pub struct StubFetcher {
    pub family: FeedFamily,
    pub indicators: Vec<Indicator>,
    pub fail_with: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl StubFetcher {
    pub fn ok(family: FeedFamily, indicators: Vec<Indicator>) -> Self {
        Self {
            family,
            indicators,
            fail_with: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(family: FeedFamily, message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::ok(family, Vec::new())
        }
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    fn family(&self) -> FeedFamily {
        self.family
    }

    async fn fetch(&self) -> crate::ingest::Result<Vec<Indicator>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(FeedError::HttpStatus {
                status: 503,
                url: message.clone(),
            }),
            None => Ok(self.indicators.clone()),
        }
    }
}

pub fn url_indicator(value: &str, day: u32) -> Indicator {
    Indicator::new(
        IndicatorType::Url,
        value,
        "urlhaus",
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
        80,
    )
}

pub fn cidr_indicator(value: &str, source: &str) -> Indicator {
    Indicator::new(
        IndicatorType::Cidr,
        value,
        source,
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        70,
    )
    .with_tags("drop-list")
}

/// Context over a fresh in-memory database with the given fetchers
pub async fn context_with(fetchers: Vec<Arc<dyn FeedFetcher>>) -> AppContext {
    let pool = db::connect_in_memory().await.unwrap();
    let coordinator = IngestionCoordinator::new(pool.clone(), fetchers);
    AppContext::new(Config::default(), pool, coordinator)
}
