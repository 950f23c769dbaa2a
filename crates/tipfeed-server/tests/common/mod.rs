//! Shared helpers for tipfeed-server integration tests
//!
//! Every test gets its own in-memory SQLite database with migrations applied, so tests are
//! isolated and need no external services.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tipfeed_server::db;
use tipfeed_server::ingest::{
    FeedError, FeedFamily, FeedFetcher, Indicator, IndicatorType, Result as FeedResult,
};

pub async fn memory_pool() -> SqlitePool {
    db::connect_in_memory().await.expect("in-memory database")
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn url(value: &str, seen: DateTime<Utc>) -> Indicator {
    Indicator::new(IndicatorType::Url, value, "urlhaus", seen, 80)
}

pub fn cidr(value: &str, source: &str) -> Indicator {
    Indicator::new(IndicatorType::Cidr, value, source, at(1, 0), 70).with_tags("drop-list")
}

/// What a [`ScriptedFetcher`] does when called
pub enum Script {
    Return(Vec<Indicator>),
    Fail,
    Panic,
    /// Sleep, then return the indicators
    Slow(Duration, Vec<Indicator>),
}

/// Fetcher whose behavior is fixed up front; counts its invocations
pub struct ScriptedFetcher {
    family: FeedFamily,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new(family: FeedFamily, script: Script) -> Self {
        Self {
            family,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn shared(self) -> Arc<dyn FeedFetcher> {
        Arc::new(self)
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    fn family(&self) -> FeedFamily {
        self.family
    }

    async fn fetch(&self) -> FeedResult<Vec<Indicator>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Return(indicators) => Ok(indicators.clone()),
            Script::Fail => Err(FeedError::HttpStatus {
                status: 502,
                url: format!("https://{}.example/feed", self.family),
            }),
            Script::Panic => panic!("fetcher exploded"),
            Script::Slow(delay, indicators) => {
                tokio::time::sleep(*delay).await;
                Ok(indicators.clone())
            },
        }
    }
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
