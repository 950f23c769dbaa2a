//! Ingestion run coordinator
//!
//! Drives one feed family through a single run:
//! 1. Record a `running` FeedRun
//! 2. Fetch and parse through the family's [`FeedFetcher`]
//! 3. Upsert indicators one by one, counting successes
//! 4. Finalize the FeedRun as `success` or `error` with the count reached
//!
//! A failure (or panic) in one family never reaches another: [`IngestionCoordinator::run_all`]
//! runs every registered family in turn and collects each outcome.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::ingest::config::IngestConfig;
use crate::ingest::error::{FeedError, Result};
use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::http::FeedClient;
use crate::ingest::models::{FeedFamily, RunStatus};
use crate::ingest::runs::FeedRunStore;
use crate::ingest::spamhaus::SpamhausFetcher;
use crate::ingest::store::IndicatorStore;
use crate::ingest::urlhaus::UrlhausFetcher;

/// Result of one family run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub family: FeedFamily,
    /// `None` when the run could not even be recorded
    pub run_id: Option<i64>,
    pub status: RunStatus,
    pub items_ingested: i64,
    pub error: Option<String>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Outcomes of a manual "run everything" trigger, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAllReport {
    pub runs: Vec<RunOutcome>,
}

impl RunAllReport {
    pub fn all_succeeded(&self) -> bool {
        self.runs.iter().all(RunOutcome::is_success)
    }

    pub fn total_ingested(&self) -> i64 {
        self.runs.iter().map(|r| r.items_ingested).sum()
    }
}

/// Coordinates family runs against the indicator and run stores.
///
/// Cheap to clone; clones share the fetchers and the pool.
#[derive(Clone)]
pub struct IngestionCoordinator {
    store: IndicatorStore,
    runs: FeedRunStore,
    fetchers: Arc<Vec<Arc<dyn FeedFetcher>>>,
}

impl IngestionCoordinator {
    pub fn new(pool: SqlitePool, fetchers: Vec<Arc<dyn FeedFetcher>>) -> Self {
        Self {
            store: IndicatorStore::new(pool.clone()),
            runs: FeedRunStore::new(pool),
            fetchers: Arc::new(fetchers),
        }
    }

    /// Coordinator wired to the real upstream feeds described by `config`
    pub fn from_config(pool: SqlitePool, config: &IngestConfig) -> Result<Self> {
        let client = FeedClient::new(config.request_timeout(), &config.user_agent)?;

        let fetchers: Vec<Arc<dyn FeedFetcher>> = vec![
            Arc::new(UrlhausFetcher::new(client.clone(), &config.urlhaus)),
            Arc::new(SpamhausFetcher::new(client, &config.spamhaus)),
        ];

        Ok(Self::new(pool, fetchers))
    }

    pub fn store(&self) -> &IndicatorStore {
        &self.store
    }

    pub fn runs(&self) -> &FeedRunStore {
        &self.runs
    }

    /// Registered families in registration order
    pub fn families(&self) -> Vec<FeedFamily> {
        self.fetchers.iter().map(|f| f.family()).collect()
    }

    fn fetcher(&self, family: FeedFamily) -> Option<Arc<dyn FeedFetcher>> {
        self.fetchers.iter().find(|f| f.family() == family).cloned()
    }

    /// Run one family end to end.
    ///
    /// Fetch, parse and storage failures are captured in the returned outcome and in the
    /// FeedRun record. `Err` is returned only when the family is not registered or the run
    /// record itself cannot be written.
    #[instrument(skip_all, fields(family = %family))]
    pub async fn run_ingestion(&self, family: FeedFamily) -> Result<RunOutcome> {
        let fetcher = self
            .fetcher(family)
            .ok_or_else(|| FeedError::NotRegistered(family.to_string()))?;

        let run_id = self.runs.start(family.as_str()).await?;

        let mut ingested = 0i64;
        let result = AssertUnwindSafe(self.fetch_and_store(fetcher.as_ref(), &mut ingested))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(FeedError::Panicked(panic_message(panic.as_ref()))));

        let (status, error_text) = match &result {
            Ok(()) => (RunStatus::Success, None),
            Err(e) => (RunStatus::Error, Some(e.to_string())),
        };

        if let Err(e) = self.runs.finish(run_id, ingested, status, error_text.as_deref()).await {
            error!(
                run_id,
                items = ingested,
                status = status.as_str(),
                error = %e,
                "feed run could not be finalized and is left running"
            );
            return Err(e.into());
        }

        match &result {
            Ok(()) => info!(run_id, items = ingested, "feed run succeeded"),
            Err(e) => error!(
                run_id,
                items = ingested,
                kind = e.kind(),
                error = %e,
                "feed run failed"
            ),
        }

        Ok(RunOutcome {
            family,
            run_id: Some(run_id),
            status,
            items_ingested: ingested,
            error: error_text,
        })
    }

    async fn fetch_and_store(&self, fetcher: &dyn FeedFetcher, ingested: &mut i64) -> Result<()> {
        let indicators = fetcher.fetch().await?;
        for indicator in &indicators {
            self.store.upsert(indicator).await?;
            *ingested += 1;
        }
        Ok(())
    }

    /// Run every registered family sequentially; one family's failure never stops the next.
    pub async fn run_all(&self) -> RunAllReport {
        let mut report = RunAllReport::default();

        for family in self.families() {
            let outcome = match self.run_ingestion(family).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(family = %family, error = %e, "feed run could not be recorded");
                    RunOutcome {
                        family,
                        run_id: None,
                        status: RunStatus::Error,
                        items_ingested: 0,
                        error: Some(e.to_string()),
                    }
                },
            };
            report.runs.push(outcome);
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
