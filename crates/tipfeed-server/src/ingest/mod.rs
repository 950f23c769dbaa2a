//! Threat-intel feed ingestion
//!
//! Each feed family follows the same shape:
//! - Download: [`http::FeedClient`] with a fixed timeout and user agent
//! - Parse: a family parser turning the payload into [`models::Indicator`]s
//! - Store: [`store::IndicatorStore::upsert`] keyed on `(value, source)`
//! - Record: [`runs::FeedRunStore`] tracks every attempt
//!
//! [`coordinator::IngestionCoordinator`] ties these together for one run;
//! [`scheduler::FeedScheduler`] fires runs periodically.
//!
//! Families:
//! - URLhaus recent URLs: <https://urlhaus.abuse.ch/downloads/csv_recent/>
//! - Spamhaus DROP, EDROP and DROPv6: <https://www.spamhaus.org/drop/>

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod models;
pub mod runs;
pub mod scheduler;
pub mod spamhaus;
pub mod store;
pub mod urlhaus;

pub use config::IngestConfig;
pub use coordinator::{IngestionCoordinator, RunAllReport, RunOutcome};
pub use error::{FeedError, Result};
pub use fetcher::FeedFetcher;
pub use models::{FeedFamily, FeedRun, Indicator, IndicatorStatus, IndicatorType, RunStatus};
pub use runs::FeedRunStore;
pub use scheduler::{FeedScheduler, SchedulerHandle};
pub use store::{IndicatorFilter, IndicatorStats, IndicatorStore};
