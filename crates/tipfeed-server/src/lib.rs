//! tipfeed server library
//!
//! Periodically pulls public threat-intelligence feeds, normalizes them into a single indicator
//! model and keeps them de-duplicated and fresh in SQLite.
//!
//! # Overview
//!
//! - **Ingestion** ([`ingest`]): fetch, parse, merge-upsert and run bookkeeping for each feed
//!   family, plus the periodic scheduler that drives it
//! - **API** ([`features`]): indicator search, aggregate counts, run history, manual triggers
//! - **Database** ([`db`]): SQLite pool and embedded migrations
//! - **Configuration** ([`config`]): environment-driven, validated at startup
//!
//! # Feed families
//!
//! | Family | Sources | Type | Default interval |
//! |---|---|---|---|
//! | URLhaus | `urlhaus` | url | 1 hour |
//! | Spamhaus | `spamhaus-drop`, `spamhaus-edrop`, `spamhaus-dropv6` | cidr | 6 hours |
//!
//! # Example
//!
//! ```no_run
//! use tipfeed_server::{app::AppContext, config::Config};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ctx = AppContext::initialize(Config::load()?).await?;
//! let report = ctx.coordinator.run_all().await;
//! println!("ingested {} indicators", report.total_ingested());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

#[cfg(test)]
mod testing;

pub use error::AppError;
