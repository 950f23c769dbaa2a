//! Run feeds command
//!
//! Executes ingestion synchronously: every registered family in turn, or a single family.
//! Per-family failures are reported in the body, never as an error of the command itself.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::coordinator::{IngestionCoordinator, RunAllReport};
use crate::ingest::error::FeedError;
use crate::ingest::models::FeedFamily;

/// Command to run feed ingestion now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunFeedsCommand {
    /// `None` runs every registered family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<FeedFamily>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunFeedsError {
    /// Unknown family, or its run could not be recorded
    #[error(transparent)]
    Ingest(#[from] FeedError),
}

impl Request<Result<RunAllReport, RunFeedsError>> for RunFeedsCommand {}

pub async fn handle(
    coordinator: &IngestionCoordinator,
    command: RunFeedsCommand,
) -> Result<RunAllReport, RunFeedsError> {
    let report = match command.family {
        Some(family) => RunAllReport {
            runs: vec![coordinator.run_ingestion(family).await?],
        },
        None => coordinator.run_all().await,
    };

    tracing::info!(
        runs = report.runs.len(),
        all_succeeded = report.all_succeeded(),
        items = report.total_ingested(),
        "manual feed run finished"
    );

    Ok(report)
}
