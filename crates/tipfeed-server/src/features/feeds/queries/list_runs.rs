//! List feed runs query

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::models::FeedRun;
use crate::ingest::runs::{FeedRunStore, DEFAULT_RUN_LIST_LIMIT};

/// Query to list recent feed runs, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFeedRunsQuery {
    /// Filter by family (`urlhaus`, `spamhaus`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListFeedRunsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<FeedRun>, ListFeedRunsError>> for ListFeedRunsQuery {}

pub async fn handle(
    runs: &FeedRunStore,
    query: ListFeedRunsQuery,
) -> Result<Vec<FeedRun>, ListFeedRunsError> {
    let source = query.source.as_deref().map(str::trim);
    let limit = query.limit.unwrap_or(DEFAULT_RUN_LIST_LIMIT);
    Ok(runs.list(source, limit).await?)
}
