//! Indicator statistics query

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::store::{IndicatorStats, IndicatorStore};

/// Query for aggregate indicator counts.
///
/// The fixed dashboard counts are always returned; `source_prefix` and `source` add a count for
/// an arbitrary family prefix or exact source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetIndicatorStatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Response for indicator statistics query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorStatsResponse {
    #[serde(flatten)]
    pub stats: IndicatorStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_prefix_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_count: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetIndicatorStatsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<IndicatorStatsResponse, GetIndicatorStatsError>> for GetIndicatorStatsQuery {}

pub async fn handle(
    store: &IndicatorStore,
    query: GetIndicatorStatsQuery,
) -> Result<IndicatorStatsResponse, GetIndicatorStatsError> {
    let stats = store.stats().await?;

    let source_prefix_count = match query.source_prefix.as_deref().map(str::trim) {
        Some(prefix) if !prefix.is_empty() => Some(store.count_by_source_prefix(prefix).await?),
        _ => None,
    };
    let source_count = match query.source.as_deref().map(str::trim) {
        Some(source) if !source.is_empty() => Some(store.count_by_source(source).await?),
        _ => None,
    };

    Ok(IndicatorStatsResponse {
        stats,
        source_prefix_count,
        source_count,
    })
}
