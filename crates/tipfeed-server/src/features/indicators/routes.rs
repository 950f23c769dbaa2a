//! Indicator routes
//!
//! Read-only access to the normalized indicator table.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::queries::{
    get_stats::handle as handle_get_stats, search_indicators::handle as handle_search,
    GetIndicatorStatsError, GetIndicatorStatsQuery, IndicatorStatsResponse, SearchIndicatorsError,
    SearchIndicatorsQuery,
};
use crate::app::AppContext;
use crate::error::AppError;
use crate::ingest::models::Indicator;

impl From<SearchIndicatorsError> for AppError {
    fn from(err: SearchIndicatorsError) -> Self {
        match err {
            SearchIndicatorsError::InvalidType(t) => AppError::Validation(format!(
                "unknown indicator type '{t}', expected one of url, ip, domain, cidr"
            )),
            SearchIndicatorsError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<GetIndicatorStatsError> for AppError {
    fn from(err: GetIndicatorStatsError) -> Self {
        match err {
            GetIndicatorStatsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Create indicator routes
pub fn indicators_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(search_indicators))
        .route("/stats", get(get_stats))
}

/// Search indicators, most recently seen first
///
/// GET /indicators?q=evil.com&type=url&source=urlhaus&limit=50
async fn search_indicators(
    State(ctx): State<AppContext>,
    Query(query): Query<SearchIndicatorsQuery>,
) -> Result<Json<Vec<Indicator>>, AppError> {
    let indicators = handle_search(ctx.indicators(), query).await?;
    Ok(Json(indicators))
}

/// Aggregate counts
///
/// GET /indicators/stats?source_prefix=spamhaus-e&source=urlhaus
async fn get_stats(
    State(ctx): State<AppContext>,
    Query(query): Query<GetIndicatorStatsQuery>,
) -> Result<Json<IndicatorStatsResponse>, AppError> {
    let stats = handle_get_stats(ctx.indicators(), query).await?;
    Ok(Json(stats))
}
