//! Feed routes
//!
//! Run history and the manual trigger. The trigger runs synchronously and always answers
//! 200 with a per-family report; a failed family shows up as `"status": "error"` in the body.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use super::commands::{run_feeds::handle as handle_run_feeds, RunFeedsCommand, RunFeedsError};
use super::queries::{list_runs::handle as handle_list_runs, ListFeedRunsError, ListFeedRunsQuery};
use crate::app::AppContext;
use crate::error::AppError;
use crate::ingest::coordinator::RunAllReport;
use crate::ingest::models::{FeedFamily, FeedRun};

impl From<RunFeedsError> for AppError {
    fn from(err: RunFeedsError) -> Self {
        match err {
            RunFeedsError::Ingest(e) => AppError::Ingest(e),
        }
    }
}

impl From<ListFeedRunsError> for AppError {
    fn from(err: ListFeedRunsError) -> Self {
        match err {
            ListFeedRunsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Create feed routes
pub fn feeds_routes() -> Router<AppContext> {
    Router::new()
        .route("/runs", get(list_runs))
        .route("/run", post(run_all))
        .route("/:family/run", post(run_family))
}

/// Recent runs
///
/// GET /feeds/runs?source=urlhaus&limit=20
async fn list_runs(
    State(ctx): State<AppContext>,
    Query(query): Query<ListFeedRunsQuery>,
) -> Result<Json<Vec<FeedRun>>, AppError> {
    let runs = handle_list_runs(ctx.runs(), query).await?;
    Ok(Json(runs))
}

/// Run every family now
///
/// POST /feeds/run
async fn run_all(State(ctx): State<AppContext>) -> Result<Json<RunAllReport>, AppError> {
    let report = handle_run_feeds(&ctx.coordinator, RunFeedsCommand::default()).await?;
    Ok(Json(report))
}

/// Run one family now
///
/// POST /feeds/:family/run
async fn run_family(
    State(ctx): State<AppContext>,
    Path(family): Path<String>,
) -> Result<Json<RunAllReport>, AppError> {
    let family: FeedFamily = family
        .parse()
        .map_err(|e| AppError::NotFound(format!("{e}")))?;

    let report = handle_run_feeds(&ctx.coordinator, RunFeedsCommand { family: Some(family) }).await?;
    Ok(Json(report))
}
