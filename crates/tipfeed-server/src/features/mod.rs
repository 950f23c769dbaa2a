//! Feature modules implementing the tipfeed API
//!
//! Each feature is a vertical slice with its own commands, queries and routes:
//!
//! - **indicators**: search and aggregate counts
//! - **feeds**: run history and manual ingestion triggers
//!
//! Commands and queries implement the mediator pattern using the `mediator` crate; handlers are
//! plain async functions taking the store or coordinator they need.

pub mod feeds;
pub mod indicators;

use axum::Router;

use crate::app::AppContext;

/// Creates the API router with all feature routes mounted:
/// - `/indicators` - search and stats
/// - `/feeds` - run history and manual triggers
pub fn router(ctx: AppContext) -> Router<()> {
    Router::new()
        .nest("/indicators", indicators::indicators_routes())
        .nest("/feeds", feeds::feeds_routes())
        .with_state(ctx)
}
