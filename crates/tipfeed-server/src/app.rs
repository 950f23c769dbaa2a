//! Application context and router
//!
//! [`AppContext`] is built once in `main` and shared by the HTTP handlers and the feed
//! scheduler. Nothing in the server is global.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::features;
use crate::ingest::{FeedRunStore, FeedScheduler, IndicatorStore, IngestionCoordinator};
use crate::middleware;

/// Shared state for handlers and background tasks
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub coordinator: IngestionCoordinator,
}

impl AppContext {
    pub fn new(config: Config, pool: SqlitePool, coordinator: IngestionCoordinator) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            coordinator,
        }
    }

    /// Open the database, apply migrations and wire the real feed fetchers
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;
        info!("Database ready");

        let coordinator = IngestionCoordinator::from_config(pool.clone(), &config.ingest)?;
        info!(families = ?coordinator.families(), "Feed coordinator initialized");

        Ok(Self::new(config, pool, coordinator))
    }

    pub fn indicators(&self) -> &IndicatorStore {
        self.coordinator.store()
    }

    pub fn runs(&self) -> &FeedRunStore {
        self.coordinator.runs()
    }

    /// Scheduler for every registered family at the configured intervals (not yet started)
    pub fn scheduler(&self) -> FeedScheduler {
        FeedScheduler::from_config(self.coordinator.clone(), &self.config.ingest)
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(ctx: AppContext) -> Router {
    let cors = middleware::cors_layer(&ctx.config.cors);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", features::router(ctx))
        // Apply layers from innermost to outermost
        .layer(middleware::compression_layer())
        .layer(middleware::tracing_layer())
        .layer(cors)
}

/// Liveness probe; no dependency checks
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
