//! FeedRun bookkeeping
//!
//! Each ingestion attempt is recorded as `running` when it starts and transitions exactly once
//! to `success` or `error` when it ends.

use sqlx::SqlitePool;
use tipfeed_common::time::{format_timestamp, parse_timestamp, utc_now};

use crate::ingest::models::{FeedRun, RunStatus};

pub const DEFAULT_RUN_LIST_LIMIT: i64 = 20;
pub const MAX_RUN_LIST_LIMIT: i64 = 500;

#[derive(sqlx::FromRow)]
struct FeedRunRow {
    id: i64,
    source: String,
    started_at: String,
    finished_at: Option<String>,
    items_ingested: i64,
    status: String,
    error_text: Option<String>,
}

impl TryFrom<FeedRunRow> for FeedRun {
    type Error = sqlx::Error;

    fn try_from(row: FeedRunRow) -> Result<Self, Self::Error> {
        let finished_at = row
            .finished_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(FeedRun {
            id: row.id,
            source: row.source,
            started_at: parse_timestamp(&row.started_at).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            finished_at,
            items_ingested: row.items_ingested,
            status: row.status.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            error_text: row.error_text,
        })
    }
}

/// FeedRun repository over a SQLite pool
#[derive(Debug, Clone)]
pub struct FeedRunStore {
    pool: SqlitePool,
}

impl FeedRunStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a run as started now; returns the new run id
    pub async fn start(&self, source: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO feed_runs (source, started_at, items_ingested, status) VALUES (?, ?, 0, ?)",
        )
        .bind(source)
        .bind(format_timestamp(&utc_now()))
        .bind(RunStatus::Running.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Finalize a running run. Runs that already reached a terminal status are left untouched.
    ///
    /// Returns `false` when no running row with `id` existed.
    pub async fn finish(
        &self,
        id: i64,
        items_ingested: i64,
        status: RunStatus,
        error_text: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE feed_runs
            SET finished_at = ?, items_ingested = ?, status = ?, error_text = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(format_timestamp(&utc_now()))
        .bind(items_ingested)
        .bind(status.as_str())
        .bind(error_text)
        .bind(id)
        .bind(RunStatus::Running.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get(&self, id: i64) -> Result<Option<FeedRun>, sqlx::Error> {
        sqlx::query_as::<_, FeedRunRow>(
            "SELECT id, source, started_at, finished_at, items_ingested, status, error_text \
             FROM feed_runs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(FeedRun::try_from)
        .transpose()
    }

    /// Most recent runs first, optionally for one source
    pub async fn list(&self, source: Option<&str>, limit: i64) -> Result<Vec<FeedRun>, sqlx::Error> {
        let limit = limit.clamp(1, MAX_RUN_LIST_LIMIT);

        let rows = match source.filter(|s| !s.is_empty()) {
            Some(source) => {
                sqlx::query_as::<_, FeedRunRow>(
                    "SELECT id, source, started_at, finished_at, items_ingested, status, error_text \
                     FROM feed_runs WHERE source = ? ORDER BY id DESC LIMIT ?",
                )
                .bind(source)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            },
            None => {
                sqlx::query_as::<_, FeedRunRow>(
                    "SELECT id, source, started_at, finished_at, items_ingested, status, error_text \
                     FROM feed_runs ORDER BY id DESC LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            },
        };

        rows.into_iter().map(FeedRun::try_from).collect()
    }
}
