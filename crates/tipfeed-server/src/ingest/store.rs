//! Indicator persistence
//!
//! Upsert keyed on `(value, source)`, filtered search ordered by freshness, and the aggregate
//! counts shown by the stats endpoint. Timestamps are stored in canonical text form so ordering
//! by `last_seen` is plain string ordering.

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tipfeed_common::time::{format_timestamp, parse_timestamp};
use tracing::debug;

use crate::ingest::models::{Indicator, IndicatorType};

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;
pub const MAX_SEARCH_LIMIT: i64 = 1000;

/// Filters for [`IndicatorStore::search`]; `None` means "no filter"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorFilter {
    /// Substring match on `value`
    pub q: Option<String>,
    pub indicator_type: Option<IndicatorType>,
    /// Exact match on `source`
    pub source: Option<String>,
    pub limit: i64,
}

impl IndicatorFilter {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            ..Default::default()
        }
    }
}

/// Aggregate counts over the whole table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorStats {
    pub total: i64,
    pub urls: i64,
    pub cidrs: i64,
    /// Every `spamhaus*` source combined
    pub spamhaus: i64,
    pub urlhaus: i64,
}

#[derive(sqlx::FromRow)]
struct IndicatorRow {
    #[sqlx(rename = "type")]
    indicator_type: String,
    value: String,
    source: String,
    first_seen: String,
    last_seen: String,
    tags: String,
    confidence: i64,
    status: String,
}

impl TryFrom<IndicatorRow> for Indicator {
    type Error = sqlx::Error;

    fn try_from(row: IndicatorRow) -> Result<Self, Self::Error> {
        fn decode<E>(e: E) -> sqlx::Error
        where
            E: std::error::Error + Send + Sync + 'static,
        {
            sqlx::Error::Decode(Box::new(e))
        }

        Ok(Indicator {
            indicator_type: row.indicator_type.parse().map_err(decode)?,
            value: row.value,
            source: row.source,
            first_seen: parse_timestamp(&row.first_seen).map_err(decode)?,
            last_seen: parse_timestamp(&row.last_seen).map_err(decode)?,
            tags: row.tags,
            confidence: u8::try_from(row.confidence).map_err(decode)?,
            status: row.status.parse().map_err(decode)?,
        })
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const SELECT_COLUMNS: &str =
    "SELECT type, value, source, first_seen, last_seen, tags, confidence, status FROM indicators";

/// Indicator repository over a SQLite pool
#[derive(Debug, Clone)]
pub struct IndicatorStore {
    pool: SqlitePool,
}

impl IndicatorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or refresh one indicator.
    ///
    /// On a new `(value, source)` pair every field is written. On an existing pair only
    /// `last_seen`, `tags`, `status` and `confidence` are replaced; `first_seen` and `type`
    /// keep their original values. One statement, so each call is atomic.
    pub async fn upsert(&self, indicator: &Indicator) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO indicators (type, value, source, first_seen, last_seen, tags, confidence, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(value, source) DO UPDATE SET
                last_seen = excluded.last_seen,
                tags = excluded.tags,
                status = excluded.status,
                confidence = excluded.confidence
            "#,
        )
        .bind(indicator.indicator_type.as_str())
        .bind(&indicator.value)
        .bind(&indicator.source)
        .bind(format_timestamp(&indicator.first_seen))
        .bind(format_timestamp(&indicator.last_seen))
        .bind(&indicator.tags)
        .bind(i64::from(indicator.confidence))
        .bind(indicator.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a single indicator by its natural key
    pub async fn get(&self, value: &str, source: &str) -> Result<Option<Indicator>, sqlx::Error> {
        let sql = format!("{SELECT_COLUMNS} WHERE value = ? AND source = ?");
        sqlx::query_as::<_, IndicatorRow>(&sql)
            .bind(value)
            .bind(source)
            .fetch_optional(&self.pool)
            .await?
            .map(Indicator::try_from)
            .transpose()
    }

    /// Filtered search, most recently seen first. `limit` is clamped to `1..=MAX_SEARCH_LIMIT`.
    pub async fn search(&self, filter: &IndicatorFilter) -> Result<Vec<Indicator>, sqlx::Error> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        qb.push(" WHERE 1=1");

        if let Some(q) = filter.q.as_deref().filter(|q| !q.is_empty()) {
            qb.push(" AND value LIKE ")
                .push_bind(format!("%{}%", escape_like(q)))
                .push(" ESCAPE '\\'");
        }
        if let Some(t) = filter.indicator_type {
            qb.push(" AND type = ").push_bind(t.as_str());
        }
        if let Some(source) = filter.source.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND source = ").push_bind(source.to_string());
        }

        let limit = filter.limit.clamp(1, MAX_SEARCH_LIMIT);
        qb.push(" ORDER BY last_seen DESC, id DESC LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<IndicatorRow>().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), limit, "indicator search");

        rows.into_iter().map(Indicator::try_from).collect()
    }

    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM indicators")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_by_type(&self, indicator_type: IndicatorType) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM indicators WHERE type = ?")
            .bind(indicator_type.as_str())
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_by_source(&self, source: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM indicators WHERE source = ?")
            .bind(source)
            .fetch_one(&self.pool)
            .await
    }

    /// Count indicators whose source starts with `prefix`
    pub async fn count_by_source_prefix(&self, prefix: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM indicators WHERE source LIKE ? ESCAPE '\\'")
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_one(&self.pool)
            .await
    }

    pub async fn stats(&self) -> Result<IndicatorStats, sqlx::Error> {
        Ok(IndicatorStats {
            total: self.count_all().await?,
            urls: self.count_by_type(IndicatorType::Url).await?,
            cidrs: self.count_by_type(IndicatorType::Cidr).await?,
            spamhaus: self.count_by_source_prefix("spamhaus").await?,
            urlhaus: self.count_by_source("urlhaus").await?,
        })
    }
}
