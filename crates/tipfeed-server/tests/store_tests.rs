//! Indicator store: merge-upsert semantics, search and counts

mod common;

use common::{at, cidr, memory_pool, url};
use tipfeed_server::config::DatabaseConfig;
use tipfeed_server::db;
use tipfeed_server::ingest::{IndicatorFilter, IndicatorStatus, IndicatorStore, IndicatorType};

#[tokio::test]
async fn test_upsert_inserts_all_fields() {
    let store = IndicatorStore::new(memory_pool().await);
    let ind = url("http://evil.example/a", at(1, 12)).with_tags("elf,mirai");

    store.upsert(&ind).await.unwrap();

    let stored = store.get("http://evil.example/a", "urlhaus").await.unwrap().unwrap();
    assert_eq!(stored, ind);
}

#[tokio::test]
async fn test_upsert_twice_is_idempotent() {
    let store = IndicatorStore::new(memory_pool().await);
    let ind = url("http://evil.example/a", at(1, 12));

    store.upsert(&ind).await.unwrap();
    store.upsert(&ind).await.unwrap();

    assert_eq!(store.count_all().await.unwrap(), 1);
    assert_eq!(store.get(&ind.value, &ind.source).await.unwrap().unwrap(), ind);
}

#[tokio::test]
async fn test_conflict_preserves_first_seen_and_refreshes_the_rest() {
    let store = IndicatorStore::new(memory_pool().await);
    store
        .upsert(&url("http://evil.example/a", at(1, 12)).with_tags("elf"))
        .await
        .unwrap();

    let mut refreshed = url("http://evil.example/a", at(4, 8))
        .with_tags("elf,mirai")
        .with_status(IndicatorStatus::Inactive);
    refreshed.confidence = 90;
    refreshed.indicator_type = IndicatorType::Domain;
    store.upsert(&refreshed).await.unwrap();

    let stored = store.get("http://evil.example/a", "urlhaus").await.unwrap().unwrap();
    assert_eq!(stored.first_seen, at(1, 12));
    assert_eq!(stored.last_seen, at(4, 8));
    assert_eq!(stored.tags, "elf,mirai");
    assert_eq!(stored.status, IndicatorStatus::Inactive);
    assert_eq!(stored.confidence, 90);
    // Type is part of the original identity and is not rewritten
    assert_eq!(stored.indicator_type, IndicatorType::Url);
    assert!(stored.first_seen <= stored.last_seen);
}

#[tokio::test]
async fn test_same_value_from_different_sources_is_kept_twice() {
    let store = IndicatorStore::new(memory_pool().await);
    store.upsert(&cidr("198.51.100.0/24", "spamhaus-drop")).await.unwrap();
    store.upsert(&cidr("198.51.100.0/24", "spamhaus-edrop")).await.unwrap();

    assert_eq!(store.count_all().await.unwrap(), 2);
    assert_eq!(store.count_by_source_prefix("spamhaus").await.unwrap(), 2);
    assert_eq!(store.count_by_source("spamhaus-drop").await.unwrap(), 1);
}

#[tokio::test]
async fn test_out_of_range_confidence_is_rejected_by_schema() {
    let store = IndicatorStore::new(memory_pool().await);
    let mut bad = url("http://evil.example/a", at(1, 0));
    bad.confidence = 150;

    assert!(store.upsert(&bad).await.is_err());
    assert_eq!(store.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_filters_combine() {
    let store = IndicatorStore::new(memory_pool().await);
    store.upsert(&url("http://evil.example/a", at(1, 0))).await.unwrap();
    store.upsert(&url("http://other.example/b", at(2, 0))).await.unwrap();
    store.upsert(&cidr("203.0.113.0/24", "spamhaus-drop")).await.unwrap();

    let filter = IndicatorFilter {
        q: Some("evil".into()),
        indicator_type: Some(IndicatorType::Url),
        source: Some("urlhaus".into()),
        limit: 10,
    };
    let found = store.search(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, "http://evil.example/a");

    let cidrs = store
        .search(&IndicatorFilter {
            indicator_type: Some(IndicatorType::Cidr),
            ..IndicatorFilter::new()
        })
        .await
        .unwrap();
    assert_eq!(cidrs.len(), 1);
}

#[tokio::test]
async fn test_search_limit_is_clamped() {
    let store = IndicatorStore::new(memory_pool().await);
    for day in 1..=3 {
        store
            .upsert(&url(&format!("http://evil.example/{day}"), at(day, 0)))
            .await
            .unwrap();
    }

    let zero = store
        .search(&IndicatorFilter {
            limit: 0,
            ..IndicatorFilter::new()
        })
        .await
        .unwrap();
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].value, "http://evil.example/3");

    let huge = store
        .search(&IndicatorFilter {
            limit: 1_000_000,
            ..IndicatorFilter::new()
        })
        .await
        .unwrap();
    assert_eq!(huge.len(), 3);
}

#[tokio::test]
async fn test_stats() {
    let store = IndicatorStore::new(memory_pool().await);
    store.upsert(&url("http://a.example/", at(1, 0))).await.unwrap();
    store.upsert(&cidr("203.0.113.0/24", "spamhaus-drop")).await.unwrap();
    store.upsert(&cidr("2001:db8::/32", "spamhaus-dropv6")).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.urls, 1);
    assert_eq!(stats.cidrs, 2);
    assert_eq!(stats.spamhaus, 2);
    assert_eq!(stats.urlhaus, 1);
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("tip.db").display()),
        max_connections: 2,
        connect_timeout_secs: 5,
    };

    let pool = db::create_pool(&config).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    IndicatorStore::new(pool.clone())
        .upsert(&cidr("192.0.2.0/24", "spamhaus-drop"))
        .await
        .unwrap();
    pool.close().await;

    let reopened = db::create_pool(&config).await.unwrap();
    db::run_migrations(&reopened).await.unwrap();
    let store = IndicatorStore::new(reopened);
    assert_eq!(store.count_all().await.unwrap(), 1);
    assert!(store.get("192.0.2.0/24", "spamhaus-drop").await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_of_one_key_leave_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("tip.db").display()),
        max_connections: 8,
        connect_timeout_secs: 30,
    };
    let pool = db::create_pool(&config).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let store = IndicatorStore::new(pool);

    let tasks: Vec<_> = (0..64u32)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let mut ind = url("http://race.example/", at(1, 0));
                ind.last_seen = at(2 + i % 20, i % 24);
                store.upsert(&ind).await
            })
        })
        .collect();

    let mut errors = 0;
    for task in tasks {
        if task.await.unwrap().is_err() {
            errors += 1;
        }
    }

    assert_eq!(errors, 0);
    assert_eq!(store.count_all().await.unwrap(), 1);
    let stored = store.get("http://race.example/", "urlhaus").await.unwrap().unwrap();
    assert_eq!(stored.first_seen, at(1, 0));
}
