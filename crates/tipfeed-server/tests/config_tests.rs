//! Environment-driven configuration

use serial_test::serial;
use std::time::Duration;

use tipfeed_server::config::{Config, DEFAULT_DATABASE_URL};
use tipfeed_server::ingest::config::{SPAMHAUS_DROPV6_URL, URLHAUS_CSV_URL};
use tipfeed_server::ingest::FeedFamily;

const VARS: &[&str] = &[
    "TIPFEED_HOST",
    "TIPFEED_PORT",
    "TIPFEED_SHUTDOWN_TIMEOUT",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "DATABASE_CONNECT_TIMEOUT",
    "CORS_ALLOWED_ORIGINS",
    "INGEST_ENABLED",
    "INGEST_RUN_ON_STARTUP",
    "INGEST_REQUEST_TIMEOUT_SECS",
    "INGEST_USER_AGENT",
    "INGEST_URLHAUS_CSV_URL",
    "INGEST_URLHAUS_TEXT_URL",
    "INGEST_URLHAUS_INTERVAL_SECS",
    "INGEST_SPAMHAUS_DROP_URL",
    "INGEST_SPAMHAUS_EDROP_URL",
    "INGEST_SPAMHAUS_DROPV6_URL",
    "INGEST_SPAMHAUS_INTERVAL_SECS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:5000");
    assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
    assert!(config.ingest.enabled);
    assert!(!config.ingest.run_on_startup);
    assert_eq!(config.ingest.urlhaus.csv_url, URLHAUS_CSV_URL);
    assert_eq!(config.ingest.spamhaus.dropv6_url, SPAMHAUS_DROPV6_URL);
    assert_eq!(config.ingest.request_timeout(), Duration::from_secs(25));
    assert_eq!(config.ingest.interval_for(FeedFamily::Urlhaus), Duration::from_secs(3600));
    assert_eq!(config.ingest.interval_for(FeedFamily::Spamhaus), Duration::from_secs(21600));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    std::env::set_var("TIPFEED_PORT", "8088");
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("INGEST_ENABLED", "false");
    std::env::set_var("INGEST_RUN_ON_STARTUP", "true");
    std::env::set_var("INGEST_URLHAUS_INTERVAL_SECS", "600");
    std::env::set_var("INGEST_SPAMHAUS_DROP_URL", "http://mirror.internal/drop.txt");
    std::env::set_var("CORS_ALLOWED_ORIGINS", "http://a.example, http://b.example");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.server.port, 8088);
    assert_eq!(config.database.url, "sqlite::memory:");
    assert!(!config.ingest.enabled);
    assert!(config.ingest.run_on_startup);
    assert_eq!(config.ingest.interval_for(FeedFamily::Urlhaus), Duration::from_secs(600));
    assert_eq!(config.ingest.spamhaus.drop_url, "http://mirror.internal/drop.txt");
    assert_eq!(config.cors.allowed_origins, vec!["http://a.example", "http://b.example"]);
}

#[test]
#[serial]
fn test_invalid_feed_url_rejected() {
    clear_env();
    std::env::set_var("INGEST_URLHAUS_CSV_URL", "ftp://urlhaus.example/csv");

    let result = Config::from_env();
    clear_env();

    let err = result.unwrap_err().to_string();
    assert!(err.contains("INGEST_URLHAUS_CSV_URL"), "{err}");
}

#[test]
#[serial]
fn test_zero_interval_rejected() {
    clear_env();
    std::env::set_var("INGEST_SPAMHAUS_INTERVAL_SECS", "0");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}
