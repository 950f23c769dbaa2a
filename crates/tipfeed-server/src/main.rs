//! tipfeed server - main entry point

use anyhow::Result;
use std::net::SocketAddr;
use tipfeed_common::logging::{init_logging, LogConfig};
use tokio::signal;
use tracing::info;

use tipfeed_server::{app, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Code defaults first, `LOG_*` variables take precedence
    let log_config = LogConfig::builder()
        .log_file_prefix("tipfeed-server")
        .filter_directives("tipfeed_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting tipfeed server");

    let config = Config::load()?;
    info!("Configuration loaded - server will bind to {}", config.bind_address());

    let ctx = app::AppContext::initialize(config.clone()).await?;

    let scheduler = if config.ingest.enabled {
        let handle = ctx.scheduler().start();
        info!(feeds = handle.schedules().len(), "Feed scheduler started");
        Some(handle)
    } else {
        info!("Ingestion is disabled (INGEST_ENABLED=false)");
        None
    };

    let router = app::create_router(ctx);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        handle.shutdown(config.shutdown_timeout()).await;
    }

    info!("Server shut down gracefully");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
