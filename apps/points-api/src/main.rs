//! # Receipt Points API
//!
//! HTTP server that scores receipts for loyalty points.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing (RUST_LOG, default info)                                    │
//! │  2. ApiConfig::load (environment)                                       │
//! │  3. SQLite pool + migrations                                            │
//! │  4. Redis cache, or in-memory when REDIS_URL is unset                   │
//! │  5. background tasks: limiter sweep, store stats                        │
//! │  6. serve until SIGINT/SIGTERM                                          │
//! │  7. flip shutdown, await tasks, close pool                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use points_api::{router, ApiConfig, AppState};
use points_db::Database;
use points_service::{MemoryCache, RateLimiter, ReceiptCache, ReceiptService, RedisCache};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Receipt Points API...");

    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        database = %config.database_path,
        redis = config.redis_url.is_some(),
        limiter = config.limiter_enabled,
        "Configuration loaded"
    );

    if let Some(dir) = Path::new(&config.database_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let db = Database::new(config.db_config()).await?;

    let cache: Arc<dyn ReceiptCache> = match &config.redis_url {
        Some(url) => Arc::new(RedisCache::connect(url).await?),
        None => {
            warn!("REDIS_URL not set, using in-memory cache");
            Arc::new(MemoryCache::new())
        }
    };

    let service = ReceiptService::new(Arc::new(db.receipts()), cache);
    let limiter = RateLimiter::new(config.rate_limit());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = limiter.spawn_sweeper(shutdown_rx.clone());
    let (stats, stats_monitor) = db.spawn_stats_monitor(config.stats_interval(), shutdown_rx);

    let state = AppState {
        service,
        limiter,
        db: db.clone(),
        stats,
        request_timeout: config.request_timeout(),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop background tasks before the pool goes away
    let _ = shutdown_tx.send(true);
    for task in [sweeper, stats_monitor] {
        if let Err(e) = task.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
