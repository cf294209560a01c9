//! # Store Stats
//!
//! Row counts for the receipt and item tables, polled in the background.
//!
//! ```text
//! ┌──────────────────────┐   every tick    ┌──────────────────────────────┐
//! │ stats monitor task   │ ──────────────► │ SELECT COUNT(*) FROM receipt │
//! │                      │                 │ SELECT COUNT(*) FROM item    │
//! │  select! {           │ ◄────────────── └──────────────────────────────┘
//! │    tick => collect   │
//! │    shutdown => break │ ──► watch::Sender<StoreStats> ──► /health
//! │  }                   │
//! └──────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::DbResult;

/// Snapshot of how much the store holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub receipts: i64,
    pub items: i64,
    /// `None` until the first successful poll.
    pub collected_at: Option<DateTime<Utc>>,
}

/// Counts both tables inside one transaction so the pair is consistent.
pub(crate) async fn collect(pool: &SqlitePool) -> DbResult<StoreStats> {
    let mut tx = pool.begin().await?;

    let receipts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt")
        .fetch_one(&mut *tx)
        .await?;
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item")
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StoreStats {
        receipts,
        items,
        collected_at: Some(Utc::now()),
    })
}

pub(crate) fn spawn_monitor(
    pool: SqlitePool,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> (watch::Receiver<StoreStats>, JoinHandle<()>) {
    let (stats_tx, stats_rx) = watch::channel(StoreStats::default());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(interval_ms = every.as_millis() as u64, "Store stats monitor started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    match collect(&pool).await {
                        Ok(stats) => {
                            debug!(receipts = stats.receipts, items = stats.items, "Store stats collected");
                            stats_tx.send_replace(stats);
                        }
                        Err(e) => warn!(error = %e, "Failed to collect store stats"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!("Store stats monitor stopped");
    });

    (stats_rx, handle)
}
