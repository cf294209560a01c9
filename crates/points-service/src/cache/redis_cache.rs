//! Redis-backed [`ReceiptCache`].

use std::time::Duration;

use async_trait::async_trait;
use points_core::{Filters, PaginatedReceipts};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};

use super::{points_key, receipts_page_key, CacheResult, ReceiptCache, CACHE_TTL};

/// Redis cache shared by every request handler.
///
/// The [`ConnectionManager`] multiplexes one connection and reconnects on
/// failure; each call works on a cheap clone of it.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379/0)
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Connected to Redis cache");

        Ok(Self {
            conn,
            ttl: CACHE_TTL,
        })
    }

    /// Overrides the entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl ReceiptCache for RedisCache {
    async fn get_points(&self, receipt_id: &str) -> CacheResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let points: Option<i64> = conn.get(points_key(receipt_id)).await?;
        Ok(points)
    }

    async fn set_points(&self, receipt_id: &str, points: i64) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(points_key(receipt_id), points, self.ttl_secs())
            .await?;

        debug!(receipt_id = %receipt_id, points, "Cached points");
        Ok(())
    }

    async fn get_receipts(&self, filters: &Filters) -> CacheResult<Option<PaginatedReceipts>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(receipts_page_key(filters)).await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    async fn set_receipts(&self, filters: &Filters, page: &PaginatedReceipts) -> CacheResult<()> {
        let key = receipts_page_key(filters);
        let json = serde_json::to_string(page)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, self.ttl_secs()).await?;

        debug!(key = %key, receipts = page.receipts.len(), "Cached receipt page");
        Ok(())
    }
}
