//! # Receipt Cache
//!
//! Fast key/value layer in front of the store.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Key                                        Value               TTL     │
//! │  ─────────────────────────────────────────  ──────────────────  ──────  │
//! │  points:<receiptID>                         integer points      2h      │
//! │  receipts:page:<p>:limit:<l>:sort:<s>       PaginatedReceipts   2h      │
//! │                                             (JSON)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are written on create (points) and on read misses (both kinds)
//! and are never invalidated: receipts are immutable, and a listing that
//! misses a newer receipt is acceptable until its entry expires.
//!
//! Two backends implement [`ReceiptCache`]:
//! - [`RedisCache`] - shared Redis instance
//! - [`MemoryCache`] - in-process map, used when no Redis is configured

mod memory;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use points_core::{Filters, PaginatedReceipts};
use thiserror::Error;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

/// Lifetime of every cache entry.
pub const CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Cache backend failures. A miss is not an error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache key for a receipt's points.
pub fn points_key(receipt_id: &str) -> String {
    format!("points:{receipt_id}")
}

/// Cache key for one page of a listing.
pub fn receipts_page_key(filters: &Filters) -> String {
    format!(
        "receipts:page:{}:limit:{}:sort:{}",
        filters.page(),
        filters.limit(),
        filters.sort()
    )
}

/// Points and listing cache.
///
/// `get_*` returns `Ok(None)` on a miss, including an expired entry.
#[async_trait]
pub trait ReceiptCache: Send + Sync {
    async fn get_points(&self, receipt_id: &str) -> CacheResult<Option<i64>>;

    async fn set_points(&self, receipt_id: &str, points: i64) -> CacheResult<()>;

    async fn get_receipts(&self, filters: &Filters) -> CacheResult<Option<PaginatedReceipts>>;

    async fn set_receipts(&self, filters: &Filters, page: &PaginatedReceipts) -> CacheResult<()>;
}
