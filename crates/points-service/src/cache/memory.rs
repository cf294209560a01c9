//! In-process [`ReceiptCache`].
//!
//! Same contract as Redis, including expiry, so the service behaves the
//! same with or without a Redis server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use points_core::{Filters, PaginatedReceipts};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{points_key, receipts_page_key, CacheResult, ReceiptCache, CACHE_TTL};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Map-backed cache with per-entry expiry.
///
/// Expired entries read as misses and are dropped on the next write.
#[derive(Debug)]
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        MemoryCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    async fn set(&self, key: String, value: String) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptCache for MemoryCache {
    async fn get_points(&self, receipt_id: &str) -> CacheResult<Option<i64>> {
        Ok(self
            .get(&points_key(receipt_id))
            .await
            .and_then(|raw| raw.parse().ok()))
    }

    async fn set_points(&self, receipt_id: &str, points: i64) -> CacheResult<()> {
        self.set(points_key(receipt_id), points.to_string()).await;
        Ok(())
    }

    async fn get_receipts(&self, filters: &Filters) -> CacheResult<Option<PaginatedReceipts>> {
        match self.get(&receipts_page_key(filters)).await {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set_receipts(&self, filters: &Filters, page: &PaginatedReceipts) -> CacheResult<()> {
        let json = serde_json::to_string(page)?;
        self.set(receipts_page_key(filters), json).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use points_core::Metadata;

    #[tokio::test]
    async fn test_points_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get_points("a").await.unwrap(), None);

        cache.set_points("a", 28).await.unwrap();
        assert_eq!(cache.get_points("a").await.unwrap(), Some(28));
        assert_eq!(cache.get_points("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pages_are_keyed_by_filters() {
        let cache = MemoryCache::new();
        let first = Filters::new(1, 10, "id").unwrap();
        let second = Filters::new(2, 10, "id").unwrap();
        let page = PaginatedReceipts {
            receipts: Vec::new(),
            metadata: Metadata::calculate(15, 1, 10),
        };

        cache.set_receipts(&first, &page).await.unwrap();

        assert_eq!(cache.get_receipts(&first).await.unwrap(), Some(page));
        assert_eq!(cache.get_receipts(&second).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = MemoryCache::new();
        cache.set_points("a", 109).await.unwrap();

        tokio::time::advance(CACHE_TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get_points("a").await.unwrap(), Some(109));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get_points("a").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();
        cache.set_points("a", 1).await.unwrap();
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
