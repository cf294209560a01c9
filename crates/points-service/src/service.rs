//! # Receipt Service
//!
//! The three operations clients call, each coordinating the store and the
//! cache.
//!
//! ## Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process(input)                                                         │
//! │    validate ──✗──► Invalid (store untouched)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    assign UUIDs ──► store.create ──✗──► Internal (no cache write)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    score ──► cache.set_points (failure logged, not returned)            │
//! │                                                                         │
//! │  get_points_by_id(id)                                                   │
//! │    not a UUID ──► NotFound                                              │
//! │    cache hit  ──► points                                                │
//! │    miss ──► store.find_by_id ──► score ──► cache.set_points ──► points  │
//! │                                                                         │
//! │  get_receipts(params)                                                   │
//! │    validate ──✗──► Invalid                                              │
//! │    cache hit  ──► page                                                  │
//! │    miss ──► store.find ──► cache.set_receipts ──► page                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cache failures never fail an operation: a read error counts as a miss
//! and a write error leaves the entry to be filled by a later read.
//! Dropping an operation's future abandons it; an unfinished store
//! transaction rolls back.

use std::sync::Arc;

use points_core::{score, validate_receipt, validate_receipt_id, FilterParams, PaginatedReceipts, Receipt, ReceiptInput};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::ReceiptCache;
use crate::error::{ServiceError, ServiceResult};
use crate::store::ReceiptStore;

/// Cache-aside orchestration over a [`ReceiptStore`] and a [`ReceiptCache`].
///
/// Cheap to clone; clones share the same store and cache.
#[derive(Clone)]
pub struct ReceiptService {
    store: Arc<dyn ReceiptStore>,
    cache: Arc<dyn ReceiptCache>,
}

impl ReceiptService {
    pub fn new(store: Arc<dyn ReceiptStore>, cache: Arc<dyn ReceiptCache>) -> Self {
        ReceiptService { store, cache }
    }

    /// Validates, stores and scores a new receipt.
    ///
    /// ## Returns
    /// * `Ok(Receipt)` - the stored receipt with its generated ids
    /// * `Err(Invalid)` - every validation failure, keyed by field
    /// * `Err(Internal)` - the store write failed; nothing was persisted
    pub async fn process(&self, input: &ReceiptInput) -> ServiceResult<Receipt> {
        let valid =
            validate_receipt(input).map_err(|errors| ServiceError::invalid("Invalid receipt", &errors))?;
        let receipt = valid.into_receipt(|| Uuid::new_v4().to_string());

        self.store.create(&receipt).await?;

        let points = score(&receipt);
        if let Err(e) = self.cache.set_points(&receipt.id, points).await {
            warn!(receipt_id = %receipt.id, error = %e, "Failed to cache points for new receipt");
        }

        info!(receipt_id = %receipt.id, items = receipt.items.len(), points, "Receipt processed");
        Ok(receipt)
    }

    /// Points for a stored receipt, served from the cache when possible.
    pub async fn get_points_by_id(&self, id: &str) -> ServiceResult<i64> {
        if validate_receipt_id(id).is_err() {
            return Err(ServiceError::NotFound("Receipt not found".to_string()));
        }

        match self.cache.get_points(id).await {
            Ok(Some(points)) => {
                debug!(receipt_id = %id, "Points cache hit");
                return Ok(points);
            }
            Ok(None) => debug!(receipt_id = %id, "Points cache miss"),
            Err(e) => warn!(receipt_id = %id, error = %e, "Points cache read failed"),
        }

        let receipt = self.store.find_by_id(id).await?;
        let points = score(&receipt);

        if let Err(e) = self.cache.set_points(id, points).await {
            warn!(receipt_id = %id, error = %e, "Failed to cache points");
        }

        Ok(points)
    }

    /// One page of stored receipts, served from the cache when possible.
    pub async fn get_receipts(&self, params: &FilterParams) -> ServiceResult<PaginatedReceipts> {
        let filters = params
            .validate()
            .map_err(|errors| ServiceError::invalid("Invalid filter parameters", &errors))?;

        match self.cache.get_receipts(&filters).await {
            Ok(Some(page)) => {
                debug!(page = filters.page(), limit = filters.limit(), "Receipt page cache hit");
                return Ok(page);
            }
            Ok(None) => debug!(page = filters.page(), limit = filters.limit(), "Receipt page cache miss"),
            Err(e) => warn!(error = %e, "Receipt page cache read failed"),
        }

        let page = self.store.find(&filters).await?;

        if let Err(e) = self.cache.set_receipts(&filters, &page).await {
            warn!(error = %e, "Failed to cache receipt page");
        }

        Ok(page)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
