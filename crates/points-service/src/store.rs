//! Durable receipt storage as seen by the service.

use async_trait::async_trait;
use points_core::{Filters, PaginatedReceipts, Receipt};
use points_db::{DbResult, ReceiptRepository};

/// Durable receipt storage.
///
/// Implementations must make `create` atomic and report a missing receipt
/// from `find_by_id` as [`DbError::NotFound`](points_db::DbError::NotFound).
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn create(&self, receipt: &Receipt) -> DbResult<()>;

    async fn find_by_id(&self, id: &str) -> DbResult<Receipt>;

    async fn find(&self, filters: &Filters) -> DbResult<PaginatedReceipts>;
}

#[async_trait]
impl ReceiptStore for ReceiptRepository {
    async fn create(&self, receipt: &Receipt) -> DbResult<()> {
        ReceiptRepository::create(self, receipt).await
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Receipt> {
        ReceiptRepository::find_by_id(self, id).await
    }

    async fn find(&self, filters: &Filters) -> DbResult<PaginatedReceipts> {
        ReceiptRepository::find(self, filters).await
    }
}
