//! # Receipt Repository
//!
//! Database operations for receipts and their items.
//!
//! ## Key Operations
//! - Transactional create (receipt row + chunked multi-row item inserts)
//! - Lookup by id
//! - Sorted, paginated listing with batched item loading
//!
//! ## Paginated Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    find(filters)  (one read transaction)                │
//! │                                                                         │
//! │  1. SELECT COUNT(*) FROM receipt                       → total          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. SELECT ... FROM receipt                                             │
//! │     ORDER BY <column> <dir>, id                                         │
//! │     LIMIT ?1 OFFSET ?2                                 → page of rows   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. SELECT ... FROM item WHERE receipt_id IN (?, ?, ...)                │
//! │     ORDER BY receipt_id, position                      → all items      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Group items by receipt_id in memory, attach to rows in page order      │
//! │                                                                         │
//! │  Two queries for any page size instead of 1 + N.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ORDER BY column comes from [`SortColumn`], a closed enum, so no
//! client text is ever spliced into SQL.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use points_core::{
    Filters, Item, Metadata, Money, PaginatedReceipts, Receipt, SortColumn, DATE_FORMAT, TIME_FORMAT,
};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: String,
    retailer: String,
    purchase_date: String,
    purchase_time: String,
    total: i64,
}

impl ReceiptRow {
    fn into_receipt(self, items: Vec<Item>) -> DbResult<Receipt> {
        let purchase_date = NaiveDate::parse_from_str(&self.purchase_date, DATE_FORMAT).map_err(|e| {
            DbError::invalid_data("receipt", format!("purchase_date {:?}: {e}", self.purchase_date))
        })?;
        let purchase_time = NaiveTime::parse_from_str(&self.purchase_time, TIME_FORMAT).map_err(|e| {
            DbError::invalid_data("receipt", format!("purchase_time {:?}: {e}", self.purchase_time))
        })?;

        Ok(Receipt {
            id: self.id,
            retailer: self.retailer,
            purchase_date,
            purchase_time,
            total: Money::from_cents(self.total),
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    short_description: String,
    price: i64,
    receipt_id: String,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            short_description: row.short_description,
            price: Money::from_cents(row.price),
        }
    }
}

const RECEIPT_COLUMNS: &str = "id, retailer, purchase_date, purchase_time, total";

/// Item rows per INSERT statement (five parameters each).
const ITEM_INSERT_CHUNK: usize = 100;

// =============================================================================
// Repository
// =============================================================================

/// Repository for receipt database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.receipts();
///
/// repo.create(&receipt).await?;
/// let stored = repo.find_by_id(&receipt.id).await?;
/// let page = repo.find(&Filters::new(1, 20, "-total")?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Inserts a receipt and all of its items atomically.
    ///
    /// Either both the receipt row and every item row are committed or,
    /// on any failure, none are. Dropping the returned future before it
    /// completes also rolls back.
    pub async fn create(&self, receipt: &Receipt) -> DbResult<()> {
        debug!(id = %receipt.id, items = receipt.items.len(), "Creating receipt");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO receipt (id, retailer, purchase_date, purchase_time, total)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.retailer)
        .bind(receipt.purchase_date.format(DATE_FORMAT).to_string())
        .bind(receipt.purchase_time.format(TIME_FORMAT).to_string())
        .bind(receipt.total.cents())
        .execute(&mut *tx)
        .await?;

        // Chunked to stay under SQLite's bound-parameter limit
        for (chunk_index, chunk) in receipt.items.chunks(ITEM_INSERT_CHUNK).enumerate() {
            let first_position = chunk_index * ITEM_INSERT_CHUNK;
            let mut insert = QueryBuilder::<Sqlite>::new(
                "INSERT INTO item (id, short_description, price, receipt_id, position) ",
            );
            insert.push_values(chunk.iter().enumerate(), |mut row, (offset, item)| {
                row.push_bind(item.id.clone())
                    .push_bind(item.short_description.clone())
                    .push_bind(item.price.cents())
                    .push_bind(receipt.id.clone())
                    .push_bind((first_position + offset) as i64);
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        debug!(id = %receipt.id, "Receipt created");
        Ok(())
    }

    /// Loads a receipt with its items.
    ///
    /// ## Returns
    /// * `Ok(Receipt)` - items in their original order
    /// * `Err(DbError::NotFound)` - no receipt with this id
    pub async fn find_by_id(&self, id: &str) -> DbResult<Receipt> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ReceiptRow> =
            sqlx::query_as(&format!("SELECT {RECEIPT_COLUMNS} FROM receipt WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(row) = row else {
            return Err(DbError::not_found("Receipt", id));
        };

        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, short_description, price, receipt_id
            FROM item
            WHERE receipt_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_receipt(items.into_iter().map(Item::from).collect())
    }

    /// Lists one page of receipts.
    ///
    /// Ties on the sort column are broken by id so consecutive pages never
    /// overlap or skip rows. An empty store yields an empty listing without
    /// metadata. A page past the end yields no receipts but still reports
    /// metadata.
    pub async fn find(&self, filters: &Filters) -> DbResult<PaginatedReceipts> {
        let sort = filters.sort();
        debug!(
            page = filters.page(),
            limit = filters.limit(),
            sort = %sort,
            "Listing receipts"
        );

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt")
            .fetch_one(&mut *tx)
            .await?;

        if total == 0 {
            tx.commit().await?;
            return Ok(PaginatedReceipts::empty());
        }

        let tie_breaker = if sort.column == SortColumn::Id { "" } else { ", id ASC" };
        let sql = format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipt ORDER BY {} {}{} LIMIT ?1 OFFSET ?2",
            sort.column.as_str(),
            sort.direction.as_sql(),
            tie_breaker,
        );

        let rows: Vec<ReceiptRow> = sqlx::query_as(&sql)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&mut *tx)
            .await?;

        let mut items_by_receipt: HashMap<String, Vec<Item>> = HashMap::new();
        if !rows.is_empty() {
            let mut select = QueryBuilder::<Sqlite>::new(
                "SELECT id, short_description, price, receipt_id FROM item WHERE receipt_id IN (",
            );
            let mut ids = select.separated(", ");
            for row in &rows {
                ids.push_bind(row.id.clone());
            }
            ids.push_unseparated(") ORDER BY receipt_id, position");

            let items: Vec<ItemRow> = select.build_query_as().fetch_all(&mut *tx).await?;
            for item in items {
                items_by_receipt
                    .entry(item.receipt_id.clone())
                    .or_default()
                    .push(Item::from(item));
            }
        }

        tx.commit().await?;

        let receipts = rows
            .into_iter()
            .map(|row| {
                let items = items_by_receipt.remove(&row.id).unwrap_or_default();
                row.into_receipt(items)
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(PaginatedReceipts {
            receipts,
            metadata: Metadata::calculate(total, filters.page(), filters.limit()),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
