//! # points-db: Database Layer for Receipt Points
//!
//! Receipt persistence on SQLite with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ReceiptService (points-service)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     points-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │    │   │
//! │  │   │   (pool.rs)   │◄───│ (receipt.rs)  │    │  (embedded)  │    │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │   │
//! │  │           │                                                     │   │
//! │  │           └──── stats.rs: background row-count polling          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) ./data/receipts.db                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Receipt repository
//! - [`stats`] - Store row counts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use points_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/receipts.db")).await?;
//! db.receipts().create(&receipt).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod stats;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};
pub use repository::receipt::ReceiptRepository;
pub use stats::StoreStats;
