//! # points-core: Pure Receipt Logic
//!
//! Receipt types, validation, the loyalty-points rules and listing filters.
//! Nothing in this crate touches a database, a cache or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Receipt Points Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    points-api (axum)                            │   │
//! │  │   POST /receipts/process   GET /receipts/{id}/points            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            points-service (cache-aside orchestration)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ points-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │   │
//! │  │   │   types   │  │validation │  │  scoring  │  │  filters  │    │   │
//! │  │   │  Receipt  │  │  rules +  │  │  7 rules  │  │ page/sort │    │   │
//! │  │   │   Item    │  │FieldErrors│  │ Breakdown │  │ Metadata  │    │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Receipt and item types (inbound, validated, stored)
//! - [`money`] - Integer-cent money type
//! - [`error`] - Validation error types
//! - [`validation`] - Receipt validation
//! - [`scoring`] - The points rules
//! - [`filters`] - Listing filters and pagination metadata

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filters;
pub mod money;
pub mod scoring;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{FieldErrors, ValidationError};
pub use filters::{FilterParams, Filters, Metadata, PaginatedReceipts, SortColumn, SortDirection, SortKey};
pub use money::Money;
pub use scoring::{breakdown, score, Breakdown};
pub use types::*;
pub use validation::{validate_receipt, validate_receipt_id};
