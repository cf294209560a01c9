//! # Repository Module
//!
//! Database repository implementations for receipts.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  points-service (ReceiptStore trait)                                    │
//! │       │                                                                 │
//! │       │  db.receipts().find_by_id(id)                                   │
//! │       ▼                                                                 │
//! │  ReceiptRepository                                                      │
//! │  ├── create(&self, receipt)                                             │
//! │  ├── find_by_id(&self, id)                                              │
//! │  └── find(&self, filters)                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod receipt;
