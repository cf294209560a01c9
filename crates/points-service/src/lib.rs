//! # points-service: Receipt Orchestration
//!
//! The operations clients call, built on the pure rules in `points-core`
//! and the storage in `points-db`.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   request ──► RateLimiter::check(client) ──✗──► TooManyRequests         │
//! │                        │                                                │
//! │                        ▼                                                │
//! │               ReceiptService                                            │
//! │               ├── process            validate → store → score → cache   │
//! │               ├── get_points_by_id   cache ─miss─► store → score        │
//! │               └── get_receipts       cache ─miss─► store                │
//! │                        │                 │                              │
//! │                        ▼                 ▼                              │
//! │              dyn ReceiptStore      dyn ReceiptCache                     │
//! │              (ReceiptRepository)   (RedisCache | MemoryCache)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`service`] - The three receipt operations
//! - [`store`] - Storage capability trait
//! - [`cache`] - Cache capability trait and backends
//! - [`rate_limit`] - Per-client token buckets
//! - [`error`] - Service error kinds

pub mod cache;
pub mod error;
pub mod rate_limit;
pub mod service;
pub mod store;

pub use cache::{CacheError, CacheResult, MemoryCache, ReceiptCache, RedisCache, CACHE_TTL};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use service::ReceiptService;
pub use store::ReceiptStore;
