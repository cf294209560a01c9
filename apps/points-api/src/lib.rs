//! # points-api: Receipt Points HTTP Server
//!
//! Library half of the binary: configuration, error mapping and the router,
//! so integration tests can drive the full HTTP surface without a socket.
//!
//! ## Modules
//!
//! - [`config`] - Environment configuration
//! - [`error`] - Error envelope and status mapping
//! - [`routes`] - Handlers, middleware and the router

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use routes::{router, AppState};
