//! # Service Errors
//!
//! The error kinds every service operation can fail with.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                          ServiceError           HTTP (api)      │
//! │  ──────────────────────────────  ─────────────────────  ──────────────  │
//! │  FieldErrors (validation)        Invalid { details }    400             │
//! │  DbError::NotFound / bad id      NotFound               404             │
//! │  RateLimiter says no             TooManyRequests        429             │
//! │  any other DbError               Internal               500             │
//! │  (reserved)                      NotImplemented         501             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use points_core::FieldErrors;
use points_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable category of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Invalid,
    NotFound,
    TooManyRequests,
    Internal,
    NotImplemented,
}

/// Errors returned by [`ReceiptService`](crate::ReceiptService) and the
/// [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation.
    #[error("{message}")]
    Invalid {
        message: String,
        /// Field name → reasons.
        details: BTreeMap<String, Vec<String>>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests")]
    TooManyRequests,

    /// Unexpected storage failure. The message is for logs, not clients.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl ServiceError {
    /// Builds an Invalid error from collected validation failures.
    pub fn invalid(message: impl Into<String>, errors: &FieldErrors) -> Self {
        ServiceError::Invalid {
            message: message.into(),
            details: errors.to_details(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Invalid { .. } => ErrorKind::Invalid,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::TooManyRequests => ErrorKind::TooManyRequests,
            ServiceError::Internal(_) => ErrorKind::Internal,
            ServiceError::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Field details, present only for Invalid.
    pub fn details(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ServiceError::Invalid { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Store NotFound stays NotFound; every other database failure is Internal.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ServiceError::NotFound(format!("{entity} not found")),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
