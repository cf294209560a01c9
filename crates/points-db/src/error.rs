//! # Database Error Types
//!
//! How storage failures are reported to callers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                         DbError                            │
//! │  ───────────────────────────────     ─────────────────────────────────  │
//! │  Database(kind = UniqueViolation)    UniqueViolation { constraint }     │
//! │  Database(FK / CHECK / NOT NULL)     ConstraintViolation                │
//! │  Database(other)                     Query                              │
//! │  PoolTimedOut                        Busy                               │
//! │  PoolClosed / Io / Tls               Unavailable                        │
//! │  MigrateError                        Migration                          │
//! │  anything else                       Internal                           │
//! │                                                                         │
//! │  Raised by the repository itself:    NotFound, InvalidData              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service layer keeps [`DbError::NotFound`] distinct and treats every
//! other variant as an internal failure.

use sqlx::error::ErrorKind as SqlErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row with the requested id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An id was inserted twice.
    #[error("Unique constraint failed: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key, CHECK or NOT NULL constraint failed.
    #[error("Constraint failed: {0}")]
    ConstraintViolation(String),

    /// A stored row could not be turned back into a receipt.
    #[error("Invalid stored {entity}: {reason}")]
    InvalidData { entity: String, reason: String },

    /// The database cannot be reached (closed pool, I/O error, bad path).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// No connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    Busy,

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn invalid_data(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::InvalidData {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // SQLite reports e.g. "UNIQUE constraint failed: item.id"
                let message = db_err.message().to_string();
                match db_err.kind() {
                    SqlErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or(message.as_str())
                            .to_string(),
                    },
                    SqlErrorKind::ForeignKeyViolation
                    | SqlErrorKind::CheckViolation
                    | SqlErrorKind::NotNullViolation => DbError::ConstraintViolation(message),
                    _ => DbError::Query(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::Busy,
            sqlx::Error::PoolClosed => DbError::Unavailable("connection pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => DbError::Unavailable(e.to_string()),
            sqlx::Error::Configuration(e) => DbError::Unavailable(e.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
