//! HTTP error responses.
//!
//! Every failure leaves the server as the same JSON envelope:
//!
//! ```json
//! {
//!   "code": "INVALID",
//!   "message": "Invalid receipt",
//!   "details": { "total": ["total must equal the sum of item prices: total=9.00 items=9.01"] }
//! }
//! ```
//!
//! `details` is only present for validation failures.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use points_service::{ErrorKind, ServiceError};
use serde::Serialize;
use tracing::error;

/// Response body for every error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Vec<String>>>,
}

/// Error returned by handlers and middleware.
#[derive(Debug)]
pub struct ApiError(ServiceError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Request-shape problem that never reached the service.
    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        let mut details = BTreeMap::new();
        details.insert(field.to_string(), vec![reason.into()]);
        ApiError(ServiceError::Invalid {
            message: "Malformed request".to_string(),
            details,
        })
    }

    pub fn timeout() -> Self {
        ApiError(ServiceError::Internal("request deadline exceeded".to_string()))
    }

    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::malformed("query", rejection.body_text())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::NotImplemented => StatusCode::NOT_IMPLEMENTED,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();

        let message = match &self.0 {
            // Internal details stay in the logs
            ServiceError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            code: kind,
            message,
            details: self.0.details().cloned(),
        };

        (status_for(kind), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Invalid), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::TooManyRequests), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::NotImplemented), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let response = ApiError::from(ServiceError::Internal("disk full".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_is_invalid() {
        let err = ApiError::malformed("body", "expected value at line 1 column 1");
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
