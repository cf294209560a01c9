//! # Error Types
//!
//! Validation error types for points-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  points-core errors (this file)                                         │
//! │  ├── ValidationError  - One rule broken by one field                    │
//! │  └── FieldErrors      - Every violation, grouped by field name          │
//! │                                                                         │
//! │  points-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  points-service errors                                                  │
//! │  └── ServiceError     - Invalid / NotFound / TooManyRequests / ...      │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → ServiceError::Invalid → HTTP 400 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation never stops at the first problem: every broken rule is
//! recorded so the client can fix the whole document in one round trip.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Validation Error
// =============================================================================

/// A single broken input rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Amount above the largest accepted value.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Money },

    /// Invalid format (e.g., invalid date, invalid time).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Declared total does not match the item prices.
    #[error("total must equal the sum of item prices: total={total} items={items_total}")]
    TotalMismatch { total: String, items_total: String },
}

impl ValidationError {
    /// Field name the error is reported under.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
            ValidationError::TotalMismatch { .. } => "total",
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// All validation failures of one input, keyed by field name.
///
/// ## Example
/// ```rust
/// use points_core::{FieldErrors, ValidationError};
///
/// let mut errors = FieldErrors::new();
/// errors.push(ValidationError::Required { field: "retailer".into() });
///
/// assert!(!errors.is_empty());
/// assert_eq!(errors.messages("retailer"), vec!["retailer is required"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<ValidationError>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation under its field.
    pub fn push(&mut self, error: ValidationError) {
        self.fields
            .entry(error.field().to_string())
            .or_default()
            .push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Human-readable reasons recorded for `field`.
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .map(|errors| errors.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Flattens into the `field → reasons` map returned to clients.
    pub fn to_details(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(field, errors)| {
                (
                    field.clone(),
                    errors.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in self.fields.values().flatten() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Unit Tests
// =============================================================================
