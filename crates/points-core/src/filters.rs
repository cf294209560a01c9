//! # Listing Filters
//!
//! Validated page/limit/sort parameters and the pagination metadata that
//! comes back with a page of receipts.
//!
//! ## Sort Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw value        column           direction                           │
//! │  ───────────────  ───────────────  ─────────                            │
//! │  id               id               ASC                                  │
//! │  -total           total            DESC                                 │
//! │  purchase_date    purchase_date    ASC                                  │
//! │  ...                                                                    │
//! │  anything else    ── rejected by Filters::new, never reaches SQL ──     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, ValidationError};
use crate::types::Receipt;

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_LIMIT: i64 = 100;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const DEFAULT_SORT: &str = "id";

// =============================================================================
// Sort
// =============================================================================

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Retailer,
    PurchaseDate,
    PurchaseTime,
    Total,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Id,
        SortColumn::Retailer,
        SortColumn::PurchaseDate,
        SortColumn::PurchaseTime,
        SortColumn::Total,
    ];

    /// Column name in the `receipt` table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Retailer => "retailer",
            SortColumn::PurchaseDate => "purchase_date",
            SortColumn::PurchaseTime => "purchase_time",
            SortColumn::Total => "total",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// An allow-listed sort key; a leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortKey {
    /// Parses a raw sort value, returning `None` for anything off the allow-list.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, direction) = match raw.strip_prefix('-') {
            Some(name) => (name, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };
        SortColumn::parse(name).map(|column| SortKey { column, direction })
    }

    /// Every accepted raw value, ascending keys first.
    pub fn allowed() -> Vec<String> {
        let ascending = SortColumn::ALL.iter().map(|c| c.as_str().to_string());
        let descending = SortColumn::ALL.iter().map(|c| format!("-{}", c.as_str()));
        ascending.chain(descending).collect()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Desc {
            f.write_str("-")?;
        }
        f.write_str(self.column.as_str())
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Validated listing parameters.
///
/// Only [`Filters::new`] builds one, so holding a `Filters` means page,
/// limit and sort are all in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    page: i64,
    limit: i64,
    sort: SortKey,
}

impl Filters {
    /// Validates raw listing parameters, collecting every violation.
    ///
    /// ## Example
    /// ```rust
    /// use points_core::Filters;
    ///
    /// let filters = Filters::new(2, 10, "-total").unwrap();
    /// assert_eq!(filters.offset(), 10);
    /// assert_eq!(filters.sort().to_string(), "-total");
    ///
    /// assert!(Filters::new(0, 10, "total").is_err());
    /// assert!(Filters::new(1, 10, "total; DROP TABLE receipt").is_err());
    /// ```
    pub fn new(page: i64, limit: i64, sort: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        if page <= 0 {
            errors.push(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        } else if page > MAX_PAGE {
            errors.push(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: MAX_PAGE,
            });
        }

        if limit <= 0 {
            errors.push(ValidationError::MustBePositive {
                field: "limit".to_string(),
            });
        } else if limit > MAX_LIMIT {
            errors.push(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: MAX_LIMIT,
            });
        }

        let sort_key = SortKey::parse(sort);
        if sort_key.is_none() {
            errors.push(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortKey::allowed(),
            });
        }

        match sort_key {
            Some(sort) if errors.is_empty() => Ok(Filters { page, limit, sort }),
            _ => Err(errors),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Rows to skip: `(page - 1) × limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortKey {
                column: SortColumn::Id,
                direction: SortDirection::Asc,
            },
        }
    }
}

/// Raw listing parameters, e.g. from a query string. Absent values take
/// the defaults (page 1, limit 20, sort `id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

impl FilterParams {
    pub fn validate(&self) -> Result<Filters, FieldErrors> {
        Filters::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
            self.sort.as_deref().unwrap_or(DEFAULT_SORT),
        )
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Page bookkeeping returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub page: i64,
    pub limit: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total: i64,
}

impl Metadata {
    /// Builds metadata for `total` matching rows, or `None` when there are none.
    ///
    /// ## Example
    /// ```rust
    /// use points_core::Metadata;
    ///
    /// let meta = Metadata::calculate(45, 2, 20).unwrap();
    /// assert_eq!(meta.last_page, 3);
    /// assert!(Metadata::calculate(0, 1, 20).is_none());
    /// ```
    pub fn calculate(total: i64, page: i64, limit: i64) -> Option<Metadata> {
        if total <= 0 || limit <= 0 {
            return None;
        }

        Some(Metadata {
            page,
            limit,
            first_page: 1,
            last_page: (total + limit - 1) / limit,
            total,
        })
    }
}

/// One page of receipts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginatedReceipts {
    pub receipts: Vec<Receipt>,
    pub metadata: Option<Metadata>,
}

impl PaginatedReceipts {
    pub fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        let key = SortKey::parse("-purchase_date").unwrap();
        assert_eq!(key.column, SortColumn::PurchaseDate);
        assert_eq!(key.direction, SortDirection::Desc);

        let key = SortKey::parse("retailer").unwrap();
        assert_eq!(key.direction, SortDirection::Asc);

        assert!(SortKey::parse("items").is_none());
        assert!(SortKey::parse("--total").is_none());
        assert!(SortKey::parse("").is_none());
    }

    #[test]
    fn test_sort_key_display_round_trips() {
        for raw in SortKey::allowed() {
            assert_eq!(SortKey::parse(&raw).unwrap().to_string(), raw);
        }
        assert_eq!(SortKey::allowed().len(), 10);
    }

    #[test]
    fn test_filters_bounds() {
        assert!(Filters::new(1, 1, "id").is_ok());
        assert!(Filters::new(MAX_PAGE, MAX_LIMIT, "id").is_ok());

        let errors = Filters::new(MAX_PAGE + 1, MAX_LIMIT + 1, "id").unwrap_err();
        assert!(errors.contains("page"));
        assert!(errors.contains("limit"));

        let errors = Filters::new(0, -5, "bogus").unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.messages("page"), vec!["page must be greater than zero"]);
    }

    #[test]
    fn test_filters_offset() {
        assert_eq!(Filters::new(1, 20, "id").unwrap().offset(), 0);
        assert_eq!(Filters::new(3, 20, "id").unwrap().offset(), 40);
        assert_eq!(Filters::default().offset(), 0);
    }

    #[test]
    fn test_filter_params_defaults() {
        let filters = FilterParams::default().validate().unwrap();
        assert_eq!(filters, Filters::default());

        let params = FilterParams {
            page: Some(3),
            limit: None,
            sort: Some("-retailer".to_string()),
        };
        let filters = params.validate().unwrap();
        assert_eq!(filters.page(), 3);
        assert_eq!(filters.limit(), DEFAULT_LIMIT);
        assert_eq!(filters.sort().to_string(), "-retailer");

        let params = FilterParams {
            sort: Some("points".to_string()),
            ..FilterParams::default()
        };
        assert!(params.validate().unwrap_err().contains("sort"));
    }

    #[test]
    fn test_metadata_last_page() {
        assert_eq!(Metadata::calculate(1, 1, 20).unwrap().last_page, 1);
        assert_eq!(Metadata::calculate(20, 1, 20).unwrap().last_page, 1);
        assert_eq!(Metadata::calculate(21, 1, 20).unwrap().last_page, 2);
        assert_eq!(Metadata::calculate(100, 1, 1).unwrap().last_page, 100);
        assert!(Metadata::calculate(0, 1, 20).is_none());
    }

    #[test]
    fn test_metadata_json() {
        let json = serde_json::to_value(Metadata::calculate(45, 2, 20)).unwrap();
        assert_eq!(json["firstPage"], 1);
        assert_eq!(json["lastPage"], 3);

        let empty = serde_json::to_value(PaginatedReceipts::empty()).unwrap();
        assert!(empty["metadata"].is_null());
    }
}
