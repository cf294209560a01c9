//! # Validation Module
//!
//! Turns a raw [`ReceiptInput`] into a [`ValidReceipt`], or reports every
//! broken rule at once.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field                          Rule                                    │
//! │  ─────────────────────────────  ──────────────────────────────────────  │
//! │  retailer                       non-blank, at most 50 characters        │
//! │  purchaseDate                   YYYY-MM-DD, a real calendar date        │
//! │  purchaseTime                   HH:MM, 24-hour clock                    │
//! │  total                          0.01 ..= 999,999,999.99 after rounding  │
//! │  items                          1 ..= 1000 entries                      │
//! │  items[i].shortDescription      non-blank, at most 100 characters       │
//! │  items[i].price                 0.01 ..= 999,999,999.99 after rounding  │
//! │  total (cross-field)            == sum(items[].price) in cents          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use points_core::{validate_receipt, ItemInput, ReceiptInput};
//!
//! let input = ReceiptInput {
//!     retailer: "Target".into(),
//!     purchase_date: "2022-01-01".into(),
//!     purchase_time: "13:01".into(),
//!     total: 6.49,
//!     items: Some(vec![ItemInput { short_description: "Mountain Dew 12PK".into(), price: 6.49 }]),
//! };
//!
//! let receipt = validate_receipt(&input).unwrap();
//! assert_eq!(receipt.total.cents(), 649);
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::error::{FieldErrors, ValidationError};
use crate::money::Money;
use crate::types::{ItemInput, ReceiptInput, ValidItem, ValidReceipt, DATE_FORMAT, TIME_FORMAT};

/// Longest accepted retailer name, in characters.
pub const MAX_RETAILER_LEN: usize = 50;

/// Longest accepted item description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Largest accepted total or item price (999,999,999.99).
pub const MAX_AMOUNT: Money = Money::from_cents(99_999_999_999);

/// Most items accepted on one receipt.
pub const MAX_ITEMS: usize = 1_000;

/// Result type for single-rule validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Receipt
// =============================================================================

/// Validates a submitted receipt.
///
/// All violations are collected; the error is returned only after every
/// field has been checked. Amounts are converted to cents first and every
/// amount rule runs on those cents, so the values checked are exactly the
/// values stored.
pub fn validate_receipt(input: &ReceiptInput) -> Result<ValidReceipt, FieldErrors> {
    let mut errors = FieldErrors::new();

    let retailer = validate_retailer(&input.retailer).map_err(|e| errors.push(e)).ok();
    let purchase_date = parse_purchase_date(&input.purchase_date)
        .map_err(|e| errors.push(e))
        .ok();
    let purchase_time = parse_purchase_time(&input.purchase_time)
        .map_err(|e| errors.push(e))
        .ok();
    let total = validate_amount("total", input.total).map_err(|e| errors.push(e)).ok();

    let items = match input.items.as_deref() {
        None | Some([]) => {
            errors.push(ValidationError::Required {
                field: "items".to_string(),
            });
            Vec::new()
        }
        Some(items) if items.len() > MAX_ITEMS => {
            errors.push(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_ITEMS as i64,
            });
            Vec::new()
        }
        Some(items) => {
            if let Err(e) = check_total_matches(input.total, items) {
                errors.push(e);
            }
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| validate_item(index, item, &mut errors))
                .collect()
        }
    };

    match (retailer, purchase_date, purchase_time, total) {
        (Some(retailer), Some(purchase_date), Some(purchase_time), Some(total)) => {
            errors.into_result(ValidReceipt {
                retailer,
                purchase_date,
                purchase_time,
                total,
                items,
            })
        }
        _ => Err(errors),
    }
}

fn validate_item(index: usize, item: &ItemInput, errors: &mut FieldErrors) -> Option<ValidItem> {
    let description_field = format!("items[{index}].shortDescription");
    let mut ok = true;

    if item.short_description.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: description_field,
        });
        ok = false;
    } else if item.short_description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(ValidationError::TooLong {
            field: description_field,
            max: MAX_DESCRIPTION_LEN,
        });
        ok = false;
    }

    let price = validate_amount(&format!("items[{index}].price"), item.price)
        .map_err(|e| errors.push(e))
        .ok();

    match price {
        Some(price) if ok => Some(ValidItem {
            short_description: item.short_description.clone(),
            price,
        }),
        _ => None,
    }
}

/// Converts an amount to cents and checks it is in `0.01..=MAX_AMOUNT`.
///
/// ## Example
/// ```rust
/// use points_core::validation::validate_amount;
///
/// assert_eq!(validate_amount("total", 35.35).unwrap().cents(), 3535);
/// assert!(validate_amount("total", 0.004).is_err()); // rounds to 0.00
/// assert!(validate_amount("total", 1e17).is_err());
/// ```
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<Money> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    // Out-of-range floats saturate, which still lands outside the bounds
    let money = Money::from_decimal(amount);
    if !money.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if money > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT,
        });
    }

    Ok(money)
}

/// Compares the declared total with the item prices, both in cents.
///
/// Non-finite amounts are reported by [`validate_amount`] and skipped here.
fn check_total_matches(total: f64, items: &[ItemInput]) -> ValidationResult<()> {
    if !total.is_finite() || items.iter().any(|item| !item.price.is_finite()) {
        return Ok(());
    }

    let total = Money::from_decimal(total);
    let items_total = items.iter().fold(0i64, |sum, item| {
        sum.saturating_add(Money::from_decimal(item.price).cents())
    });
    let items_total = Money::from_cents(items_total);

    if total == items_total {
        Ok(())
    } else {
        Err(ValidationError::TotalMismatch {
            total: total.to_string(),
            items_total: items_total.to_string(),
        })
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a retailer name and returns it unchanged.
///
/// ## Example
/// ```rust
/// use points_core::validation::validate_retailer;
///
/// assert!(validate_retailer("M&M Corner Market").is_ok());
/// assert!(validate_retailer("").is_err());
/// assert!(validate_retailer(&"A".repeat(51)).is_err());
/// ```
pub fn validate_retailer(retailer: &str) -> ValidationResult<String> {
    if retailer.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "retailer".to_string(),
        });
    }

    if retailer.chars().count() > MAX_RETAILER_LEN {
        return Err(ValidationError::TooLong {
            field: "retailer".to_string(),
            max: MAX_RETAILER_LEN,
        });
    }

    Ok(retailer.to_string())
}

/// Parses a `YYYY-MM-DD` purchase date.
pub fn parse_purchase_date(raw: &str) -> ValidationResult<NaiveDate> {
    let invalid = || ValidationError::InvalidFormat {
        field: "purchaseDate".to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    };

    // chrono accepts single-digit months and days; the wire format does not
    if raw.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

/// Parses an `HH:MM` purchase time.
pub fn parse_purchase_time(raw: &str) -> ValidationResult<NaiveTime> {
    let invalid = || ValidationError::InvalidFormat {
        field: "purchaseTime".to_string(),
        reason: "expected HH:MM".to_string(),
    };

    if raw.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| invalid())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a receipt id.
///
/// ## Example
/// ```rust
/// use points_core::validation::validate_receipt_id;
///
/// assert!(validate_receipt_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_receipt_id("not-a-uuid").is_err());
/// ```
pub fn validate_receipt_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, price: f64) -> ItemInput {
        ItemInput {
            short_description: description.to_string(),
            price,
        }
    }

    fn gatorade_receipt() -> ReceiptInput {
        ReceiptInput {
            retailer: "M&M Corner Market".to_string(),
            purchase_date: "2022-03-20".to_string(),
            purchase_time: "14:33".to_string(),
            total: 9.00,
            items: Some(vec![
                item("Gatorade", 2.25),
                item("Gatorade", 2.25),
                item("Gatorade", 2.25),
                item("Gatorade", 2.25),
            ]),
        }
    }

    #[test]
    fn test_valid_receipt() {
        let receipt = validate_receipt(&gatorade_receipt()).unwrap();

        assert_eq!(receipt.retailer, "M&M Corner Market");
        assert_eq!(receipt.purchase_date, NaiveDate::from_ymd_opt(2022, 3, 20).unwrap());
        assert_eq!(receipt.purchase_time, NaiveTime::from_hms_opt(14, 33, 0).unwrap());
        assert_eq!(receipt.total, Money::from_cents(900));
        assert_eq!(receipt.items.len(), 4);
    }

    #[test]
    fn test_total_mismatch() {
        let mut input = gatorade_receipt();
        if let Some(items) = input.items.as_mut() {
            items[3].price = 2.26;
        }

        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.messages("total"),
            vec!["total must equal the sum of item prices: total=9.00 items=9.01"]
        );
    }

    #[test]
    fn test_collects_every_violation() {
        let input = ReceiptInput {
            retailer: String::new(),
            purchase_date: "2022/01/01".to_string(),
            purchase_time: "1:01pm".to_string(),
            total: 0.0,
            items: Some(vec![item("", 0.0), item(&"x".repeat(101), 1.0)]),
        };

        let errors = validate_receipt(&input).unwrap_err();
        for field in [
            "retailer",
            "purchaseDate",
            "purchaseTime",
            "total",
            "items[0].shortDescription",
            "items[0].price",
            "items[1].shortDescription",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        // 0.00 != 1.00 is reported as well as total <= 0
        assert_eq!(errors.messages("total").len(), 2);
    }

    #[test]
    fn test_items_null_and_empty() {
        let mut input = gatorade_receipt();
        input.items = None;
        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.messages("items"), vec!["items is required"]);

        input.items = Some(Vec::new());
        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.messages("items"), vec!["items is required"]);
    }

    #[test]
    fn test_amounts_checked_after_rounding() {
        // Half-cent prices round up; the declared total does not cover them
        let mut input = gatorade_receipt();
        input.total = 0.01;
        input.items = Some(vec![item("Gum", 0.005), item("Mint", 0.005)]);
        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(
            errors.messages("total"),
            vec!["total must equal the sum of item prices: total=0.01 items=0.02"]
        );

        // Rounds to zero cents
        input.total = 0.004;
        input.items = Some(vec![item("Gum", 0.004)]);
        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages("total"), vec!["total must be greater than zero"]);
        assert!(errors.contains("items[0].price"));

        // Sub-cent noise that rounds onto the total is accepted
        input.total = 1.004;
        input.items = Some(vec![item("Gum", 0.501), item("Mint", 0.499)]);
        let receipt = validate_receipt(&input).unwrap();
        assert_eq!(receipt.total, Money::from_cents(100));
    }

    #[test]
    fn test_amount_bounds() {
        assert_eq!(validate_amount("total", 999_999_999.99), Ok(MAX_AMOUNT));
        assert!(matches!(
            validate_amount("total", 1_000_000_000.0),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_amount("total", f64::NAN),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_amount("total", f64::INFINITY),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_amount("total", -1e30),
            Err(ValidationError::MustBePositive { .. })
        ));

        let mut input = gatorade_receipt();
        input.total = 1e17;
        input.items = Some(vec![item("Yacht", 1e17)]);
        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.messages("total"), vec!["total must be at most 999999999.99"]);
        assert_eq!(
            errors.messages("items[0].price"),
            vec!["items[0].price must be at most 999999999.99"]
        );
    }

    #[test]
    fn test_item_count_capped() {
        let mut input = gatorade_receipt();
        input.total = 10.01;
        input.items = Some(vec![item("Gum", 0.01); MAX_ITEMS + 1]);

        let errors = validate_receipt(&input).unwrap_err();
        assert_eq!(errors.messages("items"), vec!["items must be between 1 and 1000"]);

        input.total = 10.00;
        input.items = Some(vec![item("Gum", 0.01); MAX_ITEMS]);
        assert_eq!(validate_receipt(&input).unwrap().items.len(), MAX_ITEMS);
    }

    #[test]
    fn test_validate_retailer_counts_characters() {
        assert!(validate_retailer(&"é".repeat(50)).is_ok());
        assert!(validate_retailer(&"é".repeat(51)).is_err());
        assert!(validate_retailer("   ").is_err());
    }

    #[test]
    fn test_parse_purchase_date() {
        assert!(parse_purchase_date("2022-01-01").is_ok());
        assert!(parse_purchase_date("2022-1-1").is_err());
        assert!(parse_purchase_date("2022-02-30").is_err());
        assert!(parse_purchase_date("01-01-2022").is_err());
        assert!(parse_purchase_date("").is_err());
    }

    #[test]
    fn test_parse_purchase_time() {
        assert!(parse_purchase_time("00:00").is_ok());
        assert!(parse_purchase_time("23:59").is_ok());
        assert!(parse_purchase_time("24:00").is_err());
        assert!(parse_purchase_time("9:05").is_err());
        assert!(parse_purchase_time("13:01:00").is_err());
    }

    #[test]
    fn test_validate_receipt_id() {
        assert!(validate_receipt_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_receipt_id("").is_err());
        assert!(validate_receipt_id("123").is_err());
    }
}
