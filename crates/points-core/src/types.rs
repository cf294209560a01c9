//! # Domain Types
//!
//! Receipt and item types, in both their raw inbound shape and their
//! validated, immutable shape.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  JSON body ──► ReceiptInput ──► validate_receipt() ──► ValidReceipt    │
//! │                 (strings, f64)                          (dates, cents)  │
//! │                                                              │          │
//! │                                          fresh UUIDs assigned│          │
//! │                                                              ▼          │
//! │                                     Receipt { id, items[..] }           │
//! │                                     stored once, never mutated          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Wire format of a purchase date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of a purchase time (24-hour clock).
pub const TIME_FORMAT: &str = "%H:%M";

// =============================================================================
// Inbound
// =============================================================================

/// A receipt exactly as submitted by a client.
///
/// Missing fields fall back to empty values so that validation, not the
/// JSON decoder, reports them. Unknown fields are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ReceiptInput {
    pub retailer: String,
    pub purchase_date: String,
    pub purchase_time: String,
    pub total: f64,
    /// `None` when the client sent `null` or omitted the field.
    pub items: Option<Vec<ItemInput>>,
}

/// A purchased item as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemInput {
    pub short_description: String,
    pub price: f64,
}

// =============================================================================
// Validated
// =============================================================================

/// A receipt that passed validation but has not been assigned ids yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReceipt {
    pub retailer: String,
    pub purchase_date: NaiveDate,
    pub purchase_time: NaiveTime,
    pub total: Money,
    pub items: Vec<ValidItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidItem {
    pub short_description: String,
    pub price: Money,
}

impl ValidReceipt {
    /// Assigns ids to the receipt and every item, in input order.
    ///
    /// `next_id` is called once for the receipt and then once per item.
    pub fn into_receipt(self, mut next_id: impl FnMut() -> String) -> Receipt {
        let id = next_id();
        let items = self
            .items
            .into_iter()
            .map(|item| Item {
                id: next_id(),
                short_description: item.short_description,
                price: item.price,
            })
            .collect();

        Receipt {
            id,
            retailer: self.retailer,
            purchase_date: self.purchase_date,
            purchase_time: self.purchase_time,
            total: self.total,
            items,
        }
    }
}

// =============================================================================
// Stored
// =============================================================================

/// A stored receipt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub retailer: String,
    pub purchase_date: NaiveDate,
    #[serde(with = "hour_minute")]
    pub purchase_time: NaiveTime,
    pub total: Money,
    pub items: Vec<Item>,
}

/// A line on a receipt, owned by its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub short_description: String,
    pub price: Money,
}

/// `HH:MM` serde for purchase times.
pub mod hour_minute {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(D::Error::custom)
    }
}
