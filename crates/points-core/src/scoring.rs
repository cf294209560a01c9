//! # Scoring Engine
//!
//! Computes the loyalty points a receipt is worth.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  #  Rule                                                     Points     │
//! │  ─  ───────────────────────────────────────────────────────  ─────────  │
//! │  1  each letter or digit in the retailer name                +1 each    │
//! │  2  total is a whole dollar amount                           +50        │
//! │  3  total is a multiple of 0.25                              +25        │
//! │  4  every two items                                          +5         │
//! │  5  trimmed description length is a multiple of 3            ⌈price×0.2⌉│
//! │  6  day of the purchase date is odd                          +6         │
//! │  7  purchase time after 14:00 and before 16:00               +10        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule works on integer cents, so `price × 0.2` becomes
//! `⌈cents / 500⌉` and no rounding error can leak into a score.
//!
//! ## Example
//! ```rust
//! use points_core::scoring::score;
//! # use points_core::{Item, Money, Receipt};
//! # use chrono::{NaiveDate, NaiveTime};
//! # let receipt = Receipt {
//! #     id: "r".into(),
//! #     retailer: "Target".into(),
//! #     purchase_date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
//! #     purchase_time: NaiveTime::from_hms_opt(13, 1, 0).unwrap(),
//! #     total: Money::from_cents(649),
//! #     items: vec![Item { id: "i".into(), short_description: "Mountain Dew 12PK".into(), price: Money::from_cents(649) }],
//! # };
//! assert_eq!(score(&receipt), 6);
//! ```

use chrono::{Datelike, NaiveTime, Timelike};
use serde::Serialize;

use crate::money::Money;
use crate::types::{Item, Receipt};

const ROUND_DOLLAR_POINTS: i64 = 50;
const QUARTER_MULTIPLE_POINTS: i64 = 25;
const POINTS_PER_ITEM_PAIR: i64 = 5;
const ODD_DAY_POINTS: i64 = 6;
const AFTERNOON_POINTS: i64 = 10;

const QUARTER: Money = Money::from_cents(25);

/// Per-rule contribution to a receipt's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub retailer_name: i64,
    pub round_dollar: i64,
    pub quarter_multiple: i64,
    pub item_pairs: i64,
    pub item_descriptions: i64,
    pub odd_day: i64,
    pub afternoon: i64,
}

impl Breakdown {
    /// Sum of every rule, saturating at `i64::MAX`.
    pub fn total(&self) -> i64 {
        [
            self.retailer_name,
            self.round_dollar,
            self.quarter_multiple,
            self.item_pairs,
            self.item_descriptions,
            self.odd_day,
            self.afternoon,
        ]
        .into_iter()
        .fold(0i64, i64::saturating_add)
    }
}

/// Total points for a receipt. Pure: the same receipt always scores the same.
pub fn score(receipt: &Receipt) -> i64 {
    breakdown(receipt).total()
}

/// Scores each rule separately.
pub fn breakdown(receipt: &Receipt) -> Breakdown {
    Breakdown {
        retailer_name: retailer_name_points(&receipt.retailer),
        round_dollar: round_dollar_points(receipt.total),
        quarter_multiple: quarter_multiple_points(receipt.total),
        item_pairs: item_pair_points(receipt.items.len()),
        item_descriptions: receipt
            .items
            .iter()
            .map(item_description_points)
            .fold(0i64, i64::saturating_add),
        odd_day: odd_day_points(receipt.purchase_date.day()),
        afternoon: afternoon_points(receipt.purchase_time),
    }
}

// =============================================================================
// Rules
// =============================================================================

/// One point per Unicode letter or digit.
pub fn retailer_name_points(retailer: &str) -> i64 {
    retailer.chars().filter(|c| c.is_alphanumeric()).count() as i64
}

pub fn round_dollar_points(total: Money) -> i64 {
    if total.is_whole_dollar() {
        ROUND_DOLLAR_POINTS
    } else {
        0
    }
}

pub fn quarter_multiple_points(total: Money) -> i64 {
    if total.is_multiple_of(QUARTER) {
        QUARTER_MULTIPLE_POINTS
    } else {
        0
    }
}

pub fn item_pair_points(item_count: usize) -> i64 {
    i64::try_from(item_count / 2)
        .unwrap_or(i64::MAX)
        .saturating_mul(POINTS_PER_ITEM_PAIR)
}

/// `⌈price × 0.2⌉` when the trimmed description length is a non-zero
/// multiple of three.
pub fn item_description_points(item: &Item) -> i64 {
    let length = item.short_description.trim().chars().count();
    if length == 0 || length % 3 != 0 {
        return 0;
    }

    let cents = item.price.cents();
    if cents <= 0 {
        return 0;
    }
    // ⌈cents × 0.2 / 100⌉ == ⌈cents / 500⌉
    cents / 500 + i64::from(cents % 500 != 0)
}

pub fn odd_day_points(day: u32) -> i64 {
    if day % 2 == 1 {
        ODD_DAY_POINTS
    } else {
        0
    }
}

/// Strictly after 14:00 and strictly before 16:00.
pub fn afternoon_points(time: NaiveTime) -> i64 {
    let after_two = time.hour() == 14 && time.minute() > 0;
    if after_two || time.hour() == 15 {
        AFTERNOON_POINTS
    } else {
        0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
