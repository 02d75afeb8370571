//! Value objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Amount in Vietnamese đồng. VND has no minor unit, so this is the smallest
/// currency unit as well as the display unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vnd(u64);

impl Vnd {
    pub const fn new(amount: u64) -> Self { Self(amount) }
    pub const fn zero() -> Self { Self(0) }

    /// Prices come out of bigint columns; anything negative is treated as zero.
    pub fn from_db(amount: i64) -> Self { Self(u64::try_from(amount).unwrap_or(0)) }

    pub fn amount(&self) -> u64 { self.0 }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
    pub fn add(&self, other: Vnd) -> Vnd { Vnd(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: Quantity) -> Vnd { Vnd(self.0.saturating_mul(u64::from(qty.value()))) }
    pub fn formatted(&self) -> String { format_vnd(self.0) }

    /// Clamped to `i64::MAX` for storage in bigint columns.
    pub fn to_db(&self) -> i64 { i64::try_from(self.0).unwrap_or(i64::MAX) }
}

impl fmt::Display for Vnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&format_vnd(self.0)) }
}

/// Formats an amount the way vi-VN renders VND: dot-grouped thousands, no
/// decimals, a no-break space and the trailing `₫`.
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out.push('\u{a0}');
    out.push('₫');
    out
}

/// Line item quantity, always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: i64) -> Result<Self, InvalidQuantity> {
        match u32::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(InvalidQuantity(value)),
        }
    }
    pub fn one() -> Self { Self(1) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn saturating_add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
}

impl TryFrom<i64> for Quantity {
    type Error = InvalidQuantity;
    fn try_from(value: i64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> u32 { q.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quantity must be at least 1, got {0}")]
pub struct InvalidQuantity(pub i64);
