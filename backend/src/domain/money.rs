//! Monetary amounts stored as integer cents.
//!
//! Invoice amounts are entered as decimals on forms, persisted as whole cents,
//! summed as cents, and only turned back into decimals or currency strings at
//! the output boundary. Keeping arithmetic on integers avoids compounding
//! floating-point error across many rows.

use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// Largest magnitude that survives an `f64` round trip without losing cents.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_991.0;

/// Errors raised while converting or aggregating amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The decimal input was NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
    /// The amount does not fit in whole cents.
    #[error("amount is out of range")]
    OutOfRange,
    /// Summing amounts overflowed.
    #[error("amount total overflowed")]
    Overflow,
}

/// Whole number of cents.
///
/// # Examples
/// ```
/// use dashboard::domain::Cents;
///
/// let cents = Cents::from_decimal(125.5).expect("finite amount");
/// assert_eq!(cents.as_i64(), 12_550);
/// assert_eq!(cents.to_string(), "$125.50");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw cent count.
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal currency amount to cents, rounding half away from zero.
    pub fn from_decimal(amount: f64) -> Result<Self, MoneyError> {
        if !amount.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let scaled = (amount * 100.0).round();
        if scaled.abs() > MAX_EXACT_CENTS {
            return Err(MoneyError::OutOfRange);
        }
        // Magnitude is bounded above, so the cast cannot truncate.
        Ok(Self(scaled as i64))
    }

    /// Raw cent count.
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Decimal currency amount, e.g. `12550` cents becomes `125.5`.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Sum an iterator of amounts, failing on overflow.
    pub fn try_sum(amounts: impl IntoIterator<Item = Self>) -> Result<Self, MoneyError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Plain decimal text with two fractional digits, e.g. `125.50`.
    ///
    /// Used for substring search over amounts.
    pub fn decimal_text(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }

    /// US-dollar currency text with thousands separators, e.g. `$1,234.56`.
    pub fn format_currency(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let dollars = group_thousands(magnitude / 100);
        format!("{sign}${dollars}.{:02}", magnitude % 100)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_currency())
    }
}

impl<'a> Sum<&'a Cents> for Result<Cents, MoneyError> {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        Cents::try_sum(iter.copied())
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
