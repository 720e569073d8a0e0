//! # Money Module
//!
//! Provides the `Money` type for invoice lines, receipts and journal amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE COLLECTED FLAG PROBLEM                                             │
//! │                                                                         │
//! │  An invoice is collected when   total - receipts == 0                   │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    1300.01 - (1000.00 + 300.01) = 2.27e-13   ❌ never collected        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    130001 - (100000 + 30001) = 0              ✅ exact                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let taxable: Money = "1000".parse().unwrap();
//! let vat = Money::from_cents(21_000);
//!
//! assert_eq!((taxable + vat).to_string(), "$1210.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: current account entries for receipts are negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Storage**: every `*_cents` column holds this value untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let amount = Money::from_cents(130_001); // $1300.01
    /// assert_eq!(amount.cents(), 130_001);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole units portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Sum that reports overflow instead of wrapping or panicking.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Formats the amount as plain decimal text (`1300.01`), the way it is
    /// written in uploaded sheets.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Errors produced when reading an amount from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' has more than 2 decimal places")]
    TooManyDecimals(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Parses decimal text such as `1300.01`, `-5.5` or `1000`.
///
/// ## Rules
/// - optional leading sign
/// - at most two decimal places
/// - no thousands separators, no exponent
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(ParseMoneyError::NotANumber(text.to_string()));
        }
        if fraction.len() > 2 {
            return Err(ParseMoneyError::TooManyDecimals(text.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ParseMoneyError::OutOfRange(text.to_string()))?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse().unwrap_or(0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| ParseMoneyError::OutOfRange(text.to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation, used for receipt entries on current accounts.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(130_001)), "$1300.01");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_parse_decimal_text() {
        assert_eq!("1300.01".parse::<Money>().unwrap().cents(), 130_001);
        assert_eq!("1000".parse::<Money>().unwrap().cents(), 100_000);
        assert_eq!("-5.5".parse::<Money>().unwrap().cents(), -550);
        assert_eq!(" 0.07 ".parse::<Money>().unwrap().cents(), 7);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        assert_eq!("".parse::<Money>(), Err(ParseMoneyError::Empty));
        assert!(matches!(
            "12.345".parse::<Money>(),
            Err(ParseMoneyError::TooManyDecimals(_))
        ));
        assert!(matches!(
            "1,300.00".parse::<Money>(),
            Err(ParseMoneyError::NotANumber(_))
        ));
        assert!(matches!("abc".parse::<Money>(), Err(ParseMoneyError::NotANumber(_))));
        assert!(matches!(".".parse::<Money>(), Err(ParseMoneyError::NotANumber(_))));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_checked_add_overflow() {
        let a = Money::from_cents(1000);
        assert_eq!(a.checked_add(Money::from_cents(1)), Some(Money::from_cents(1001)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    /// Receipts of 1000.00 and 300.01 settle an invoice of 1300.01 exactly.
    #[test]
    fn test_exact_settlement() {
        let invoice: Money = "1300.01".parse().unwrap();
        let receipts: Money = ["1000.00", "300.01"]
            .iter()
            .map(|s| s.parse::<Money>().unwrap())
            .sum();
        assert!((invoice - receipts).is_zero());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(130_001).to_decimal_string(), "1300.01");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
    }
}
