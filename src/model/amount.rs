//! Amount type for handling monetary values reported by the expense service.
//!
//! The service reports money as decimal strings, e.g. `"100.0"` or `"12.34"`. This module provides
//! the `Amount` type which wraps `Decimal`, so that summing many expenses does not drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Represents an amount of money in whatever currency the expense was recorded in.
///
/// # Examples
///
/// ```
/// # use splitwise_export::model::Amount;
/// # use std::str::FromStr;
/// let cost = Amount::from_str("100.00").unwrap();
/// assert_eq!(cost.half().to_string(), "50");
/// ```
///
/// Formatting is normalized, trailing zeros are not significant:
/// ```
/// # use splitwise_export::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("12.50").unwrap();
/// let b = Amount::from_str("12.5").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "12.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Half of this amount. Used to compute one person's share of an even two-way split.
    pub fn half(&self) -> Amount {
        Amount(self.0 / Decimal::TWO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount)
            .map_err(AmountError)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.normalize(), f)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts either a decimal string, which is what the service sends, or a JSON number.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(serde_json::Number),
        }
        let s = match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        };
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
