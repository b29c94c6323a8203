//! Exact dollar amounts stored as integer cents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-fractional count of cents.
///
/// Contribution amounts are summed and compared in cents so that totals from
/// the aggregation path match a hand sum over listed rows exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must be non-negative")]
    Negative,
    #[error("amount has more than two decimal places")]
    TooPrecise,
    #[error("amount is not a number")]
    NotANumber,
    #[error("amount is too large")]
    Overflow,
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn to_dollars_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses `1234`, `1234.5` or `1234.56`, with an optional leading `$`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('$').unwrap_or(s);
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        if s.starts_with('-') {
            return Err(ParseMoneyError::Negative);
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(ParseMoneyError::NotANumber);
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseMoneyError::NotANumber);
        }
        if frac.len() > 2 {
            return Err(ParseMoneyError::TooPrecise);
        }
        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseMoneyError::Overflow)?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| ParseMoneyError::NotANumber)? * 10,
            _ => frac.parse().map_err(|_| ParseMoneyError::NotANumber)?,
        };
        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Money)
            .ok_or(ParseMoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(dollars) => dollars
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| serde::de::Error::custom(ParseMoneyError::Overflow)),
            Raw::Float(dollars) => Ok(Money((dollars * 100.0).round() as i64)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
