use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A decimal amount held as integer cents, so €50.00 = 5000.
///
/// Launch amounts are always positive; balances built from them may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `None` when the total no longer fits in cents.
    pub const fn checked_add(self, rhs: Amount) -> Option<Amount> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Amount(cents)),
            None => None,
        }
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

/// Formats as "12.34" or "-0.05".
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Parses "50", "50.0", "50.00", ".5" and their negatives.
/// More than two fractional digits is rejected rather than truncated.
impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (units_str, fraction_str) = match digits.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (digits, ""),
        };

        if units_str.is_empty() && fraction_str.is_empty() {
            return Err(ParseAmountError::InvalidFormat);
        }
        if !units_str.chars().all(|c| c.is_ascii_digit())
            || !fraction_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseAmountError::InvalidFormat);
        }
        if fraction_str.len() > 2 {
            return Err(ParseAmountError::TooPrecise);
        }

        let units: i64 = if units_str.is_empty() {
            0
        } else {
            units_str
                .parse()
                .map_err(|_| ParseAmountError::InvalidFormat)?
        };
        let fraction: i64 = match fraction_str.len() {
            0 => 0,
            // "5" after the point is fifty cents
            1 => fraction_str.parse::<i64>().map_err(|_| ParseAmountError::InvalidFormat)? * 10,
            _ => fraction_str
                .parse()
                .map_err(|_| ParseAmountError::InvalidFormat)?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or(ParseAmountError::Overflow)?;
        Ok(Amount(if negative { -cents } else { cents }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    TooPrecise,
    Overflow,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::TooPrecise => write!(f, "amount has more than two decimal places"),
            ParseAmountError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
