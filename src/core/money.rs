//! Fixed-Point Currency
//!
//! Session balances are kept as integer minor units so that settlement
//! arithmetic is exact and reproducible. Bets and payouts are whole
//! bet-currency units and convert losslessly into `Money`.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Money(i64) = value × 100                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1000.00  ->  Money(100_000)                                │
//! │     0.05  ->  Money(5)                                      │
//! │  Precision: 0.01 currency units                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minor units per whole currency unit.
pub const MONEY_SCALE: i64 = 100;

/// Default balance for new and reset sessions: 1000.00
pub const DEFAULT_BALANCE: Money = Money(1000 * MONEY_SCALE);

/// Fixed-point currency value in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// Create from raw minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create from whole bet-currency units.
    ///
    /// Saturates at `i64::MAX` minor units.
    pub fn from_units(units: u64) -> Self {
        let minor = i64::try_from(units)
            .ok()
            .and_then(|u| u.checked_mul(MONEY_SCALE))
            .unwrap_or(i64::MAX);
        Self(minor)
    }

    /// Raw minor units.
    #[inline]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Whole-unit part (truncated toward zero).
    #[inline]
    pub const fn whole_units(self) -> i64 {
        self.0 / MONEY_SCALE
    }

    /// Is this value below zero?
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Checked addition.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Convert to float for display/reporting only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MONEY_SCALE as f64
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = MONEY_SCALE as u64;
        write!(f, "{}{}.{:02}", sign, abs / scale, abs % scale)
    }
}

/// Error parsing a decimal money string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid money value: {0:?}")]
pub struct ParseMoneyError(pub String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parse `"1000"`, `"1000.5"` or `"1000.50"`. At most two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || frac.len() > 2 || !all_digits(whole) || !all_digits(frac) {
            return Err(err());
        }

        let whole: i64 = whole.parse().map_err(|_| err())?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse().map_err(|_| err())?,
        };

        let minor = whole
            .checked_mul(MONEY_SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(err)?;
        Ok(Money(if negative { -minor } else { minor }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
