//! Integer money in cents.
//!
//! All prices in Tamarind are integer cents (the backend stores
//! `price_cents` columns). Keeping money integral avoids floating-point
//! drift in cart totals; formatting to dollars happens only at the edge.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// An amount of money in cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the underlying cent count.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Apply a percentage discount, rounding half up.
    ///
    /// `percent` is clamped to 100. A 33% discount on 999 cents yields
    /// `round(999 * 67 / 100)` = 669 cents.
    #[must_use]
    pub const fn discounted(self, percent: u8) -> Self {
        let percent = if percent > 100 { 100 } else { percent as i64 };
        Self((self.0 * (100 - percent) + 50) / 100)
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Cents {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * i64::from(rhs))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Cents {
    /// Format as dollars, e.g. `$4.50`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}
