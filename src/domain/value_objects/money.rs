//! Money value object.
//!
//! Provides a strongly-typed representation of monetary amounts backed by
//! [`Decimal`] for exact arithmetic. The ledger is single-currency by
//! construction, so no currency axis is carried.
//!
//! # Design
//!
//! - **Precision**: `Decimal` avoids binary floating-point rounding
//! - **Checked arithmetic**: balance mutations go through `checked_add` /
//!   `checked_sub` so overflow and underflow surface as `None` instead of
//!   silently wrapping
//!
//! # Examples
//!
//! ```rust
//! use teller::domain::value_objects::Money;
//!
//! let balance = Money::new(10_000);
//! let price = Money::new(3_000);
//!
//! let remaining = balance.checked_sub(price);
//! assert_eq!(remaining, Some(Money::new(7_000)));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount.
///
/// Wraps a [`Decimal`] so that amounts cannot be confused with other
/// numeric quantities at API boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new `Money` value from anything convertible to `Decimal`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use teller::domain::value_objects::Money;
    ///
    /// let amount = Money::new(1_000);
    /// assert!(amount.is_positive());
    /// ```
    #[must_use]
    pub fn new(amount: impl Into<Decimal>) -> Self {
        Self(amount.into())
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns `true` if the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtracts `other` from `self`, returning `None` on overflow.
    ///
    /// Note that subtraction below zero is representable (`Decimal` is
    /// signed); callers guard against negative balances themselves.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
