//! Non-negative monetary amounts.
//!
//! No currency is attached: every amount in the domain is in the same unit and
//! no conversion or tax logic exists.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative decimal amount.
///
/// Serialized as a decimal string to keep full precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Create an amount; fails with `InvalidEntity` when `amount < 0`.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::invalid_entity("amount cannot be negative"));
        }
        // Normalizes a "-0" coming out of arithmetic.
        Ok(Self(amount.abs()))
    }

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub const fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity, re-validating the result.
    ///
    /// Fails with `InvalidEntity` for a negative quantity or when the product
    /// does not fit the decimal range.
    pub fn times(&self, quantity: i64) -> DomainResult<Self> {
        let product = self
            .0
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| DomainError::invalid_entity("amount out of range"))?;
        Self::new(product)
    }

    /// Add two amounts; fails with `InvalidEntity` when the sum does not fit
    /// the decimal range.
    pub fn checked_add(&self, other: Money) -> DomainResult<Self> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::invalid_entity("amount out of range"))?;
        Self::new(sum)
    }

    /// Exact sum of a sequence of amounts; zero for an empty sequence.
    pub fn try_sum(amounts: impl IntoIterator<Item = Money>) -> DomainResult<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }
}

impl ValueObject for Money {}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
