use serde::{Deserialize, Deserializer, Serialize};

use servicedesk_core::{DomainError, DomainResult, Money};

/// A priced, quantified line of work on a service order.
///
/// Immutable once constructed. Deserialization runs the same checks as
/// [`ServiceItem::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceItem {
    description: String,
    unit_price: Money,
    quantity: i64,
    subtotal: Money,
}

/// Unvalidated wire shape of a [`ServiceItem`].
#[derive(Deserialize)]
struct RawServiceItem {
    description: String,
    unit_price: Money,
    quantity: i64,
}

impl ServiceItem {
    /// Fails with `InvalidEntity` when the description is blank, the quantity is
    /// not positive, or the subtotal would not fit the decimal range.
    pub fn new(
        description: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> DomainResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::invalid_entity("invalid description"));
        }
        if quantity <= 0 {
            return Err(DomainError::invalid_entity("quantity must be positive"));
        }
        let subtotal = unit_price.times(quantity)?;

        Ok(Self {
            description,
            unit_price,
            quantity,
            subtotal,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// `unit_price × quantity`, with no rounding beyond decimal precision.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }
}

impl<'de> Deserialize<'de> for ServiceItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawServiceItem::deserialize(deserializer)?;
        Self::new(raw.description, raw.unit_price, raw.quantity).map_err(serde::de::Error::custom)
    }
}
