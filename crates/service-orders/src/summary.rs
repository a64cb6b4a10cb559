//! Read-only views for reporting and presentation.
//!
//! Built from borrowed aggregates; nothing here can mutate an order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use servicedesk_core::{CustomerId, DomainError, Money, ServiceOrderId};

use crate::customer::Customer;
use crate::order::{ServiceOrder, ServiceOrderStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOrderSummary {
    pub order_id: ServiceOrderId,
    pub customer_id: CustomerId,
    pub status: ServiceOrderStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub item_count: usize,
    pub total: Money,
}

impl From<&ServiceOrder> for ServiceOrderSummary {
    fn from(order: &ServiceOrder) -> Self {
        Self {
            order_id: order.id_typed(),
            customer_id: order.customer_id(),
            status: order.status(),
            opened_at: order.opened_at(),
            closed_at: order.closed_at(),
            item_count: order.items().len(),
            total: order.calculate_total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    /// Orders that are neither completed nor cancelled.
    pub active_orders: usize,
    /// Sum of totals over completed orders only.
    pub completed_total: Money,
    pub orders: Vec<ServiceOrderSummary>,
}

impl TryFrom<&Customer> for CustomerSummary {
    type Error = DomainError;

    /// Fails with `InvalidEntity` when the completed totals do not fit the
    /// decimal range.
    fn try_from(customer: &Customer) -> Result<Self, Self::Error> {
        let orders: Vec<ServiceOrderSummary> =
            customer.orders().iter().map(ServiceOrderSummary::from).collect();

        let completed_total = Money::try_sum(
            orders
                .iter()
                .filter(|o| o.status == ServiceOrderStatus::Completed)
                .map(|o| o.total),
        )?;

        Ok(Self {
            customer_id: customer.id_typed(),
            name: customer.name().to_string(),
            email: customer.email().to_string(),
            active_orders: orders.iter().filter(|o| !o.status.is_finalized()).count(),
            completed_total,
            orders,
        })
    }
}
