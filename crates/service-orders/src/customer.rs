use core::ops::Deref;

use chrono::{DateTime, Utc};

use servicedesk_core::{CustomerId, DomainError, DomainResult, Email, Entity, ServiceOrderId};

use crate::item::ServiceItem;
use crate::order::ServiceOrder;

/// A customer and the service orders registered to it.
///
/// The order list is the authoritative record of which orders belong to the
/// customer; it only grows, through [`Customer::add_order`] or
/// [`Customer::open_order`]. Not internally synchronized: a concurrent host
/// must serialize access per customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: Email,
    orders: Vec<ServiceOrder>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, email: Email) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_entity("invalid name"));
        }

        Ok(Self {
            id,
            name,
            email,
            orders: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Registered orders, in registration order.
    pub fn orders(&self) -> &[ServiceOrder] {
        &self.orders
    }

    pub fn order(&self, id: ServiceOrderId) -> Option<&ServiceOrder> {
        self.orders.iter().find(|o| o.id_typed() == id)
    }

    /// Lifecycle access to a registered order.
    pub fn order_mut(&mut self, id: ServiceOrderId) -> Option<ServiceOrderMut<'_>> {
        self.orders
            .iter_mut()
            .find(|o| o.id_typed() == id)
            .map(|order| ServiceOrderMut { order })
    }

    /// Register an order with this customer.
    ///
    /// An order whose id is already registered is ignored without error and
    /// the registered one is kept. Fails with `InvalidEntity` when the order
    /// was opened for a different customer.
    pub fn add_order(&mut self, order: ServiceOrder) -> DomainResult<()> {
        if order.customer_id() != self.id {
            return Err(DomainError::invalid_entity(format!(
                "order {} belongs to customer {}, not {}",
                order.id_typed(),
                order.customer_id(),
                self.id
            )));
        }

        if self.order(order.id_typed()).is_some() {
            tracing::debug!(
                customer_id = %self.id,
                order_id = %order.id_typed(),
                "order already registered; ignoring duplicate"
            );
            return Ok(());
        }

        tracing::debug!(
            customer_id = %self.id,
            order_id = %order.id_typed(),
            "order registered"
        );
        self.orders.push(order);
        Ok(())
    }

    /// Open an order for this customer and register it in one step.
    ///
    /// Returns the order registered under `id`; if one already exists it is
    /// returned untouched.
    pub fn open_order(&mut self, id: ServiceOrderId) -> DomainResult<ServiceOrderMut<'_>> {
        self.open_order_at(id, Utc::now())
    }

    pub fn open_order_at(
        &mut self,
        id: ServiceOrderId,
        opened_at: DateTime<Utc>,
    ) -> DomainResult<ServiceOrderMut<'_>> {
        let order = ServiceOrder::new_at(id, self, opened_at)?;
        self.add_order(order)?;
        self.order_mut(id)
            .ok_or_else(|| DomainError::invalid_entity(format!("order {id} is not registered")))
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Mutable access to an order registered with a [`Customer`].
///
/// Offers the order's lifecycle operations, and its read accessors through
/// `Deref`. The registered order itself can never be replaced, so the
/// customer's list stays unique by id and every entry keeps pointing back at
/// this customer.
///
/// ```compile_fail
/// use servicedesk_core::{CustomerId, Email, ServiceOrderId};
/// use servicedesk_service_orders::{Customer, ServiceOrder};
///
/// let email = Email::new("ana@x.com").unwrap();
/// let mut customer = Customer::new(CustomerId::new(1), "Ana", email).unwrap();
/// customer.open_order(ServiceOrderId::new(1)).unwrap();
/// let other = ServiceOrder::new(ServiceOrderId::new(2), &customer).unwrap();
///
/// *customer.order_mut(ServiceOrderId::new(1)).unwrap() = other;
/// ```
#[derive(Debug)]
pub struct ServiceOrderMut<'a> {
    order: &'a mut ServiceOrder,
}

impl ServiceOrderMut<'_> {
    pub fn add_item(&mut self, item: ServiceItem) -> DomainResult<()> {
        self.order.add_item(item)
    }

    pub fn add_item_at(
        &mut self,
        item: ServiceItem,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.order.add_item_at(item, occurred_at)
    }

    pub fn start(&mut self) -> DomainResult<()> {
        self.order.start()
    }

    pub fn start_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.order.start_at(occurred_at)
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        self.order.complete()
    }

    pub fn complete_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.order.complete_at(occurred_at)
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.order.cancel()
    }

    pub fn cancel_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.order.cancel_at(occurred_at)
    }
}

impl Deref for ServiceOrderMut<'_> {
    type Target = ServiceOrder;

    fn deref(&self) -> &Self::Target {
        &*self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use servicedesk_core::{AggregateRoot, DomainErrorKind, Money};

    use crate::order::ServiceOrderStatus;

    fn test_email() -> Email {
        Email::new("ana@x.com").unwrap()
    }

    fn test_customer() -> Customer {
        Customer::new(CustomerId::new(1), "Ana", test_email()).unwrap()
    }

    #[test]
    fn blank_name_is_rejected() {
        for name in ["", "   "] {
            let err = Customer::new(CustomerId::new(1), name, test_email()).unwrap_err();
            assert_eq!(err.kind(), DomainErrorKind::InvalidEntity);
            assert!(err.message().contains("name"));
        }
    }

    #[test]
    fn new_customer_has_no_orders() {
        let customer = test_customer();
        assert_eq!(customer.name(), "Ana");
        assert_eq!(customer.email().as_str(), "ana@x.com");
        assert!(customer.orders().is_empty());
    }

    #[test]
    fn open_order_registers_an_open_order() {
        let mut customer = test_customer();
        let order = customer.open_order(ServiceOrderId::new(1)).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Open);
        assert_eq!(order.customer_id(), CustomerId::new(1));

        assert_eq!(customer.orders().len(), 1);
        assert!(customer.order(ServiceOrderId::new(1)).is_some());
    }

    #[test]
    fn two_step_registration() {
        let mut customer = test_customer();
        let order = ServiceOrder::new(ServiceOrderId::new(3), &customer).unwrap();
        assert!(customer.orders().is_empty());

        customer.add_order(order.clone()).unwrap();
        assert_eq!(customer.orders(), &[order]);
    }

    #[test]
    fn duplicate_order_id_is_silently_ignored() {
        let mut customer = test_customer();
        let opened_at = Utc::now();
        let first =
            ServiceOrder::new_at(ServiceOrderId::new(1), &customer, opened_at).unwrap();
        let second = ServiceOrder::new_at(
            ServiceOrderId::new(1),
            &customer,
            opened_at + Duration::hours(1),
        )
        .unwrap();

        customer.add_order(first).unwrap();
        customer.add_order(second).unwrap();

        assert_eq!(customer.orders().len(), 1);
        assert_eq!(customer.orders()[0].opened_at(), opened_at);
    }

    #[test]
    fn open_order_with_existing_id_returns_registered_order() {
        let mut customer = test_customer();
        customer.open_order(ServiceOrderId::new(1)).unwrap().start().unwrap();

        let again = customer.open_order(ServiceOrderId::new(1)).unwrap();
        assert_eq!(again.status(), ServiceOrderStatus::InProgress);
        assert_eq!(customer.orders().len(), 1);
    }

    #[test]
    fn order_for_another_customer_is_rejected() {
        let other = Customer::new(CustomerId::new(2), "Bia", test_email()).unwrap();
        let foreign = ServiceOrder::new(ServiceOrderId::new(9), &other).unwrap();

        let mut customer = test_customer();
        let err = customer.add_order(foreign).unwrap_err();
        assert_eq!(err.kind(), DomainErrorKind::InvalidEntity);
        assert!(customer.orders().is_empty());
    }

    #[test]
    fn orders_keep_registration_order() {
        let mut customer = test_customer();
        for id in [5, 2, 8] {
            customer.open_order(ServiceOrderId::new(id)).unwrap();
        }
        let ids: Vec<u64> = customer.orders().iter().map(|o| o.id_typed().get()).collect();
        assert_eq!(ids, vec![5, 2, 8]);
    }

    #[test]
    fn order_mut_reaches_registered_order() {
        let mut customer = test_customer();
        customer.open_order(ServiceOrderId::new(1)).unwrap();

        customer
            .order_mut(ServiceOrderId::new(1))
            .unwrap()
            .cancel()
            .unwrap();
        assert_eq!(
            customer.order(ServiceOrderId::new(1)).unwrap().status(),
            ServiceOrderStatus::Cancelled
        );
        assert!(customer.order_mut(ServiceOrderId::new(2)).is_none());
    }

    #[test]
    fn lifecycle_through_handle_keeps_registration_intact() {
        let mut customer = test_customer();
        customer.open_order(ServiceOrderId::new(1)).unwrap();
        customer.open_order(ServiceOrderId::new(2)).unwrap();

        let mut second = customer.order_mut(ServiceOrderId::new(2)).unwrap();
        second
            .add_item(ServiceItem::new("Repair", Money::new(Decimal::from(10)).unwrap(), 1).unwrap())
            .unwrap();
        second.start().unwrap();
        second.complete().unwrap();
        assert_eq!(second.id_typed(), ServiceOrderId::new(2));
        assert_eq!(second.items().len(), 1);

        let ids: Vec<u64> = customer.orders().iter().map(|o| o.id_typed().get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(
            customer
                .orders()
                .iter()
                .all(|o| o.customer_id() == customer.id_typed())
        );
        assert_eq!(
            customer.order(ServiceOrderId::new(2)).unwrap().status(),
            ServiceOrderStatus::Completed
        );
    }

    #[test]
    fn rejected_operation_through_handle_leaves_order_unchanged() {
        let mut customer = test_customer();
        let mut order = customer.open_order(ServiceOrderId::new(1)).unwrap();
        order.cancel().unwrap();
        assert!(order.start().unwrap_err().message().contains("finalized"));

        let registered = customer.order(ServiceOrderId::new(1)).unwrap();
        assert_eq!(registered.status(), ServiceOrderStatus::Cancelled);
        assert_eq!(registered.version(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the collection holds one entry per distinct order id.
        #[test]
        fn orders_are_unique_by_id(ids in prop::collection::vec(0u64..20, 0..40)) {
            let mut customer = test_customer();
            for id in &ids {
                let order = ServiceOrder::new(ServiceOrderId::new(*id), &customer).unwrap();
                customer.add_order(order).unwrap();
            }

            let mut distinct = ids.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(customer.orders().len(), distinct.len());
        }
    }
}
