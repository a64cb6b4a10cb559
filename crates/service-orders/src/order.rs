use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use servicedesk_core::{
    Aggregate, AggregateRoot, CustomerId, DomainError, DomainResult, Entity, Money,
    ServiceOrderId,
};
use servicedesk_events::Event;

use crate::customer::Customer;
use crate::item::ServiceItem;

const FINALIZED_STATUS: &str = "order is finalized and cannot change status";
const FINALIZED_ITEMS: &str = "order is finalized and does not accept new items";

/// Service order status lifecycle.
///
/// ```text
/// Open ──► InProgress ──► Completed
///   │          │
///   └──────────┴────────► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceOrderStatus {
    /// Terminal states; nothing leaves them.
    pub fn is_finalized(&self) -> bool {
        matches!(
            self,
            ServiceOrderStatus::Completed | ServiceOrderStatus::Cancelled
        )
    }

    pub fn accepts_items(&self) -> bool {
        !self.is_finalized()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceOrderStatus::Open => "open",
            ServiceOrderStatus::InProgress => "in_progress",
            ServiceOrderStatus::Completed => "completed",
            ServiceOrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for ServiceOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root: ServiceOrder.
///
/// Bound to exactly one customer through `customer_id`, a lookup-only back-link;
/// the customer's order list is what holds the order. Not internally
/// synchronized: concurrent hosts must serialize access per order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOrder {
    id: ServiceOrderId,
    customer_id: CustomerId,
    status: ServiceOrderStatus,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    items: Vec<ServiceItem>,
    total: Money,
    history: Vec<ServiceOrderEvent>,
    version: u64,
    created: bool,
}

impl ServiceOrder {
    /// Open a new order for `customer`, stamped with the current time.
    ///
    /// The order is not registered with the customer; pass it to
    /// [`Customer::add_order`] or use [`Customer::open_order`] instead.
    pub fn new(id: ServiceOrderId, customer: &Customer) -> DomainResult<Self> {
        Self::new_at(id, customer, Utc::now())
    }

    pub fn new_at(
        id: ServiceOrderId,
        customer: &Customer,
        opened_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut order = Self::empty(id);
        order.execute(&ServiceOrderCommand::OpenServiceOrder(OpenServiceOrder {
            order_id: id,
            customer_id: *customer.id(),
            occurred_at: opened_at,
        }))?;
        Ok(order)
    }

    /// Rebuild an order from its recorded history.
    ///
    /// Every event must be exactly what `handle` would have decided at that
    /// point of the history, so an out-of-order, foreign or tampered history
    /// fails with `InvalidEntity`.
    pub fn replay<'a>(
        id: ServiceOrderId,
        events: impl IntoIterator<Item = &'a ServiceOrderEvent>,
    ) -> DomainResult<Self> {
        let mut order = Self::empty(id);
        for event in events {
            let expected = order.handle(&event.to_command()).map_err(|err| {
                DomainError::invalid_entity(format!(
                    "{} cannot be replayed: {}",
                    event.event_type(),
                    err.message()
                ))
            })?;
            if expected.as_slice() != core::slice::from_ref(event) {
                return Err(DomainError::invalid_entity(format!(
                    "{} does not follow from the preceding history",
                    event.event_type()
                )));
            }
            order.apply(event);
        }
        if !order.created {
            return Err(DomainError::invalid_entity("history is empty"));
        }
        Ok(order)
    }

    fn empty(id: ServiceOrderId) -> Self {
        Self {
            id,
            customer_id: CustomerId::new(0),
            status: ServiceOrderStatus::Open,
            opened_at: DateTime::<Utc>::default(),
            closed_at: None,
            items: Vec::new(),
            total: Money::zero(),
            history: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ServiceOrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn status(&self) -> ServiceOrderStatus {
        self.status
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Set exactly when the order is finalized.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn items(&self) -> &[ServiceItem] {
        &self.items
    }

    /// Every event applied to this order, oldest first.
    pub fn history(&self) -> &[ServiceOrderEvent] {
        &self.history
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }

    /// Sum of item subtotals; zero for an order without items.
    ///
    /// Kept exact by refusing items that would push it past the decimal range.
    /// Available in every status, including after finalization.
    pub fn calculate_total(&self) -> Money {
        self.total
    }

    pub fn add_item(&mut self, item: ServiceItem) -> DomainResult<()> {
        self.add_item_at(item, Utc::now())
    }

    pub fn add_item_at(
        &mut self,
        item: ServiceItem,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.run(ServiceOrderCommand::AddItem(AddItem {
            order_id: self.id,
            item,
            occurred_at,
        }))
    }

    pub fn start(&mut self) -> DomainResult<()> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.run(ServiceOrderCommand::StartOrder(StartOrder {
            order_id: self.id,
            occurred_at,
        }))
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        self.complete_at(Utc::now())
    }

    pub fn complete_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.run(ServiceOrderCommand::CompleteOrder(CompleteOrder {
            order_id: self.id,
            occurred_at,
        }))
    }

    /// Cancel from `Open` or `InProgress`; starting first is not required.
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.cancel_at(Utc::now())
    }

    pub fn cancel_at(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.run(ServiceOrderCommand::CancelOrder(CancelOrder {
            order_id: self.id,
            occurred_at,
        }))
    }

    fn run(&mut self, command: ServiceOrderCommand) -> DomainResult<()> {
        let from = self.status;
        match self.execute(&command) {
            Ok(_) => {
                tracing::debug!(
                    order_id = %self.id,
                    from = %from,
                    to = %self.status,
                    items = self.items.len(),
                    "service order updated"
                );
                Ok(())
            }
            Err(err) => {
                tracing::debug!(
                    order_id = %self.id,
                    status = %from,
                    error = %err,
                    "service order command rejected"
                );
                Err(err)
            }
        }
    }
}

impl AggregateRoot for ServiceOrder {
    type Id = ServiceOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenServiceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenServiceOrder {
    pub order_id: ServiceOrderId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub order_id: ServiceOrderId,
    pub item: ServiceItem,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOrder {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteOrder {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceOrderCommand {
    OpenServiceOrder(OpenServiceOrder),
    AddItem(AddItem),
    StartOrder(StartOrder),
    CompleteOrder(CompleteOrder),
    CancelOrder(CancelOrder),
}

/// Event: ServiceOrderOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrderOpened {
    pub order_id: ServiceOrderId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub order_id: ServiceOrderId,
    pub line_no: u32,
    pub item: ServiceItem,
    /// Order total including this item.
    pub new_total: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStarted {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: ServiceOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceOrderEvent {
    ServiceOrderOpened(ServiceOrderOpened),
    ItemAdded(ItemAdded),
    OrderStarted(OrderStarted),
    OrderCompleted(OrderCompleted),
    OrderCancelled(OrderCancelled),
}

impl ServiceOrderEvent {
    /// The command whose handling yields this event.
    fn to_command(&self) -> ServiceOrderCommand {
        match self {
            ServiceOrderEvent::ServiceOrderOpened(e) => {
                ServiceOrderCommand::OpenServiceOrder(OpenServiceOrder {
                    order_id: e.order_id,
                    customer_id: e.customer_id,
                    occurred_at: e.occurred_at,
                })
            }
            ServiceOrderEvent::ItemAdded(e) => ServiceOrderCommand::AddItem(AddItem {
                order_id: e.order_id,
                item: e.item.clone(),
                occurred_at: e.occurred_at,
            }),
            ServiceOrderEvent::OrderStarted(e) => ServiceOrderCommand::StartOrder(StartOrder {
                order_id: e.order_id,
                occurred_at: e.occurred_at,
            }),
            ServiceOrderEvent::OrderCompleted(e) => {
                ServiceOrderCommand::CompleteOrder(CompleteOrder {
                    order_id: e.order_id,
                    occurred_at: e.occurred_at,
                })
            }
            ServiceOrderEvent::OrderCancelled(e) => ServiceOrderCommand::CancelOrder(CancelOrder {
                order_id: e.order_id,
                occurred_at: e.occurred_at,
            }),
        }
    }

    pub fn order_id(&self) -> ServiceOrderId {
        match self {
            ServiceOrderEvent::ServiceOrderOpened(e) => e.order_id,
            ServiceOrderEvent::ItemAdded(e) => e.order_id,
            ServiceOrderEvent::OrderStarted(e) => e.order_id,
            ServiceOrderEvent::OrderCompleted(e) => e.order_id,
            ServiceOrderEvent::OrderCancelled(e) => e.order_id,
        }
    }
}

impl Event for ServiceOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ServiceOrderEvent::ServiceOrderOpened(_) => "service.order.opened",
            ServiceOrderEvent::ItemAdded(_) => "service.order.item_added",
            ServiceOrderEvent::OrderStarted(_) => "service.order.started",
            ServiceOrderEvent::OrderCompleted(_) => "service.order.completed",
            ServiceOrderEvent::OrderCancelled(_) => "service.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ServiceOrderEvent::ServiceOrderOpened(e) => e.occurred_at,
            ServiceOrderEvent::ItemAdded(e) => e.occurred_at,
            ServiceOrderEvent::OrderStarted(e) => e.occurred_at,
            ServiceOrderEvent::OrderCompleted(e) => e.occurred_at,
            ServiceOrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ServiceOrder {
    type Command = ServiceOrderCommand;
    type Event = ServiceOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ServiceOrderEvent::ServiceOrderOpened(e) => {
                self.id = e.order_id;
                self.customer_id = e.customer_id;
                self.status = ServiceOrderStatus::Open;
                self.opened_at = e.occurred_at;
                self.closed_at = None;
                self.items.clear();
                self.total = Money::zero();
                self.created = true;
            }
            ServiceOrderEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
                self.total = e.new_total;
            }
            ServiceOrderEvent::OrderStarted(_) => {
                self.status = ServiceOrderStatus::InProgress;
            }
            ServiceOrderEvent::OrderCompleted(e) => {
                self.status = ServiceOrderStatus::Completed;
                self.closed_at = Some(e.occurred_at);
            }
            ServiceOrderEvent::OrderCancelled(e) => {
                self.status = ServiceOrderStatus::Cancelled;
                self.closed_at = Some(e.occurred_at);
            }
        }

        self.history.push(event.clone());
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ServiceOrderCommand::OpenServiceOrder(cmd) => self.handle_open(cmd),
            ServiceOrderCommand::AddItem(cmd) => self.handle_add_item(cmd),
            ServiceOrderCommand::StartOrder(cmd) => self.handle_start(cmd),
            ServiceOrderCommand::CompleteOrder(cmd) => self.handle_complete(cmd),
            ServiceOrderCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl ServiceOrder {
    fn ensure_opened(&self, order_id: ServiceOrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::invalid_entity("service order has not been opened"));
        }
        if self.id != order_id {
            return Err(DomainError::invalid_entity("order_id mismatch"));
        }
        Ok(())
    }

    /// Runs before any operation-specific check so every transition on a
    /// finalized order reports the same error.
    fn ensure_not_finalized(&self) -> Result<(), DomainError> {
        if self.status.is_finalized() {
            return Err(DomainError::business_rule(FINALIZED_STATUS));
        }
        Ok(())
    }

    fn handle_open(
        &self,
        cmd: &OpenServiceOrder,
    ) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::business_rule("service order already opened"));
        }
        if self.id != cmd.order_id {
            return Err(DomainError::invalid_entity("order_id mismatch"));
        }

        Ok(vec![ServiceOrderEvent::ServiceOrderOpened(ServiceOrderOpened {
            order_id: cmd.order_id,
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        self.ensure_opened(cmd.order_id)?;
        if !self.status.accepts_items() {
            return Err(DomainError::business_rule(FINALIZED_ITEMS));
        }

        let line_no = u32::try_from(self.items.len() + 1)
            .map_err(|_| DomainError::business_rule("too many items on one order"))?;
        let new_total = self
            .total
            .checked_add(cmd.item.subtotal())
            .map_err(|_| DomainError::business_rule("order total out of range"))?;

        Ok(vec![ServiceOrderEvent::ItemAdded(ItemAdded {
            order_id: cmd.order_id,
            line_no,
            item: cmd.item.clone(),
            new_total,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start(&self, cmd: &StartOrder) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        self.ensure_opened(cmd.order_id)?;
        self.ensure_not_finalized()?;

        if self.status != ServiceOrderStatus::Open {
            return Err(DomainError::business_rule("only open orders can be started"));
        }

        Ok(vec![ServiceOrderEvent::OrderStarted(OrderStarted {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(
        &self,
        cmd: &CompleteOrder,
    ) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        self.ensure_opened(cmd.order_id)?;
        self.ensure_not_finalized()?;

        if self.status != ServiceOrderStatus::InProgress {
            return Err(DomainError::business_rule(
                "only in-progress orders can be completed",
            ));
        }

        Ok(vec![ServiceOrderEvent::OrderCompleted(OrderCompleted {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        self.ensure_opened(cmd.order_id)?;
        self.ensure_not_finalized()?;

        Ok(vec![ServiceOrderEvent::OrderCancelled(OrderCancelled {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
