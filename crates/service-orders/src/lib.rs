//! Service orders domain module.
//!
//! A [`Customer`] holds its [`ServiceOrder`]s; each order collects
//! [`ServiceItem`]s and moves through `Open → InProgress → Completed`, or to
//! `Cancelled` from either non-terminal state. Pure domain logic: no IO, no
//! storage, no locking. Callers that share a customer or order across threads
//! must serialize access to it themselves.

pub mod customer;
pub mod item;
pub mod order;
pub mod summary;

pub use customer::{Customer, ServiceOrderMut};
pub use item::ServiceItem;
pub use order::{
    AddItem, CancelOrder, CompleteOrder, ItemAdded, OpenServiceOrder, OrderCancelled,
    OrderCompleted, OrderStarted, ServiceOrder, ServiceOrderCommand, ServiceOrderEvent,
    ServiceOrderOpened, ServiceOrderStatus, StartOrder,
};
pub use summary::{CustomerSummary, ServiceOrderSummary};
