//! `servicedesk-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod email;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use email::Email;
pub use entity::Entity;
pub use error::{DomainError, DomainErrorKind, DomainResult};
pub use id::{CustomerId, ServiceOrderId};
pub use money::Money;
pub use value_object::ValueObject;
