//! Strongly-typed identifiers used across the domain.
//!
//! Identities are plain integers handed in by the caller; uniqueness is
//! guaranteed (or not) outside the domain layer.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a customer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(u64);

/// Identifier of a service order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceOrderId(u64);

macro_rules! impl_numeric_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = u64::from_str(s.trim())
                    .map_err(|e| DomainError::invalid_entity(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_numeric_newtype!(CustomerId, "CustomerId");
impl_numeric_newtype!(ServiceOrderId, "ServiceOrderId");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainErrorKind;

    #[test]
    fn parses_and_displays_round_trip() {
        let id: ServiceOrderId = "42".parse().unwrap();
        assert_eq!(id, ServiceOrderId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn parse_failure_is_invalid_entity() {
        let err = "abc".parse::<CustomerId>().unwrap_err();
        assert_eq!(err.kind(), DomainErrorKind::InvalidEntity);
        assert!(err.message().starts_with("CustomerId"));
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&CustomerId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
