//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Two kinds only: structural validation failures raised at construction time
/// (or when an invalid reference is passed in), and lifecycle rule violations
/// raised by the operation that would break the rule. Callers can match a single
/// variant, compare [`DomainError::kind`], or treat every `DomainError` alike.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value or reference failed structural validation.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// A lifecycle rule was violated; the aggregate is left unchanged.
    #[error("business rule violated: {0}")]
    BusinessRule(String),
}

/// Discriminant of [`DomainError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    InvalidEntity,
    BusinessRule,
}

impl DomainError {
    pub fn invalid_entity(msg: impl Into<String>) -> Self {
        Self::InvalidEntity(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn kind(&self) -> DomainErrorKind {
        match self {
            DomainError::InvalidEntity(_) => DomainErrorKind::InvalidEntity,
            DomainError::BusinessRule(_) => DomainErrorKind::BusinessRule,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::InvalidEntity(msg) | DomainError::BusinessRule(msg) => msg,
        }
    }
}
