//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values: two
/// `Money` amounts of `100` are the same money, whereas two customers with the
/// same name are still different customers. Validation happens once, at
/// construction; there are no setters, so a value that exists is valid.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
