//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two addresses with the same lines are the
/// same address. To "modify" one, build a new value.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Coordinates {
///     latitude: f64,
///     longitude: f64,
/// }
///
/// impl ValueObject for Coordinates {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
