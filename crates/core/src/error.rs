//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant that a caller can act on carries the operation that failed
/// (and, for validation, the offending field) so the request layer can render
/// a message without guessing. Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller-correctable input problem (bad value, missing id, illegal edge).
    #[error("{operation}: invalid {field}: {message}")]
    Validation {
        operation: &'static str,
        field: &'static str,
        message: String,
    },

    /// A serialized sub-shape could not be produced or read back.
    #[error("{operation}: encoding failed: {message}")]
    Encoding {
        operation: &'static str,
        message: String,
    },

    /// An external reference (e.g. a company pickup location) did not resolve.
    #[error("{operation}: unresolved reference: {message}")]
    Reference {
        operation: &'static str,
        message: String,
    },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(
        operation: &'static str,
        field: &'static str,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            operation,
            field,
            message: msg.into(),
        }
    }

    pub fn encoding(operation: &'static str, msg: impl Into<String>) -> Self {
        Self::Encoding {
            operation,
            message: msg.into(),
        }
    }

    pub fn reference(operation: &'static str, msg: impl Into<String>) -> Self {
        Self::Reference {
            operation,
            message: msg.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. } | DomainError::InvalidId(_) | DomainError::Reference { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_operation_and_field() {
        let err = DomainError::validation("AssembleOrder", "delivery_deadline", "precedes pickup_time");
        assert_eq!(
            err.to_string(),
            "AssembleOrder: invalid delivery_deadline: precedes pickup_time"
        );
        assert!(err.is_caller_correctable());
    }

    #[test]
    fn encoding_errors_are_not_caller_correctable() {
        let err = DomainError::encoding("EncodeDimensions", "length is not finite");
        assert!(!err.is_caller_correctable());
        assert!(err.to_string().contains("EncodeDimensions"));
    }
}
