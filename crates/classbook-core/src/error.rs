//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type shared by every bounded context.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("{aggregate_type} not found: {id}")]
    AggregateNotFound {
        /// Kind of aggregate that was looked up.
        aggregate_type: &'static str,
        /// The identifier that missed.
        id: Uuid,
    },

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A dispatch call delivered more events than the configured cap.
    #[error("reaction chain exceeded {limit} events in a single dispatch")]
    ReactionLimitExceeded {
        /// The configured cap.
        limit: usize,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::AggregateNotFound`].
    #[must_use]
    pub fn not_found(aggregate_type: &'static str, id: Uuid) -> Self {
        Self::AggregateNotFound { aggregate_type, id }
    }

    /// Returns `true` when the caller may retry the operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        let id = Uuid::new_v4();
        assert!(
            DomainError::ConcurrencyConflict {
                aggregate_id: id,
                expected: 1,
                actual: 2,
            }
            .is_retryable()
        );
        assert!(!DomainError::not_found("member", id).is_retryable());
        assert!(!DomainError::Infrastructure("down".into()).is_retryable());
    }

    #[test]
    fn test_not_found_message_names_aggregate_and_id() {
        let id = Uuid::new_v4();
        let message = DomainError::not_found("fitness class", id).to_string();
        assert_eq!(message, format!("fitness class not found: {id}"));
    }
}
