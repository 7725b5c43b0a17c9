//! Classbook — runtime error types.

use classbook_booking::domain::errors::{BookingError, ErrorKind};
use classbook_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the composition root.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Protocol-neutral description of a failed use case, for whatever
/// interface layer sits on top of the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Coarse category: `invariant_violation`, `not_found`, `conflict`, or
    /// `infrastructure`.
    pub kind: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Whether repeating the request may succeed.
    pub retryable: bool,
}

impl From<&BookingError> for ErrorReport {
    fn from(err: &BookingError) -> Self {
        let error = match err {
            BookingError::ClassFull { .. } => "class_full",
            BookingError::AlreadyBooked { .. } => "already_booked",
            BookingError::NotBooked { .. } => "not_booked",
            BookingError::InsufficientCredits { .. } => "insufficient_credits",
            BookingError::CreditOverflow { .. } => "credit_overflow",
            BookingError::MemberInactive(_) => "member_inactive",
            BookingError::AlreadyCancelled(_) => "already_cancelled",
            BookingError::InvalidStatusTransition { .. } => "invalid_status_transition",
            BookingError::CancellationWindowClosed { .. } => "cancellation_window_closed",
            BookingError::InvalidCapacity(_) => "invalid_capacity",
            BookingError::AlreadyWaitlisted { .. } => "already_waitlisted",
            BookingError::SpotsAvailable(_) => "spots_available",
            BookingError::Domain(DomainError::AggregateNotFound { .. }) => "aggregate_not_found",
            BookingError::Domain(DomainError::ConcurrencyConflict { .. }) => {
                "concurrency_conflict"
            }
            BookingError::Domain(DomainError::Validation(_)) => "validation_error",
            BookingError::Domain(DomainError::ReactionLimitExceeded { .. }) => {
                "reaction_limit_exceeded"
            }
            BookingError::Domain(DomainError::Infrastructure(_)) => "infrastructure_error",
        };
        let kind = match err.kind() {
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Infrastructure => "infrastructure",
        };

        Self {
            error,
            kind,
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn report(err: BookingError) -> ErrorReport {
        ErrorReport::from(&err)
    }

    #[test]
    fn test_rule_violation_reports_specific_code() {
        let report = report(BookingError::InsufficientCredits {
            member_id: Uuid::new_v4(),
            required: 1,
            available: 0,
        });

        assert_eq!(report.error, "insufficient_credits");
        assert_eq!(report.kind, "invariant_violation");
        assert!(!report.retryable);
    }

    #[test]
    fn test_aggregate_not_found_reports_not_found() {
        let id = Uuid::new_v4();

        let report = report(DomainError::not_found("booking", id).into());

        assert_eq!(report.error, "aggregate_not_found");
        assert_eq!(report.kind, "not_found");
        assert!(report.message.contains(&id.to_string()));
    }

    #[test]
    fn test_concurrency_conflict_is_retryable() {
        let report = report(
            DomainError::ConcurrencyConflict {
                aggregate_id: Uuid::new_v4(),
                expected: 1,
                actual: 2,
            }
            .into(),
        );

        assert_eq!(report.kind, "conflict");
        assert!(report.retryable);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = report(BookingError::SpotsAvailable(Uuid::new_v4()));

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["error"], "spots_available");
        assert_eq!(json["kind"], "invariant_violation");
    }
}
