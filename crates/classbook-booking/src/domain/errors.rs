//! Errors raised by the class booking context.

use chrono::TimeDelta;
use classbook_core::error::DomainError;
use thiserror::Error;
use uuid::Uuid;

use super::aggregates::BookingStatus;

/// Coarse classification callers use to map failures onto their protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A business rule rejected the operation.
    InvariantViolation,
    /// A required aggregate does not exist.
    NotFound,
    /// A concurrent write won; the operation may be retried.
    Conflict,
    /// Anything else (persistence failures, runaway reaction chains).
    Infrastructure,
}

/// Error type for booking aggregates and orchestrators.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The class has no free spot.
    #[error("class {class_id} is full (capacity {capacity})")]
    ClassFull {
        /// The class.
        class_id: Uuid,
        /// Its capacity.
        capacity: u32,
    },

    /// The member already holds a spot in the class.
    #[error("member {member_id} is already booked into class {class_id}")]
    AlreadyBooked {
        /// The class.
        class_id: Uuid,
        /// The member.
        member_id: Uuid,
    },

    /// The member holds no spot in the class.
    #[error("member {member_id} is not booked into class {class_id}")]
    NotBooked {
        /// The class.
        class_id: Uuid,
        /// The member.
        member_id: Uuid,
    },

    /// The member's balance does not cover the charge.
    #[error("member {member_id} has {available} credits, {required} required")]
    InsufficientCredits {
        /// The member.
        member_id: Uuid,
        /// Credits needed.
        required: u32,
        /// Credits held.
        available: u32,
    },

    /// A refund would push the balance past the representable maximum.
    #[error("member {member_id} holds {available} credits, cannot add {amount}")]
    CreditOverflow {
        /// The member.
        member_id: Uuid,
        /// Credits being returned.
        amount: u32,
        /// Credits held.
        available: u32,
    },

    /// The member has been deactivated.
    #[error("member {0} is inactive")]
    MemberInactive(Uuid),

    /// The booking was already cancelled.
    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(Uuid),

    /// The booking cannot move between these statuses.
    #[error("booking {booking_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// The booking.
        booking_id: Uuid,
        /// Current status.
        from: BookingStatus,
        /// Requested status.
        to: BookingStatus,
    },

    /// Too close to class start to cancel.
    #[error(
        "booking {booking_id} can no longer be cancelled: class starts in {remaining_minutes} minutes, at least {lead_time_minutes} required"
    )]
    CancellationWindowClosed {
        /// The booking.
        booking_id: Uuid,
        /// Minutes left before class start.
        remaining_minutes: i64,
        /// Minimum notice in minutes.
        lead_time_minutes: i64,
    },

    /// A class must hold at least one member.
    #[error("class capacity must be positive, got {0}")]
    InvalidCapacity(u32),

    /// The member is already queued for the class.
    #[error("member {member_id} is already on the waitlist for class {class_id}")]
    AlreadyWaitlisted {
        /// The class.
        class_id: Uuid,
        /// The member.
        member_id: Uuid,
    },

    /// The class has room, so the member should book directly.
    #[error("class {0} has available spots; book it directly")]
    SpotsAvailable(Uuid),

    /// Not-found, conflict, or infrastructure failure from the core.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl BookingError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::AggregateNotFound { .. }) => ErrorKind::NotFound,
            Self::Domain(DomainError::ConcurrencyConflict { .. }) => ErrorKind::Conflict,
            Self::Domain(DomainError::Validation(_)) => ErrorKind::InvariantViolation,
            Self::Domain(
                DomainError::Infrastructure(_) | DomainError::ReactionLimitExceeded { .. },
            ) => ErrorKind::Infrastructure,
            _ => ErrorKind::InvariantViolation,
        }
    }

    /// Returns `true` only for concurrency conflicts.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    pub(crate) fn cancellation_window_closed(
        booking_id: Uuid,
        remaining: TimeDelta,
        lead_time: TimeDelta,
    ) -> Self {
        Self::CancellationWindowClosed {
            booking_id,
            remaining_minutes: remaining.num_minutes(),
            lead_time_minutes: lead_time.num_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violations_classify_as_invariant_violations() {
        let class_id = Uuid::new_v4();
        let err = BookingError::ClassFull {
            class_id,
            capacity: 10,
        };

        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), format!("class {class_id} is full (capacity 10)"));
    }

    #[test]
    fn test_domain_errors_keep_their_classification() {
        let id = Uuid::new_v4();

        let not_found = BookingError::from(DomainError::not_found("member", id));
        let conflict = BookingError::from(DomainError::ConcurrencyConflict {
            aggregate_id: id,
            expected: 1,
            actual: 2,
        });
        let runaway = BookingError::from(DomainError::ReactionLimitExceeded { limit: 8 });

        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.is_retryable());
        assert_eq!(runaway.kind(), ErrorKind::Infrastructure);
    }
}
