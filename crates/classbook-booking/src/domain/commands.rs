//! Commands for the class booking context.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::aggregates::MembershipTier;

/// Command to register a new member.
#[derive(Debug, Clone)]
pub struct RegisterMember {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new member identifier.
    pub member_id: Uuid,
    /// Display name.
    pub name: String,
    /// Membership tier.
    pub tier: MembershipTier,
    /// Opening credit balance.
    pub initial_credits: u32,
}

/// Command to put a class on the schedule.
#[derive(Debug, Clone)]
pub struct ScheduleClass {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new class identifier.
    pub class_id: Uuid,
    /// Class name.
    pub name: String,
    /// Maximum number of booked members.
    pub capacity: u32,
    /// Class start time.
    pub starts_at: DateTime<Utc>,
}

/// Command to book a member into a class.
#[derive(Debug, Clone)]
pub struct BookClass {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier for the booking to create.
    pub booking_id: Uuid,
    /// The member booking the class.
    pub member_id: Uuid,
    /// The class being booked.
    pub class_id: Uuid,
}

/// Command to cancel a booking.
#[derive(Debug, Clone)]
pub struct CancelBooking {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The booking to cancel.
    pub booking_id: Uuid,
    /// Optional free-text reason.
    pub reason: Option<String>,
}

/// Command to mark an attended booking as completed.
#[derive(Debug, Clone)]
pub struct CompleteBooking {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The booking to complete.
    pub booking_id: Uuid,
}

/// Command to queue a member for a full class.
#[derive(Debug, Clone)]
pub struct JoinWaitlist {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier for the waitlist entry to create.
    pub entry_id: Uuid,
    /// The member joining the queue.
    pub member_id: Uuid,
    /// The class being queued for.
    pub class_id: Uuid,
}

/// Command to deactivate a member.
#[derive(Debug, Clone)]
pub struct DeactivateMember {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The member to deactivate.
    pub member_id: Uuid,
}
