//! Domain events for the class booking context.

use chrono::{DateTime, Utc};
use classbook_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::MembershipTier;

/// Event type for [`MemberRegistered`].
pub const MEMBER_REGISTERED_EVENT_TYPE: &str = "booking.member_registered";
/// Event type for [`CreditsDeducted`].
pub const CREDITS_DEDUCTED_EVENT_TYPE: &str = "booking.credits_deducted";
/// Event type for [`CreditsRefunded`].
pub const CREDITS_REFUNDED_EVENT_TYPE: &str = "booking.credits_refunded";
/// Event type for [`MemberDeactivated`].
pub const MEMBER_DEACTIVATED_EVENT_TYPE: &str = "booking.member_deactivated";
/// Event type for [`ClassScheduled`].
pub const CLASS_SCHEDULED_EVENT_TYPE: &str = "booking.class_scheduled";
/// Event type for [`SpotReserved`].
pub const SPOT_RESERVED_EVENT_TYPE: &str = "booking.spot_reserved";
/// Event type for [`ClassSpotBecameAvailable`].
pub const CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE: &str = "booking.class_spot_became_available";
/// Event type for [`BookingConfirmed`].
pub const BOOKING_CONFIRMED_EVENT_TYPE: &str = "booking.booking_confirmed";
/// Event type for [`BookingCancelled`].
pub const BOOKING_CANCELLED_EVENT_TYPE: &str = "booking.booking_cancelled";
/// Event type for [`BookingCompleted`].
pub const BOOKING_COMPLETED_EVENT_TYPE: &str = "booking.booking_completed";
/// Event type for [`MemberJoinedWaitlist`].
pub const MEMBER_JOINED_WAITLIST_EVENT_TYPE: &str = "booking.member_joined_waitlist";
/// Event type for [`WaitlistEntryPromoted`].
pub const WAITLIST_ENTRY_PROMOTED_EVENT_TYPE: &str = "booking.waitlist_entry_promoted";
/// Event type for [`WaitlistEntryDiscarded`].
pub const WAITLIST_ENTRY_DISCARDED_EVENT_TYPE: &str = "booking.waitlist_entry_discarded";

/// Emitted when a member registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistered {
    /// The member identifier.
    pub member_id: Uuid,
    /// Display name.
    pub name: String,
    /// Membership tier at registration.
    pub tier: MembershipTier,
    /// Opening credit balance.
    pub initial_credits: u32,
}

/// Emitted when credits are taken from a member's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsDeducted {
    /// The member identifier.
    pub member_id: Uuid,
    /// Credits deducted.
    pub amount: u32,
    /// Balance after the deduction.
    pub balance: u32,
}

/// Emitted when credits are returned to a member's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsRefunded {
    /// The member identifier.
    pub member_id: Uuid,
    /// Credits refunded.
    pub amount: u32,
    /// Balance after the refund.
    pub balance: u32,
}

/// Emitted when a member is deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeactivated {
    /// The member identifier.
    pub member_id: Uuid,
}

/// Emitted when a class is put on the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassScheduled {
    /// The class identifier.
    pub class_id: Uuid,
    /// Class name.
    pub name: String,
    /// Maximum number of booked members.
    pub capacity: u32,
    /// Class start time.
    pub starts_at: DateTime<Utc>,
}

/// Emitted when a member takes a spot in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotReserved {
    /// The class identifier.
    pub class_id: Uuid,
    /// The member who took the spot.
    pub member_id: Uuid,
    /// Occupancy after the reservation.
    pub occupancy: u32,
}

/// Emitted when a spot in a class is vacated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpotBecameAvailable {
    /// The class identifier.
    pub class_id: Uuid,
    /// The booking that vacated the spot, for traceability.
    pub vacated_booking_id: Option<Uuid>,
}

/// Emitted when a booking is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmed {
    /// The booking identifier.
    pub booking_id: Uuid,
    /// The booked member.
    pub member_id: Uuid,
    /// The booked class.
    pub class_id: Uuid,
}

/// Emitted when a booking is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCancelled {
    /// The booking identifier.
    pub booking_id: Uuid,
    /// The booked member.
    pub member_id: Uuid,
    /// The booked class.
    pub class_id: Uuid,
    /// Optional free-text reason supplied by the caller.
    pub reason: Option<String>,
}

/// Emitted when an attended booking is closed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCompleted {
    /// The booking identifier.
    pub booking_id: Uuid,
    /// The booked member.
    pub member_id: Uuid,
    /// The booked class.
    pub class_id: Uuid,
}

/// Emitted when a member queues for a full class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberJoinedWaitlist {
    /// The waitlist entry identifier.
    pub entry_id: Uuid,
    /// The queued member.
    pub member_id: Uuid,
    /// The class being queued for.
    pub class_id: Uuid,
}

/// Emitted when a waitlist entry is turned into a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntryPromoted {
    /// The waitlist entry identifier.
    pub entry_id: Uuid,
    /// The promoted member.
    pub member_id: Uuid,
    /// The class.
    pub class_id: Uuid,
    /// The booking created by the promotion.
    pub booking_id: Uuid,
}

/// Emitted when a stale waitlist entry is dropped without promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntryDiscarded {
    /// The waitlist entry identifier.
    pub entry_id: Uuid,
    /// The queued member.
    pub member_id: Uuid,
    /// The class.
    pub class_id: Uuid,
    /// Why the entry was dropped.
    pub reason: String,
}

/// Event payload variants for the class booking context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEventKind {
    /// A member has registered.
    MemberRegistered(MemberRegistered),
    /// Credits have been deducted.
    CreditsDeducted(CreditsDeducted),
    /// Credits have been refunded.
    CreditsRefunded(CreditsRefunded),
    /// A member has been deactivated.
    MemberDeactivated(MemberDeactivated),
    /// A class has been scheduled.
    ClassScheduled(ClassScheduled),
    /// A spot in a class has been reserved.
    SpotReserved(SpotReserved),
    /// A spot in a class has become available.
    ClassSpotBecameAvailable(ClassSpotBecameAvailable),
    /// A booking has been confirmed.
    BookingConfirmed(BookingConfirmed),
    /// A booking has been cancelled.
    BookingCancelled(BookingCancelled),
    /// A booking has been completed.
    BookingCompleted(BookingCompleted),
    /// A member has joined a class waitlist.
    MemberJoinedWaitlist(MemberJoinedWaitlist),
    /// A waitlist entry has been promoted to a booking.
    WaitlistEntryPromoted(WaitlistEntryPromoted),
    /// A waitlist entry has been discarded.
    WaitlistEntryDiscarded(WaitlistEntryDiscarded),
}

impl BookingEventKind {
    /// The routing name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MemberRegistered(_) => MEMBER_REGISTERED_EVENT_TYPE,
            Self::CreditsDeducted(_) => CREDITS_DEDUCTED_EVENT_TYPE,
            Self::CreditsRefunded(_) => CREDITS_REFUNDED_EVENT_TYPE,
            Self::MemberDeactivated(_) => MEMBER_DEACTIVATED_EVENT_TYPE,
            Self::ClassScheduled(_) => CLASS_SCHEDULED_EVENT_TYPE,
            Self::SpotReserved(_) => SPOT_RESERVED_EVENT_TYPE,
            Self::ClassSpotBecameAvailable(_) => CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE,
            Self::BookingConfirmed(_) => BOOKING_CONFIRMED_EVENT_TYPE,
            Self::BookingCancelled(_) => BOOKING_CANCELLED_EVENT_TYPE,
            Self::BookingCompleted(_) => BOOKING_COMPLETED_EVENT_TYPE,
            Self::MemberJoinedWaitlist(_) => MEMBER_JOINED_WAITLIST_EVENT_TYPE,
            Self::WaitlistEntryPromoted(_) => WAITLIST_ENTRY_PROMOTED_EVENT_TYPE,
            Self::WaitlistEntryDiscarded(_) => WAITLIST_ENTRY_DISCARDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the class booking context.
///
/// Both parts are private; an event cannot be altered once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingEvent {
    metadata: EventMetadata,
    kind: BookingEventKind,
}

impl BookingEvent {
    /// Wraps a payload with its metadata.
    #[must_use]
    pub fn new(metadata: EventMetadata, kind: BookingEventKind) -> Self {
        Self { metadata, kind }
    }

    /// Event-specific payload.
    #[must_use]
    pub fn kind(&self) -> &BookingEventKind {
        &self.kind
    }
}

impl DomainEvent for BookingEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use classbook_core::event::Correlation;

    use super::*;

    #[test]
    fn test_event_type_follows_payload_variant() {
        // Arrange
        let class_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let metadata = EventMetadata::new(
            CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE,
            class_id,
            3,
            Correlation::new(Uuid::new_v4()),
            now,
        );

        // Act
        let event = BookingEvent::new(
            metadata,
            BookingEventKind::ClassSpotBecameAvailable(ClassSpotBecameAvailable {
                class_id,
                vacated_booking_id: None,
            }),
        );

        // Assert
        assert_eq!(event.event_type(), CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE);
        assert_eq!(event.metadata().aggregate_id(), class_id);
    }

    #[test]
    fn test_payload_serializes_variant_fields() {
        let booking_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let class_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let event = BookingEvent::new(
            EventMetadata::new(
                BOOKING_CANCELLED_EVENT_TYPE,
                booking_id,
                2,
                Correlation::new(Uuid::new_v4()),
                now,
            ),
            BookingEventKind::BookingCancelled(BookingCancelled {
                booking_id,
                member_id,
                class_id,
                reason: Some("injured".to_owned()),
            }),
        );

        let payload = event.to_payload();

        assert_eq!(payload["BookingCancelled"]["reason"], "injured");
        assert_eq!(
            payload["BookingCancelled"]["booking_id"],
            booking_id.to_string()
        );
    }
}
