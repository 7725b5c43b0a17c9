//! Outbound ports required by the booking orchestrators.
//!
//! Persistence adapters implement these; the in-memory versions live in
//! `classbook-store`.

use async_trait::async_trait;
use classbook_core::error::DomainError;
use classbook_core::repository::{Repository, SortOrder};
use uuid::Uuid;

use super::aggregates::{Booking, FitnessClass, Member, WaitlistEntry};

/// Aggregate type names used in not-found errors.
pub const MEMBER: &str = "member";
/// See [`MEMBER`].
pub const FITNESS_CLASS: &str = "fitness class";
/// See [`MEMBER`].
pub const BOOKING: &str = "booking";
/// See [`MEMBER`].
pub const WAITLIST_ENTRY: &str = "waitlist entry";

/// Members are only ever loaded and saved.
pub type MemberRepository = dyn Repository<Member>;

/// Classes are only ever loaded and saved.
pub type FitnessClassRepository = dyn Repository<FitnessClass>;

/// Booking persistence.
#[async_trait]
pub trait BookingRepository: Repository<Booking> {
    /// All bookings for a class, ordered by booking time.
    async fn find_by_class(
        &self,
        class_id: Uuid,
        order: SortOrder,
    ) -> Result<Vec<Booking>, DomainError>;
}

/// Waitlist persistence.
#[async_trait]
pub trait WaitlistRepository: Repository<WaitlistEntry> {
    /// All entries for a class, ordered by creation time with ties broken
    /// by insertion order.
    async fn find_by_class(
        &self,
        class_id: Uuid,
        order: SortOrder,
    ) -> Result<Vec<WaitlistEntry>, DomainError>;

    /// Deletes an entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the entry does not exist.
    async fn remove(&self, entry_id: Uuid) -> Result<(), DomainError>;
}

/// Notification kind sent after a booking is made.
pub const BOOKING_CONFIRMED_NOTIFICATION: &str = "booking.confirmed";
/// Notification kind sent after a booking is cancelled.
pub const BOOKING_CANCELLED_NOTIFICATION: &str = "booking.cancelled";
/// Notification kind sent after a waitlisted member is promoted.
pub const WAITLIST_PROMOTED_NOTIFICATION: &str = "waitlist.promoted";
