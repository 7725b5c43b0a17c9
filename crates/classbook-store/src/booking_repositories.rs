//! Booking-specific query ports over [`InMemoryRepository`].

use async_trait::async_trait;
use classbook_booking::domain::aggregates::{Booking, WaitlistEntry};
use classbook_booking::domain::ports::{BookingRepository, WAITLIST_ENTRY, WaitlistRepository};
use classbook_core::error::DomainError;
use classbook_core::repository::SortOrder;
use tracing::debug;
use uuid::Uuid;

use crate::in_memory_repository::InMemoryRepository;

#[async_trait]
impl BookingRepository for InMemoryRepository<Booking> {
    async fn find_by_class(
        &self,
        class_id: Uuid,
        order: SortOrder,
    ) -> Result<Vec<Booking>, DomainError> {
        self.query(|b| b.class_id() == class_id, Booking::booked_at, order)
    }
}

#[async_trait]
impl WaitlistRepository for InMemoryRepository<WaitlistEntry> {
    async fn find_by_class(
        &self,
        class_id: Uuid,
        order: SortOrder,
    ) -> Result<Vec<WaitlistEntry>, DomainError> {
        self.query(
            |e| e.class_id() == class_id,
            WaitlistEntry::created_at,
            order,
        )
    }

    async fn remove(&self, entry_id: Uuid) -> Result<(), DomainError> {
        if !self.delete(entry_id)? {
            return Err(DomainError::not_found(WAITLIST_ENTRY, entry_id));
        }
        debug!(%entry_id, "waitlist entry removed");
        Ok(())
    }
}
