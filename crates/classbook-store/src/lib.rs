//! In-memory persistence adapters for Classbook.
//!
//! The store keeps the current state of each aggregate, not its event
//! history. Each `save` is atomic for one aggregate only; a use case that
//! touches several aggregates is not rolled back if a later save fails.

pub mod booking_repositories;
pub mod in_memory_repository;

use std::sync::Arc;

use classbook_booking::application::context::BookingPorts;
use classbook_booking::domain::aggregates::{Booking, FitnessClass, Member, WaitlistEntry};
use classbook_core::clock::Clock;
use classbook_core::notification::Notifier;

pub use in_memory_repository::InMemoryRepository;

/// Builds a full set of booking ports backed by fresh in-memory stores.
#[must_use]
pub fn in_memory_ports(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> BookingPorts {
    BookingPorts {
        clock,
        members: Arc::new(InMemoryRepository::<Member>::new()),
        classes: Arc::new(InMemoryRepository::<FitnessClass>::new()),
        bookings: Arc::new(InMemoryRepository::<Booking>::new()),
        waitlist: Arc::new(InMemoryRepository::<WaitlistEntry>::new()),
        notifier,
    }
}
