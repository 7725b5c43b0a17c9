//! Collaborators shared by every orchestrator in this context.

use std::fmt;
use std::sync::Arc;

use classbook_core::clock::Clock;
use classbook_core::dispatcher::EventDispatcher;
use classbook_core::notification::Notifier;

use crate::domain::errors::BookingError;
use crate::domain::events::BookingEvent;
use crate::domain::ports::{
    BookingRepository, FitnessClassRepository, MemberRepository, WaitlistRepository,
};

/// Dispatcher specialised for this context's events and errors.
pub type BookingDispatcher = EventDispatcher<BookingEvent, BookingError>;

/// Ports handed to use cases and reaction handlers.
#[derive(Clone)]
pub struct BookingPorts {
    /// Time source for event timestamps and the cancellation window.
    pub clock: Arc<dyn Clock>,
    /// Member persistence.
    pub members: Arc<MemberRepository>,
    /// Class persistence.
    pub classes: Arc<FitnessClassRepository>,
    /// Booking persistence.
    pub bookings: Arc<dyn BookingRepository>,
    /// Waitlist persistence.
    pub waitlist: Arc<dyn WaitlistRepository>,
    /// Outbound notifications.
    pub notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for BookingPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingPorts").finish_non_exhaustive()
    }
}
