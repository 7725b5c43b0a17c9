//! The booking aggregate and its cancellation window rule.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use classbook_core::aggregate::{AggregateRoot, EventBuffer};
use classbook_core::clock::Clock;
use classbook_core::event::{Correlation, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::BookingError;
use crate::domain::events::{
    BookingCancelled, BookingCompleted, BookingConfirmed, BookingEvent, BookingEventKind,
};

/// Lifecycle of a booking. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// The member holds a spot.
    Confirmed,
    /// The member gave the spot up.
    Cancelled,
    /// The class took place.
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// The aggregate root for a member's booking of a class.
///
/// A booking holds only the ids of its member and class. The class start
/// time is passed in by the caller when it matters.
#[derive(Debug, Clone)]
pub struct Booking {
    id: Uuid,
    version: i64,
    member_id: Uuid,
    class_id: Uuid,
    status: BookingStatus,
    booked_at: DateTime<Utc>,
    cancellation_reason: Option<String>,
    pending: EventBuffer<BookingEvent>,
}

impl Booking {
    /// Creates a confirmed booking, producing a `BookingConfirmed` event.
    #[must_use]
    pub fn confirm(
        id: Uuid,
        member_id: Uuid,
        class_id: Uuid,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Self {
        let mut booking = Self {
            id,
            version: 0,
            member_id,
            class_id,
            status: BookingStatus::Confirmed,
            booked_at: clock.now(),
            cancellation_reason: None,
            pending: EventBuffer::new(),
        };
        let kind = BookingEventKind::BookingConfirmed(BookingConfirmed {
            booking_id: id,
            member_id,
            class_id,
        });
        booking.record(kind, correlation, clock);
        booking
    }

    /// Rebuilds a booking from persisted state without recording events.
    #[must_use]
    pub fn reconstitute(
        id: Uuid,
        version: i64,
        member_id: Uuid,
        class_id: Uuid,
        status: BookingStatus,
        booked_at: DateTime<Utc>,
        cancellation_reason: Option<String>,
    ) -> Self {
        Self {
            id,
            version,
            member_id,
            class_id,
            status,
            booked_at,
            cancellation_reason,
            pending: EventBuffer::new(),
        }
    }

    /// The booked member.
    #[must_use]
    pub fn member_id(&self) -> Uuid {
        self.member_id
    }

    /// The booked class.
    #[must_use]
    pub fn class_id(&self) -> Uuid {
        self.class_id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// When the booking was made.
    #[must_use]
    pub fn booked_at(&self) -> DateTime<Utc> {
        self.booked_at
    }

    /// Reason given on cancellation, if any.
    #[must_use]
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Cancels the booking, producing a `BookingCancelled` event.
    ///
    /// Cancellation is allowed while at least `lead_time` remains before
    /// `class_starts_at`; exactly `lead_time` is still allowed.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::AlreadyCancelled` on a second cancel,
    /// `BookingError::InvalidStatusTransition` for a completed booking, and
    /// `BookingError::CancellationWindowClosed` when too close to start.
    pub fn cancel(
        &mut self,
        class_starts_at: DateTime<Utc>,
        reason: Option<String>,
        lead_time: TimeDelta,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        match self.status {
            BookingStatus::Confirmed => {}
            BookingStatus::Cancelled => return Err(BookingError::AlreadyCancelled(self.id)),
            BookingStatus::Completed => {
                return Err(BookingError::InvalidStatusTransition {
                    booking_id: self.id,
                    from: self.status,
                    to: BookingStatus::Cancelled,
                });
            }
        }

        let remaining = class_starts_at - clock.now();
        if remaining < lead_time {
            return Err(BookingError::cancellation_window_closed(
                self.id, remaining, lead_time,
            ));
        }

        self.status = BookingStatus::Cancelled;
        self.cancellation_reason.clone_from(&reason);
        let kind = BookingEventKind::BookingCancelled(BookingCancelled {
            booking_id: self.id,
            member_id: self.member_id,
            class_id: self.class_id,
            reason,
        });
        self.record(kind, correlation, clock);
        Ok(())
    }

    /// Marks an attended booking as completed, producing a
    /// `BookingCompleted` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidStatusTransition` unless confirmed.
    pub fn complete(
        &mut self,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        if self.status != BookingStatus::Confirmed {
            return Err(BookingError::InvalidStatusTransition {
                booking_id: self.id,
                from: self.status,
                to: BookingStatus::Completed,
            });
        }
        self.status = BookingStatus::Completed;
        let kind = BookingEventKind::BookingCompleted(BookingCompleted {
            booking_id: self.id,
            member_id: self.member_id,
            class_id: self.class_id,
        });
        self.record(kind, correlation, clock);
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn record(&mut self, kind: BookingEventKind, correlation: Correlation, clock: &dyn Clock) {
        let sequence_number = self.version + self.pending.len() as i64 + 1;
        let metadata = EventMetadata::new(
            kind.event_type(),
            self.id,
            sequence_number,
            correlation,
            clock.now(),
        );
        self.pending.record(BookingEvent::new(metadata, kind));
    }
}

impl AggregateRoot for Booking {
    type Event = BookingEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn mark_persisted(&mut self, version: i64) {
        self.version = version;
    }

    fn pending_events(&self) -> Vec<Self::Event> {
        self.pending.snapshot()
    }

    fn clear_pending_events(&mut self) {
        self.pending.clear();
    }
}
