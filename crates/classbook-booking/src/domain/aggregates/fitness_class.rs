//! The fitness class aggregate: capacity and occupancy.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use classbook_core::aggregate::{AggregateRoot, EventBuffer};
use classbook_core::clock::Clock;
use classbook_core::event::{Correlation, EventMetadata};
use uuid::Uuid;

use crate::domain::errors::BookingError;
use crate::domain::events::{
    BookingEvent, BookingEventKind, ClassScheduled, ClassSpotBecameAvailable, SpotReserved,
};

/// The aggregate root for a scheduled class.
///
/// Occupancy is the number of booked members and always stays within
/// `[0, capacity]`.
#[derive(Debug, Clone)]
pub struct FitnessClass {
    id: Uuid,
    version: i64,
    name: String,
    capacity: u32,
    starts_at: DateTime<Utc>,
    booked_members: HashSet<Uuid>,
    pending: EventBuffer<BookingEvent>,
}

impl FitnessClass {
    /// Schedules a class, producing a `ClassScheduled` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidCapacity` when `capacity` is zero.
    pub fn schedule(
        id: Uuid,
        name: impl Into<String>,
        capacity: u32,
        starts_at: DateTime<Utc>,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<Self, BookingError> {
        if capacity == 0 {
            return Err(BookingError::InvalidCapacity(capacity));
        }
        let mut class = Self {
            id,
            version: 0,
            name: name.into(),
            capacity,
            starts_at,
            booked_members: HashSet::new(),
            pending: EventBuffer::new(),
        };
        let kind = BookingEventKind::ClassScheduled(ClassScheduled {
            class_id: id,
            name: class.name.clone(),
            capacity,
            starts_at,
        });
        class.record(kind, correlation, clock);
        Ok(class)
    }

    /// Rebuilds a class from persisted state without recording events.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidCapacity` if the stored state breaks
    /// the capacity invariants.
    pub fn reconstitute(
        id: Uuid,
        version: i64,
        name: String,
        capacity: u32,
        starts_at: DateTime<Utc>,
        booked_members: HashSet<Uuid>,
    ) -> Result<Self, BookingError> {
        if capacity == 0 || booked_members.len() > capacity as usize {
            return Err(BookingError::InvalidCapacity(capacity));
        }
        Ok(Self {
            id,
            version,
            name,
            capacity,
            starts_at,
            booked_members,
            pending: EventBuffer::new(),
        })
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of booked members.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Class start time.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Current number of booked members.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn occupancy(&self) -> u32 {
        // Bounded by `capacity`, which is a u32.
        self.booked_members.len() as u32
    }

    /// Whether at least one spot is free.
    #[must_use]
    pub fn has_available_spot(&self) -> bool {
        self.occupancy() < self.capacity
    }

    /// Whether `member_id` holds a spot.
    #[must_use]
    pub fn is_booked(&self, member_id: Uuid) -> bool {
        self.booked_members.contains(&member_id)
    }

    /// Members holding a spot, in no particular order.
    #[must_use]
    pub fn booked_members(&self) -> &HashSet<Uuid> {
        &self.booked_members
    }

    /// Reserves a spot for `member_id`, producing a `SpotReserved` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::ClassFull` when occupancy equals capacity and
    /// `BookingError::AlreadyBooked` when the member already holds a spot.
    pub fn add_booking(
        &mut self,
        member_id: Uuid,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        if !self.has_available_spot() {
            return Err(BookingError::ClassFull {
                class_id: self.id,
                capacity: self.capacity,
            });
        }
        if self.is_booked(member_id) {
            return Err(BookingError::AlreadyBooked {
                class_id: self.id,
                member_id,
            });
        }

        self.booked_members.insert(member_id);
        let kind = BookingEventKind::SpotReserved(SpotReserved {
            class_id: self.id,
            member_id,
            occupancy: self.occupancy(),
        });
        self.record(kind, correlation, clock);
        Ok(())
    }

    /// Frees the spot held by `member_id`, producing a
    /// `ClassSpotBecameAvailable` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotBooked` when the member holds no spot.
    pub fn remove_booking(
        &mut self,
        member_id: Uuid,
        vacated_booking_id: Option<Uuid>,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        if !self.booked_members.remove(&member_id) {
            return Err(BookingError::NotBooked {
                class_id: self.id,
                member_id,
            });
        }

        let kind = BookingEventKind::ClassSpotBecameAvailable(ClassSpotBecameAvailable {
            class_id: self.id,
            vacated_booking_id,
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

impl AggregateRoot for FitnessClass {
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
