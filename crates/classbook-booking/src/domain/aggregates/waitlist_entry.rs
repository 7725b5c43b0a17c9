//! The waitlist entry aggregate.

use chrono::{DateTime, Utc};
use classbook_core::aggregate::{AggregateRoot, EventBuffer};
use classbook_core::clock::Clock;
use classbook_core::event::{Correlation, EventMetadata};
use uuid::Uuid;

use crate::domain::events::{
    BookingEvent, BookingEventKind, MemberJoinedWaitlist, WaitlistEntryDiscarded,
    WaitlistEntryPromoted,
};

/// A member queued for a full class.
///
/// Queue order is `created_at` ascending; the repository breaks ties by
/// insertion order.
#[derive(Debug, Clone)]
pub struct WaitlistEntry {
    id: Uuid,
    version: i64,
    member_id: Uuid,
    class_id: Uuid,
    created_at: DateTime<Utc>,
    pending: EventBuffer<BookingEvent>,
}

impl WaitlistEntry {
    /// Queues a member, producing a `MemberJoinedWaitlist` event.
    #[must_use]
    pub fn join(
        id: Uuid,
        member_id: Uuid,
        class_id: Uuid,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Self {
        let mut entry = Self {
            id,
            version: 0,
            member_id,
            class_id,
            created_at: clock.now(),
            pending: EventBuffer::new(),
        };
        let kind = BookingEventKind::MemberJoinedWaitlist(MemberJoinedWaitlist {
            entry_id: id,
            member_id,
            class_id,
        });
        entry.record(kind, correlation, clock);
        entry
    }

    /// Rebuilds an entry from persisted state without recording events.
    #[must_use]
    pub fn reconstitute(
        id: Uuid,
        version: i64,
        member_id: Uuid,
        class_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            version,
            member_id,
            class_id,
            created_at,
            pending: EventBuffer::new(),
        }
    }

    /// The queued member.
    #[must_use]
    pub fn member_id(&self) -> Uuid {
        self.member_id
    }

    /// The class being queued for.
    #[must_use]
    pub fn class_id(&self) -> Uuid {
        self.class_id
    }

    /// When the member joined the queue.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records that the entry was turned into `booking_id`.
    pub fn promote(&mut self, booking_id: Uuid, correlation: Correlation, clock: &dyn Clock) {
        let kind = BookingEventKind::WaitlistEntryPromoted(WaitlistEntryPromoted {
            entry_id: self.id,
            member_id: self.member_id,
            class_id: self.class_id,
            booking_id,
        });
        self.record(kind, correlation, clock);
    }

    /// Records that the entry was dropped without promotion.
    pub fn discard(&mut self, reason: &str, correlation: Correlation, clock: &dyn Clock) {
        let kind = BookingEventKind::WaitlistEntryDiscarded(WaitlistEntryDiscarded {
            entry_id: self.id,
            member_id: self.member_id,
            class_id: self.class_id,
            reason: reason.to_owned(),
        });
        self.record(kind, correlation, clock);
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

impl AggregateRoot for WaitlistEntry {
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

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use classbook_core::event::DomainEvent;
    use classbook_test_support::FixedClock;

    use super::*;
    use crate::domain::events::{
        MEMBER_JOINED_WAITLIST_EVENT_TYPE, WAITLIST_ENTRY_PROMOTED_EVENT_TYPE,
    };

    #[test]
    fn test_join_stamps_creation_time_from_clock() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        let entry = WaitlistEntry::join(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Correlation::new(Uuid::new_v4()),
            &FixedClock(now),
        );

        assert_eq!(entry.created_at(), now);
        let events = entry.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), MEMBER_JOINED_WAITLIST_EVENT_TYPE);
    }

    #[test]
    fn test_promote_sequences_after_join() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let booking_id = Uuid::new_v4();
        let mut entry = WaitlistEntry::join(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Correlation::new(Uuid::new_v4()),
            &FixedClock(now),
        );

        entry.promote(booking_id, Correlation::new(Uuid::new_v4()), &FixedClock(now));

        let events = entry.pending_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type(), WAITLIST_ENTRY_PROMOTED_EVENT_TYPE);
        assert_eq!(events[1].metadata().sequence_number(), 2);
    }
}
