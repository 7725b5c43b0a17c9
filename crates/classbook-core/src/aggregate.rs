//! Aggregate root abstraction and the pending-event buffer it owns.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Append-only list of events recorded by an aggregate during mutation.
///
/// Each aggregate keeps its buffer private; outside code only ever sees
/// copies of its contents.
#[derive(Debug, Clone)]
pub struct EventBuffer<E> {
    events: Vec<E>,
}

impl<E: Clone> EventBuffer<E> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event.
    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    /// Returns a copy of the buffered events in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<E> {
        self.events.clone()
    }

    /// Removes and returns every buffered event.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    /// Empties the buffer. Clearing an empty buffer is a no-op.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E: Clone> Default for EventBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for aggregate roots that record domain events while they mutate.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the persisted version (number of successful saves).
    fn version(&self) -> i64;

    /// Records the version assigned by the repository after a successful save.
    fn mark_persisted(&mut self, version: i64);

    /// Returns a copy of the events recorded since the last clear.
    fn pending_events(&self) -> Vec<Self::Event>;

    /// Empties the pending-event buffer.
    fn clear_pending_events(&mut self);

    /// Drains the pending events: returns them and leaves the buffer empty.
    fn take_pending_events(&mut self) -> Vec<Self::Event> {
        let events = self.pending_events();
        self.clear_pending_events();
        events
    }
}
