//! Synchronous in-process event dispatch.
//!
//! The dispatcher is a registration table from event type to an ordered list
//! of reaction handlers. Dispatch runs every handler inline on the caller's
//! task, in registration order, and stops at the first failure. There is no
//! retry, isolation, or durable queue.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Default cap on events delivered by a single [`EventDispatcher::dispatch`].
pub const DEFAULT_MAX_DISPATCH_EVENTS: usize = 256;

/// A reaction handler invoked by the dispatcher.
///
/// A handler returns the events drained from the aggregates it mutated.
/// Those follow-up events are queued behind the events already being
/// dispatched rather than dispatched recursively.
#[async_trait]
pub trait EventHandler<E, Err>: Send + Sync {
    /// Stable handler name used in logs.
    fn name(&self) -> &'static str;

    /// Reacts to `event`.
    async fn handle(&self, event: &E) -> Result<Vec<E>, Err>;
}

/// Registration table plus synchronous fan-out.
///
/// Registration takes `&mut self`. Once bootstrap moves the dispatcher behind
/// an `Arc`, no further handlers can be registered.
pub struct EventDispatcher<E, Err> {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler<E, Err>>>>,
    max_events: usize,
}

impl<E, Err> EventDispatcher<E, Err>
where
    E: DomainEvent,
    Err: From<DomainError> + fmt::Display + Send,
{
    /// Creates an empty dispatcher with the default event cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_events(DEFAULT_MAX_DISPATCH_EVENTS)
    }

    /// Creates an empty dispatcher that delivers at most `max_events` events
    /// per dispatch call, follow-ups included.
    #[must_use]
    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            max_events,
        }
    }

    /// Appends `handler` to the list for `event_type`.
    pub fn register(&mut self, event_type: &'static str, handler: Arc<dyn EventHandler<E, Err>>) {
        tracing::debug!(event_type, handler = handler.name(), "registering event handler");
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Number of handlers registered for `event_type`.
    #[must_use]
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// The configured per-dispatch event cap.
    #[must_use]
    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Delivers `events` in order to their registered handlers.
    ///
    /// Events with no registered handler are skipped silently. Follow-up
    /// events returned by handlers are delivered after every input event.
    ///
    /// # Errors
    ///
    /// Returns the first handler error unchanged, or
    /// `DomainError::ReactionLimitExceeded` if the chain delivers more than
    /// `max_events` events.
    pub async fn dispatch(&self, events: Vec<E>) -> Result<(), Err> {
        let mut queue: VecDeque<E> = events.into();
        let mut delivered = 0usize;

        while let Some(event) = queue.pop_front() {
            if delivered == self.max_events {
                tracing::error!(
                    limit = self.max_events,
                    pending = queue.len() + 1,
                    "reaction chain exceeded dispatch limit"
                );
                return Err(DomainError::ReactionLimitExceeded {
                    limit: self.max_events,
                }
                .into());
            }
            delivered += 1;

            let event_type = event.event_type();
            let Some(handlers) = self.handlers.get(event_type) else {
                tracing::trace!(event_type, "no handlers registered");
                continue;
            };

            for handler in handlers {
                tracing::debug!(
                    event_type,
                    event_id = %event.metadata().event_id(),
                    handler = handler.name(),
                    payload = %event.to_payload(),
                    "dispatching event"
                );
                let follow_ups = handler.handle(&event).await.inspect_err(|err| {
                    tracing::error!(
                        event_type,
                        event_id = %event.metadata().event_id(),
                        handler = handler.name(),
                        error = %err,
                        "event handler failed, aborting dispatch"
                    );
                })?;
                queue.extend(follow_ups);
            }
        }

        Ok(())
    }
}

impl<E, Err> Default for EventDispatcher<E, Err>
where
    E: DomainEvent,
    Err: From<DomainError> + fmt::Display + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, Err> fmt::Debug for EventDispatcher<E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registrations: HashMap<&str, Vec<&str>> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.iter().map(|h| h.name()).collect()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &registrations)
            .field("max_events", &self.max_events)
            .finish()
    }
}
