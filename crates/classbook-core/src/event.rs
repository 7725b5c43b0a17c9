//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
///
/// Fields are private and there is no mutating API: once an event has been
/// constructed its metadata cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    event_id: Uuid,
    event_type: String,
    aggregate_id: Uuid,
    sequence_number: i64,
    correlation_id: Uuid,
    causation_id: Uuid,
    occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Creates metadata with a freshly generated event id.
    #[must_use]
    pub fn new(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation: Correlation,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id: correlation.correlation_id,
            causation_id: correlation.causation_id,
            occurred_at,
        }
    }

    /// Replaces the generated event id. Intended for deterministic tests only.
    #[must_use]
    pub fn with_event_id(mut self, event_id: Uuid) -> Self {
        self.event_id = event_id;
        self
    }

    /// Unique event identifier.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Type name used for dispatch routing.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Aggregate that recorded this event.
    #[must_use]
    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    /// Position of this event within the aggregate's history.
    #[must_use]
    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    /// Correlation ID for tracing a command through its effects.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// ID of the command or event that caused this event.
    #[must_use]
    pub fn causation_id(&self) -> Uuid {
        self.causation_id
    }

    /// When the event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Correlation and causation identifiers threaded into new events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    /// Correlation ID shared by every event of one external request.
    pub correlation_id: Uuid,
    /// ID of the command or event that directly caused the new event.
    pub causation_id: Uuid,
}

impl Correlation {
    /// Starts a new chain where the command is its own cause.
    #[must_use]
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            causation_id: correlation_id,
        }
    }

    /// Continues the chain of `cause`, marking it as the direct cause.
    #[must_use]
    pub fn caused_by(cause: &EventMetadata) -> Self {
        Self {
            correlation_id: cause.correlation_id,
            causation_id: cause.event_id,
        }
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + Clone + std::fmt::Debug {
    /// Returns the event type name (used for dispatch routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
