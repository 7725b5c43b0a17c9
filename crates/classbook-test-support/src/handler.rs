//! Test event handlers — `EventHandler` implementations for dispatcher tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use classbook_core::dispatcher::EventHandler;
use classbook_core::error::DomainError;
use classbook_core::event::DomainEvent;

/// Shared invocation log. Each entry reads `handler:event_type`.
pub type HandlerLog = Arc<Mutex<Vec<String>>>;

fn push(log: &HandlerLog, name: &str, event_type: &str) {
    log.lock().unwrap().push(format!("{name}:{event_type}"));
}

/// A handler that appends each invocation to a shared log and emits no
/// follow-up events.
#[derive(Debug, Clone)]
pub struct RecordingHandler {
    name: &'static str,
    log: HandlerLog,
}

impl RecordingHandler {
    /// Creates a handler writing to `log`.
    #[must_use]
    pub fn new(name: &'static str, log: &HandlerLog) -> Self {
        Self {
            name,
            log: Arc::clone(log),
        }
    }
}

#[async_trait]
impl<E, Err> EventHandler<E, Err> for RecordingHandler
where
    E: DomainEvent + 'static,
    Err: Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, event: &E) -> Result<Vec<E>, Err> {
        push(&self.log, self.name, event.event_type());
        Ok(Vec::new())
    }
}

/// A handler that logs its invocation and then fails with an
/// infrastructure error.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    name: &'static str,
    log: HandlerLog,
}

impl FailingHandler {
    /// Creates a failing handler writing to `log`.
    #[must_use]
    pub fn new(name: &'static str, log: &HandlerLog) -> Self {
        Self {
            name,
            log: Arc::clone(log),
        }
    }
}

#[async_trait]
impl<E, Err> EventHandler<E, Err> for FailingHandler
where
    E: DomainEvent + 'static,
    Err: From<DomainError> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, event: &E) -> Result<Vec<E>, Err> {
        push(&self.log, self.name, event.event_type());
        Err(DomainError::Infrastructure(format!("{} failed", self.name)).into())
    }
}
