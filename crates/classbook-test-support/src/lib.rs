//! Shared test doubles and utilities for Classbook.

mod clock;
mod handler;
mod notifier;

pub use clock::FixedClock;
pub use handler::{FailingHandler, HandlerLog, RecordingHandler};
pub use notifier::{FailingNotifier, RecordingNotifier};
