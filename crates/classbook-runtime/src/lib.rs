//! Classbook runtime: configuration, telemetry, and the composition root
//! that wires stores, notifier, and reaction handlers together.

pub mod config;
pub mod error;
pub mod notifier;
pub mod state;
pub mod telemetry;
