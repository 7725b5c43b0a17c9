//! Domain layer: aggregates, events, commands, errors, policy, and ports.

pub mod aggregates;
pub mod commands;
pub mod errors;
pub mod events;
pub mod policy;
pub mod ports;
