//! Classbook Core — shared domain abstractions.
//!
//! This crate defines the traits and types every bounded context depends
//! on: aggregates and their event buffers, domain events, the repository and
//! notification ports, and the synchronous event dispatcher. It contains no
//! infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod notification;
pub mod repository;
