//! Classbook — class booking bounded context.
//!
//! Responsible for members and their credits, class capacity, bookings and
//! their cancellation window, and the FIFO waitlist that refills freed spots.

pub mod application;
pub mod domain;
