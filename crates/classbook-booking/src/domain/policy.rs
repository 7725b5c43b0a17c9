//! Booking policy parameters supplied by the composition root.

use chrono::TimeDelta;

/// Default minimum notice for a cancellation.
pub const DEFAULT_CANCELLATION_LEAD_TIME: TimeDelta = TimeDelta::hours(2);

/// Default credits charged per booking.
pub const DEFAULT_CREDITS_PER_BOOKING: u32 = 1;

/// Tunable booking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Bookings cannot be cancelled once the class is closer than this.
    pub cancellation_lead_time: TimeDelta,
    /// Credits charged when a booking is made and refunded on cancellation.
    pub credits_per_booking: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            cancellation_lead_time: DEFAULT_CANCELLATION_LEAD_TIME,
            credits_per_booking: DEFAULT_CREDITS_PER_BOOKING,
        }
    }
}
