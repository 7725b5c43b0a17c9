//! Aggregate roots for the class booking context.
//!
//! Aggregates reference one another by id only. Each records its own
//! events while mutating and exposes them through `AggregateRoot`.

mod booking;
mod fitness_class;
mod member;
mod waitlist_entry;

pub use booking::{Booking, BookingStatus};
pub use fitness_class::FitnessClass;
pub use member::{Member, MembershipTier};
pub use waitlist_entry::WaitlistEntry;
