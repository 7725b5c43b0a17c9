//! The member aggregate: identity, tier, and credit balance.

use classbook_core::aggregate::{AggregateRoot, EventBuffer};
use classbook_core::clock::Clock;
use classbook_core::event::{Correlation, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::BookingError;
use crate::domain::events::{
    BookingEvent, BookingEventKind, CreditsDeducted, CreditsRefunded, MemberDeactivated,
    MemberRegistered,
};

/// Membership level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipTier {
    /// Pay-per-class membership.
    Basic,
    /// Premium membership.
    Premium,
}

/// The aggregate root for a gym member.
#[derive(Debug, Clone)]
pub struct Member {
    id: Uuid,
    version: i64,
    name: String,
    tier: MembershipTier,
    credits: u32,
    active: bool,
    pending: EventBuffer<BookingEvent>,
}

impl Member {
    /// Registers a new member, producing a `MemberRegistered` event.
    #[must_use]
    pub fn register(
        id: Uuid,
        name: impl Into<String>,
        tier: MembershipTier,
        initial_credits: u32,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Self {
        let mut member = Self {
            id,
            version: 0,
            name: name.into(),
            tier,
            credits: initial_credits,
            active: true,
            pending: EventBuffer::new(),
        };
        let kind = BookingEventKind::MemberRegistered(MemberRegistered {
            member_id: id,
            name: member.name.clone(),
            tier,
            initial_credits,
        });
        member.record(kind, correlation, clock);
        member
    }

    /// Rebuilds a member from persisted state without recording events.
    #[must_use]
    pub fn reconstitute(
        id: Uuid,
        version: i64,
        name: String,
        tier: MembershipTier,
        credits: u32,
        active: bool,
    ) -> Self {
        Self {
            id,
            version,
            name,
            tier,
            credits,
            active,
            pending: EventBuffer::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Membership tier.
    #[must_use]
    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    /// Current credit balance.
    #[must_use]
    pub fn credits(&self) -> u32 {
        self.credits
    }

    /// Whether the member can still book.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the balance covers `amount`.
    #[must_use]
    pub fn has_credits(&self, amount: u32) -> bool {
        self.credits >= amount
    }

    /// Deducts credits, producing a `CreditsDeducted` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::MemberInactive` for a deactivated member and
    /// `BookingError::InsufficientCredits` when the balance is too low.
    pub fn deduct_credits(
        &mut self,
        amount: u32,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        if !self.active {
            return Err(BookingError::MemberInactive(self.id));
        }
        let Some(balance) = self.credits.checked_sub(amount) else {
            return Err(BookingError::InsufficientCredits {
                member_id: self.id,
                required: amount,
                available: self.credits,
            });
        };

        self.credits = balance;
        let kind = BookingEventKind::CreditsDeducted(CreditsDeducted {
            member_id: self.id,
            amount,
            balance,
        });
        self.record(kind, correlation, clock);
        Ok(())
    }

    /// Returns credits to the balance, producing a `CreditsRefunded` event.
    /// Refunds are accepted for inactive members too.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::CreditOverflow` if the new balance does not fit.
    pub fn refund_credits(
        &mut self,
        amount: u32,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        let Some(balance) = self.credits.checked_add(amount) else {
            return Err(BookingError::CreditOverflow {
                member_id: self.id,
                amount,
                available: self.credits,
            });
        };

        self.credits = balance;
        let kind = BookingEventKind::CreditsRefunded(CreditsRefunded {
            member_id: self.id,
            amount,
            balance,
        });
        self.record(kind, correlation, clock);
        Ok(())
    }

    /// Deactivates the member, producing a `MemberDeactivated` event.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::MemberInactive` if already deactivated.
    pub fn deactivate(
        &mut self,
        correlation: Correlation,
        clock: &dyn Clock,
    ) -> Result<(), BookingError> {
        if !self.active {
            return Err(BookingError::MemberInactive(self.id));
        }
        self.active = false;
        let kind = BookingEventKind::MemberDeactivated(MemberDeactivated { member_id: self.id });
        self.record(kind, correlation, clock);
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn record(&mut self, kind: BookingEventKind, correlation: Correlation, clock: &dyn Clock) {
        let sequence_number = self.version + self.pending.len() as i64 + 1;
        let metadata = EventMetadata::new(
            kind.event_type(),
            self.id,
            sequence_number,
            correlation,
            clock.now(),
        );
        self.pending.record(BookingEvent::new(metadata, kind));
    }
}

impl AggregateRoot for Member {
    type Event = BookingEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn mark_persisted(&mut self, version: i64) {
        self.version = version;
    }

    fn pending_events(&self) -> Vec<Self::Event> {
        self.pending.snapshot()
    }

    fn clear_pending_events(&mut self) {
        self.pending.clear();
    }
}
