//! Reaction handlers wired into the booking dispatcher.
//!
//! Handlers never re-enter a use case. Each one mutates aggregates
//! directly, persists them, and returns the drained events so the
//! dispatcher can queue them behind the event being handled.

use std::sync::Arc;

use async_trait::async_trait;
use classbook_core::aggregate::AggregateRoot;
use classbook_core::dispatcher::EventHandler;
use classbook_core::event::{Correlation, DomainEvent, EventMetadata};
use classbook_core::notification::{Notification, notify_best_effort};
use classbook_core::repository::{SortOrder, load_required};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::context::{BookingDispatcher, BookingPorts};
use crate::domain::aggregates::{Booking, FitnessClass, Member, WaitlistEntry};
use crate::domain::errors::BookingError;
use crate::domain::events::{
    BOOKING_CANCELLED_EVENT_TYPE, BookingEvent, BookingEventKind,
    CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE,
};
use crate::domain::policy::BookingPolicy;
use crate::domain::ports::{FITNESS_CLASS, MEMBER, WAITLIST_PROMOTED_NOTIFICATION};

/// Returns the member's credits when one of their bookings is cancelled.
#[derive(Debug)]
pub struct RefundCreditOnCancellation {
    ports: BookingPorts,
    policy: BookingPolicy,
}

impl RefundCreditOnCancellation {
    /// Creates the handler.
    #[must_use]
    pub fn new(ports: BookingPorts, policy: BookingPolicy) -> Self {
        Self { ports, policy }
    }
}

#[async_trait]
impl EventHandler<BookingEvent, BookingError> for RefundCreditOnCancellation {
    fn name(&self) -> &'static str {
        "refund_credit_on_cancellation"
    }

    async fn handle(&self, event: &BookingEvent) -> Result<Vec<BookingEvent>, BookingError> {
        let BookingEventKind::BookingCancelled(cancelled) = event.kind() else {
            return Ok(Vec::new());
        };

        let mut member: Member =
            load_required(self.ports.members.as_ref(), cancelled.member_id, MEMBER).await?;
        member.refund_credits(
            self.policy.credits_per_booking,
            Correlation::caused_by(event.metadata()),
            self.ports.clock.as_ref(),
        )?;
        self.ports.members.save(&mut member).await?;
        info!(
            member_id = %cancelled.member_id,
            booking_id = %cancelled.booking_id,
            credits = member.credits(),
            "credits refunded"
        );

        Ok(member.take_pending_events())
    }
}

/// What a single promotion attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// Nobody is queued for the class.
    NoWaitlist,
    /// The class has no free spot.
    NoSpot,
    /// The head entry pointed at a member who can no longer be promoted and
    /// was removed.
    DiscardedStaleEntry {
        /// The removed entry.
        entry_id: Uuid,
    },
    /// The head member lacks credits; the entry stays queued.
    InsufficientCredits {
        /// The retained entry.
        entry_id: Uuid,
    },
    /// The head member now holds a confirmed booking.
    Promoted {
        /// The new booking.
        booking_id: Uuid,
        /// The promoted member.
        member_id: Uuid,
    },
}

/// Promotes the earliest waitlisted member when a class spot frees up.
///
/// Handles at most one entry per triggering event.
#[derive(Debug)]
pub struct PromoteFromWaitlist {
    ports: BookingPorts,
    policy: BookingPolicy,
}

impl PromoteFromWaitlist {
    /// Creates the handler.
    #[must_use]
    pub fn new(ports: BookingPorts, policy: BookingPolicy) -> Self {
        Self { ports, policy }
    }

    /// Attempts to promote the head of `class_id`'s waitlist.
    ///
    /// Returns the outcome together with the events drained from every
    /// aggregate touched, in the order member, class, booking, entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the class is missing, the
    /// rule violation raised by an aggregate, or any persistence failure.
    pub async fn promote_next(
        &self,
        class_id: Uuid,
        cause: &EventMetadata,
    ) -> Result<(PromotionOutcome, Vec<BookingEvent>), BookingError> {
        let queued = self
            .ports
            .waitlist
            .find_by_class(class_id, SortOrder::Ascending)
            .await?;
        let Some(mut entry) = queued.into_iter().next() else {
            debug!(%class_id, "waitlist empty, nothing to promote");
            return Ok((PromotionOutcome::NoWaitlist, Vec::new()));
        };

        let mut class: FitnessClass =
            load_required(self.ports.classes.as_ref(), class_id, FITNESS_CLASS).await?;
        if !class.has_available_spot() {
            debug!(%class_id, "class still full, promotion skipped");
            return Ok((PromotionOutcome::NoSpot, Vec::new()));
        }

        let correlation = Correlation::caused_by(cause);
        let clock = self.ports.clock.as_ref();
        let entry_id = entry.aggregate_id();

        let member = self.ports.members.get_by_id(entry.member_id()).await?;
        let mut member = match member {
            None => return self.discard(entry, "member not found", correlation).await,
            Some(m) if !m.is_active() => {
                return self.discard(entry, "member deactivated", correlation).await;
            }
            Some(m) if class.is_booked(m.aggregate_id()) => {
                return self.discard(entry, "member already booked", correlation).await;
            }
            Some(m) => m,
        };

        if !member.has_credits(self.policy.credits_per_booking) {
            warn!(
                %class_id,
                %entry_id,
                member_id = %member.aggregate_id(),
                credits = member.credits(),
                "waitlisted member lacks credits, entry retained"
            );
            return Ok((PromotionOutcome::InsufficientCredits { entry_id }, Vec::new()));
        }

        let booking_id = Uuid::new_v4();
        member.deduct_credits(self.policy.credits_per_booking, correlation, clock)?;
        class.add_booking(member.aggregate_id(), correlation, clock)?;
        let mut booking = Booking::confirm(
            booking_id,
            member.aggregate_id(),
            class_id,
            correlation,
            clock,
        );
        entry.promote(booking_id, correlation, clock);

        self.ports.classes.save(&mut class).await?;
        self.ports.members.save(&mut member).await?;
        self.ports.bookings.save(&mut booking).await?;
        self.ports.waitlist.remove(entry_id).await?;
        info!(
            %class_id,
            %entry_id,
            %booking_id,
            member_id = %member.aggregate_id(),
            "waitlisted member promoted"
        );

        notify_best_effort(
            self.ports.notifier.as_ref(),
            Notification {
                kind: WAITLIST_PROMOTED_NOTIFICATION,
                recipient: member.aggregate_id(),
                payload: serde_json::json!({
                    "booking_id": booking_id,
                    "class_id": class_id,
                    "class_name": class.name(),
                    "starts_at": class.starts_at(),
                }),
            },
        )
        .await;

        let outcome = PromotionOutcome::Promoted {
            booking_id,
            member_id: member.aggregate_id(),
        };
        let mut events = member.take_pending_events();
        events.extend(class.take_pending_events());
        events.extend(booking.take_pending_events());
        events.extend(entry.take_pending_events());
        Ok((outcome, events))
    }

    async fn discard(
        &self,
        mut entry: WaitlistEntry,
        reason: &str,
        correlation: Correlation,
    ) -> Result<(PromotionOutcome, Vec<BookingEvent>), BookingError> {
        let entry_id = entry.aggregate_id();
        entry.discard(reason, correlation, self.ports.clock.as_ref());
        self.ports.waitlist.remove(entry_id).await?;
        warn!(
            class_id = %entry.class_id(),
            %entry_id,
            member_id = %entry.member_id(),
            reason,
            "discarded stale waitlist entry"
        );
        Ok((
            PromotionOutcome::DiscardedStaleEntry { entry_id },
            entry.take_pending_events(),
        ))
    }
}

#[async_trait]
impl EventHandler<BookingEvent, BookingError> for PromoteFromWaitlist {
    fn name(&self) -> &'static str {
        "promote_from_waitlist"
    }

    async fn handle(&self, event: &BookingEvent) -> Result<Vec<BookingEvent>, BookingError> {
        let BookingEventKind::ClassSpotBecameAvailable(available) = event.kind() else {
            return Ok(Vec::new());
        };
        let (outcome, events) = self.promote_next(available.class_id, event.metadata()).await?;
        debug!(event_id = %event.metadata().event_id(), ?outcome, "promotion attempted");
        Ok(events)
    }
}

/// Registers the booking reactions, refund first.
pub fn register_reactions(
    dispatcher: &mut BookingDispatcher,
    ports: &BookingPorts,
    policy: BookingPolicy,
) {
    dispatcher.register(
        BOOKING_CANCELLED_EVENT_TYPE,
        Arc::new(RefundCreditOnCancellation::new(ports.clone(), policy)),
    );
    dispatcher.register(
        CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE,
        Arc::new(PromoteFromWaitlist::new(ports.clone(), policy)),
    );
}
