//! Command handlers for the class booking context.
//!
//! Each handler orchestrates one use case: load aggregates through the
//! ports, call the aggregate methods, persist, notify, then drain the
//! aggregates' events and hand them to the dispatcher.

use classbook_core::aggregate::AggregateRoot;
use classbook_core::error::DomainError;
use classbook_core::event::{Correlation, DomainEvent};
use classbook_core::notification::{Notification, notify_best_effort};
use classbook_core::repository::{SortOrder, load_required};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::context::{BookingDispatcher, BookingPorts};
use crate::domain::aggregates::{Booking, FitnessClass, Member, WaitlistEntry};
use crate::domain::commands::{
    BookClass, CancelBooking, CompleteBooking, DeactivateMember, JoinWaitlist, RegisterMember,
    ScheduleClass,
};
use crate::domain::errors::BookingError;
use crate::domain::events::BookingEvent;
use crate::domain::policy::BookingPolicy;
use crate::domain::ports::{
    BOOKING, BOOKING_CANCELLED_NOTIFICATION, BOOKING_CONFIRMED_NOTIFICATION, FITNESS_CLASS, MEMBER,
};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct BookingCommandResult {
    /// The aggregate created or targeted by the command.
    pub aggregate_id: Uuid,
    /// IDs of the events the command produced directly, in dispatch order.
    /// Events produced by reaction handlers are not included.
    pub event_ids: Vec<Uuid>,
}

/// Dispatches `events` and builds the command result.
async fn publish(
    aggregate_id: Uuid,
    events: Vec<BookingEvent>,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let event_ids = events.iter().map(|e| e.metadata().event_id()).collect();
    dispatcher.dispatch(events).await?;
    Ok(BookingCommandResult {
        aggregate_id,
        event_ids,
    })
}

/// Handles the `RegisterMember` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the member id is taken, or any
/// persistence or dispatch failure.
#[instrument(skip(command, ports, dispatcher), fields(member_id = %command.member_id))]
pub async fn handle_register_member(
    command: &RegisterMember,
    ports: &BookingPorts,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    if ports.members.get_by_id(command.member_id).await?.is_some() {
        return Err(DomainError::Validation(format!(
            "member {} is already registered",
            command.member_id
        ))
        .into());
    }

    let mut member = Member::register(
        command.member_id,
        command.name.clone(),
        command.tier,
        command.initial_credits,
        Correlation::new(command.correlation_id),
        ports.clock.as_ref(),
    );
    ports.members.save(&mut member).await?;
    info!(credits = member.credits(), "member registered");

    publish(command.member_id, member.take_pending_events(), dispatcher).await
}

/// Handles the `ScheduleClass` command.
///
/// # Errors
///
/// Returns `BookingError::InvalidCapacity` for a zero capacity,
/// `DomainError::Validation` if the class id is taken, or any persistence
/// or dispatch failure.
#[instrument(skip(command, ports, dispatcher), fields(class_id = %command.class_id))]
pub async fn handle_schedule_class(
    command: &ScheduleClass,
    ports: &BookingPorts,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    if ports.classes.get_by_id(command.class_id).await?.is_some() {
        return Err(DomainError::Validation(format!(
            "class {} is already scheduled",
            command.class_id
        ))
        .into());
    }

    let mut class = FitnessClass::schedule(
        command.class_id,
        command.name.clone(),
        command.capacity,
        command.starts_at,
        Correlation::new(command.correlation_id),
        ports.clock.as_ref(),
    )?;
    ports.classes.save(&mut class).await?;
    info!(capacity = class.capacity(), "class scheduled");

    publish(command.class_id, class.take_pending_events(), dispatcher).await
}

/// Handles the `BookClass` command: reserves a spot, charges the member,
/// and creates a confirmed booking.
///
/// The class is saved first, so a conflicting booking stops the command
/// before the member is charged. Events are dispatched in the order member,
/// class, booking.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown member or class,
/// the rule violation raised by the aggregates (`MemberInactive`,
/// `InsufficientCredits`, `ClassFull`, `AlreadyBooked`), or any persistence
/// or dispatch failure.
#[instrument(
    skip(command, ports, policy, dispatcher),
    fields(booking_id = %command.booking_id, member_id = %command.member_id, class_id = %command.class_id)
)]
pub async fn handle_book_class(
    command: &BookClass,
    ports: &BookingPorts,
    policy: &BookingPolicy,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let correlation = Correlation::new(command.correlation_id);
    let clock = ports.clock.as_ref();

    let mut member: Member =
        load_required(ports.members.as_ref(), command.member_id, MEMBER).await?;
    let mut class: FitnessClass =
        load_required(ports.classes.as_ref(), command.class_id, FITNESS_CLASS).await?;

    class.add_booking(command.member_id, correlation, clock)?;
    member.deduct_credits(policy.credits_per_booking, correlation, clock)?;
    let mut booking = Booking::confirm(
        command.booking_id,
        command.member_id,
        command.class_id,
        correlation,
        clock,
    );

    ports.classes.save(&mut class).await?;
    ports.members.save(&mut member).await?;
    ports.bookings.save(&mut booking).await?;
    info!(
        occupancy = class.occupancy(),
        credits = member.credits(),
        "class booked"
    );

    notify_best_effort(
        ports.notifier.as_ref(),
        Notification {
            kind: BOOKING_CONFIRMED_NOTIFICATION,
            recipient: command.member_id,
            payload: serde_json::json!({
                "booking_id": command.booking_id,
                "class_id": command.class_id,
                "class_name": class.name(),
                "starts_at": class.starts_at(),
            }),
        },
    )
    .await;

    let mut events = member.take_pending_events();
    events.extend(class.take_pending_events());
    events.extend(booking.take_pending_events());
    publish(command.booking_id, events, dispatcher).await
}

/// Handles the `CancelBooking` command: cancels the booking subject to the
/// cancellation window and frees the class spot.
///
/// The refund and any waitlist promotion happen in reaction handlers
/// triggered by the dispatched `BookingCancelled` and
/// `ClassSpotBecameAvailable` events.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown booking or class,
/// `AlreadyCancelled`, `InvalidStatusTransition`, or
/// `CancellationWindowClosed` from the booking, or any persistence or
/// dispatch failure (including a failed reaction).
#[instrument(skip(command, ports, policy, dispatcher), fields(booking_id = %command.booking_id))]
pub async fn handle_cancel_booking(
    command: &CancelBooking,
    ports: &BookingPorts,
    policy: &BookingPolicy,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let correlation = Correlation::new(command.correlation_id);
    let clock = ports.clock.as_ref();

    let mut booking: Booking =
        load_required(ports.bookings.as_ref(), command.booking_id, BOOKING).await?;
    let mut class: FitnessClass =
        load_required(ports.classes.as_ref(), booking.class_id(), FITNESS_CLASS).await?;

    booking.cancel(
        class.starts_at(),
        command.reason.clone(),
        policy.cancellation_lead_time,
        correlation,
        clock,
    )?;
    class.remove_booking(
        booking.member_id(),
        Some(command.booking_id),
        correlation,
        clock,
    )?;

    ports.bookings.save(&mut booking).await?;
    ports.classes.save(&mut class).await?;
    info!(
        class_id = %class.aggregate_id(),
        occupancy = class.occupancy(),
        "booking cancelled"
    );

    notify_best_effort(
        ports.notifier.as_ref(),
        Notification {
            kind: BOOKING_CANCELLED_NOTIFICATION,
            recipient: booking.member_id(),
            payload: serde_json::json!({
                "booking_id": command.booking_id,
                "class_id": class.aggregate_id(),
                "reason": command.reason,
            }),
        },
    )
    .await;

    let mut events = booking.take_pending_events();
    events.extend(class.take_pending_events());
    publish(command.booking_id, events, dispatcher).await
}

/// Handles the `CompleteBooking` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown booking,
/// `InvalidStatusTransition` unless the booking is confirmed, or any
/// persistence or dispatch failure.
#[instrument(skip(command, ports, dispatcher), fields(booking_id = %command.booking_id))]
pub async fn handle_complete_booking(
    command: &CompleteBooking,
    ports: &BookingPorts,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let mut booking: Booking =
        load_required(ports.bookings.as_ref(), command.booking_id, BOOKING).await?;

    booking.complete(
        Correlation::new(command.correlation_id),
        ports.clock.as_ref(),
    )?;
    ports.bookings.save(&mut booking).await?;
    info!("booking completed");

    publish(command.booking_id, booking.take_pending_events(), dispatcher).await
}

/// Handles the `JoinWaitlist` command: queues an active member for a class
/// that is currently full.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown member or class,
/// `MemberInactive`, `AlreadyBooked`, `SpotsAvailable`, or
/// `AlreadyWaitlisted`, or any persistence or dispatch failure.
#[instrument(
    skip(command, ports, dispatcher),
    fields(entry_id = %command.entry_id, member_id = %command.member_id, class_id = %command.class_id)
)]
pub async fn handle_join_waitlist(
    command: &JoinWaitlist,
    ports: &BookingPorts,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let member: Member = load_required(ports.members.as_ref(), command.member_id, MEMBER).await?;
    let class: FitnessClass =
        load_required(ports.classes.as_ref(), command.class_id, FITNESS_CLASS).await?;

    if !member.is_active() {
        return Err(BookingError::MemberInactive(command.member_id));
    }
    if class.is_booked(command.member_id) {
        return Err(BookingError::AlreadyBooked {
            class_id: command.class_id,
            member_id: command.member_id,
        });
    }
    if class.has_available_spot() {
        return Err(BookingError::SpotsAvailable(command.class_id));
    }
    let queued = ports
        .waitlist
        .find_by_class(command.class_id, SortOrder::Ascending)
        .await?;
    if queued.iter().any(|e| e.member_id() == command.member_id) {
        return Err(BookingError::AlreadyWaitlisted {
            class_id: command.class_id,
            member_id: command.member_id,
        });
    }

    let mut entry = WaitlistEntry::join(
        command.entry_id,
        command.member_id,
        command.class_id,
        Correlation::new(command.correlation_id),
        ports.clock.as_ref(),
    );
    ports.waitlist.save(&mut entry).await?;
    info!(position = queued.len() + 1, "member joined waitlist");

    publish(command.entry_id, entry.take_pending_events(), dispatcher).await
}

/// Handles the `DeactivateMember` command. Existing bookings are kept.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown member,
/// `MemberInactive` if already deactivated, or any persistence or dispatch
/// failure.
#[instrument(skip(command, ports, dispatcher), fields(member_id = %command.member_id))]
pub async fn handle_deactivate_member(
    command: &DeactivateMember,
    ports: &BookingPorts,
    dispatcher: &BookingDispatcher,
) -> Result<BookingCommandResult, BookingError> {
    let mut member: Member =
        load_required(ports.members.as_ref(), command.member_id, MEMBER).await?;

    member.deactivate(
        Correlation::new(command.correlation_id),
        ports.clock.as_ref(),
    )?;
    ports.members.save(&mut member).await?;
    info!("member deactivated");

    publish(command.member_id, member.take_pending_events(), dispatcher).await
}
