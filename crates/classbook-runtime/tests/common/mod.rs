//! Shared test helpers for runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use classbook_booking::application::context::BookingDispatcher;
use classbook_booking::application::query_handlers::{self, ClassView, MemberView};
use classbook_booking::domain::aggregates::MembershipTier;
use classbook_booking::domain::commands::{
    BookClass, CancelBooking, DeactivateMember, JoinWaitlist, RegisterMember, ScheduleClass,
};
use classbook_booking::domain::errors::BookingError;
use classbook_core::clock::Clock;
use classbook_core::notification::Notifier;
use classbook_runtime::config::AppConfig;
use classbook_runtime::state::{AppState, build_dispatcher};
use classbook_store::in_memory_ports;
use classbook_test_support::{FixedClock, RecordingNotifier};
use uuid::Uuid;

/// Fixed "now" used across all integration tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(now()))
}

/// In-memory state plus the notifier it reports to.
pub struct TestApp {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build in-memory state with default configuration.
pub fn build_test_app() -> TestApp {
    build_test_app_with_config(&AppConfig::default())
}

/// Build in-memory state with a custom configuration.
pub fn build_test_app_with_config(config: &AppConfig) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::in_memory(config, fixed_clock(), notifier.clone());
    TestApp { state, notifier }
}

/// Build in-memory state whose notifier is `notifier`.
pub fn build_test_app_with_notifier(notifier: Arc<dyn Notifier>) -> AppState {
    AppState::in_memory(&AppConfig::default(), fixed_clock(), notifier)
}

/// Build in-memory state, letting `customize` append handlers after the
/// standard reactions.
pub fn build_test_app_with_handlers<F>(config: &AppConfig, customize: F) -> TestApp
where
    F: FnOnce(&mut BookingDispatcher),
{
    let notifier = Arc::new(RecordingNotifier::new());
    let ports = in_memory_ports(fixed_clock(), notifier.clone());
    let mut dispatcher = build_dispatcher(config, &ports);
    customize(&mut dispatcher);
    let state = AppState::from_parts(ports, config.booking_policy(), dispatcher);
    TestApp { state, notifier }
}

/// Register an active member holding `credits` and return its id.
pub async fn register_member(state: &AppState, credits: u32) -> Uuid {
    let member_id = Uuid::new_v4();
    state
        .register_member(&RegisterMember {
            correlation_id: Uuid::new_v4(),
            member_id,
            name: "Member".to_owned(),
            tier: MembershipTier::Basic,
            initial_credits: credits,
        })
        .await
        .unwrap();
    member_id
}

/// Schedule a class starting `starts_in` from now and return its id.
pub async fn schedule_class(state: &AppState, capacity: u32, starts_in: TimeDelta) -> Uuid {
    let class_id = Uuid::new_v4();
    state
        .schedule_class(&ScheduleClass {
            correlation_id: Uuid::new_v4(),
            class_id,
            name: "Spin".to_owned(),
            capacity,
            starts_at: now() + starts_in,
        })
        .await
        .unwrap();
    class_id
}

/// Attempt to book `member_id` into `class_id`; returns the booking id on
/// success.
pub async fn try_book(
    state: &AppState,
    member_id: Uuid,
    class_id: Uuid,
) -> Result<Uuid, BookingError> {
    let booking_id = Uuid::new_v4();
    state
        .book_class(&BookClass {
            correlation_id: Uuid::new_v4(),
            booking_id,
            member_id,
            class_id,
        })
        .await?;
    Ok(booking_id)
}

/// Book `member_id` into `class_id`, panicking on failure.
pub async fn book(state: &AppState, member_id: Uuid, class_id: Uuid) -> Uuid {
    try_book(state, member_id, class_id).await.unwrap()
}

/// Cancel a booking without a reason.
pub async fn cancel(state: &AppState, booking_id: Uuid) -> Result<(), BookingError> {
    state
        .cancel_booking(&CancelBooking {
            correlation_id: Uuid::new_v4(),
            booking_id,
            reason: None,
        })
        .await
        .map(|_| ())
}

/// Attempt to queue `member_id` for `class_id`; returns the entry id.
pub async fn try_join_waitlist(
    state: &AppState,
    member_id: Uuid,
    class_id: Uuid,
) -> Result<Uuid, BookingError> {
    let entry_id = Uuid::new_v4();
    state
        .join_waitlist(&JoinWaitlist {
            correlation_id: Uuid::new_v4(),
            entry_id,
            member_id,
            class_id,
        })
        .await?;
    Ok(entry_id)
}

/// Queue `member_id` for `class_id`, panicking on failure.
pub async fn join_waitlist(state: &AppState, member_id: Uuid, class_id: Uuid) -> Uuid {
    try_join_waitlist(state, member_id, class_id).await.unwrap()
}

/// Deactivate a member, panicking on failure.
pub async fn deactivate(state: &AppState, member_id: Uuid) {
    state
        .deactivate_member(&DeactivateMember {
            correlation_id: Uuid::new_v4(),
            member_id,
        })
        .await
        .unwrap();
}

/// Current view of a member.
pub async fn member(state: &AppState, member_id: Uuid) -> MemberView {
    query_handlers::get_member(member_id, state.ports.members.as_ref())
        .await
        .unwrap()
}

/// Current view of a class.
pub async fn class(state: &AppState, class_id: Uuid) -> ClassView {
    query_handlers::get_class(class_id, state.ports.classes.as_ref())
        .await
        .unwrap()
}

/// Member ids on a class's waitlist, in promotion order.
pub async fn waitlisted_members(state: &AppState, class_id: Uuid) -> Vec<Uuid> {
    query_handlers::list_waitlist(class_id, state.ports.waitlist.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|view| view.member_id)
        .collect()
}
