//! Shared application state and bootstrap.

use std::sync::Arc;

use classbook_booking::application::command_handlers::{self, BookingCommandResult};
use classbook_booking::application::context::{BookingDispatcher, BookingPorts};
use classbook_booking::application::reaction_handlers::register_reactions;
use classbook_booking::domain::commands::{
    BookClass, CancelBooking, CompleteBooking, DeactivateMember, JoinWaitlist, RegisterMember,
    ScheduleClass,
};
use classbook_booking::domain::errors::BookingError;
use classbook_booking::domain::events::{
    BOOKING_CANCELLED_EVENT_TYPE, CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE,
};
use classbook_booking::domain::policy::BookingPolicy;
use classbook_core::clock::{Clock, SystemClock};
use classbook_core::notification::Notifier;
use classbook_store::in_memory_ports;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::notifier::LoggingNotifier;
use crate::telemetry::init_tracing;

/// Builds a dispatcher with the booking reactions registered.
///
/// The result is still mutable so callers can append their own handlers
/// before handing it to [`AppState::from_parts`].
#[must_use]
pub fn build_dispatcher(config: &AppConfig, ports: &BookingPorts) -> BookingDispatcher {
    let mut dispatcher = BookingDispatcher::with_max_events(config.max_dispatch_events);
    register_reactions(&mut dispatcher, ports, config.booking_policy());
    dispatcher
}

/// Application state shared by every request.
///
/// The dispatcher sits behind an `Arc`, so its registrations are frozen
/// once the state exists.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Repositories, clock, and notifier.
    pub ports: BookingPorts,
    /// Booking rules.
    pub policy: BookingPolicy,
    /// Frozen dispatcher.
    pub dispatcher: Arc<BookingDispatcher>,
}

impl AppState {
    /// Create state from `ports` with the standard reactions.
    #[must_use]
    pub fn new(config: &AppConfig, ports: BookingPorts) -> Self {
        let dispatcher = build_dispatcher(config, &ports);
        Self::from_parts(ports, config.booking_policy(), dispatcher)
    }

    /// Create state backed by fresh in-memory stores.
    #[must_use]
    pub fn in_memory(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(config, in_memory_ports(clock, notifier))
    }

    /// Create state from an already-built dispatcher.
    #[must_use]
    pub fn from_parts(
        ports: BookingPorts,
        policy: BookingPolicy,
        dispatcher: BookingDispatcher,
    ) -> Self {
        tracing::info!(
            cancellation_handlers = dispatcher.handler_count(BOOKING_CANCELLED_EVENT_TYPE),
            spot_handlers = dispatcher.handler_count(CLASS_SPOT_BECAME_AVAILABLE_EVENT_TYPE),
            max_events = dispatcher.max_events(),
            "dispatcher ready"
        );
        Self {
            ports,
            policy,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Reads configuration from the environment, installs tracing, and
    /// builds in-memory state with the system clock and a logging notifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for invalid configuration and
    /// `AppError::Telemetry` if tracing was already initialized.
    pub fn bootstrap() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        init_tracing(config.log_format)?;
        tracing::info!(?config, "starting classbook");
        Ok(Self::in_memory(
            &config,
            Arc::new(SystemClock),
            Arc::new(LoggingNotifier),
        ))
    }

    /// Registers a member.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_register_member`].
    pub async fn register_member(
        &self,
        command: &RegisterMember,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_register_member(command, &self.ports, &self.dispatcher).await
    }

    /// Schedules a class.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_schedule_class`].
    pub async fn schedule_class(
        &self,
        command: &ScheduleClass,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_schedule_class(command, &self.ports, &self.dispatcher).await
    }

    /// Books a class.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_book_class`].
    pub async fn book_class(
        &self,
        command: &BookClass,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_book_class(command, &self.ports, &self.policy, &self.dispatcher)
            .await
    }

    /// Cancels a booking.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_cancel_booking`].
    pub async fn cancel_booking(
        &self,
        command: &CancelBooking,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_cancel_booking(
            command,
            &self.ports,
            &self.policy,
            &self.dispatcher,
        )
        .await
    }

    /// Marks a booking completed.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_complete_booking`].
    pub async fn complete_booking(
        &self,
        command: &CompleteBooking,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_complete_booking(command, &self.ports, &self.dispatcher).await
    }

    /// Queues a member for a full class.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_join_waitlist`].
    pub async fn join_waitlist(
        &self,
        command: &JoinWaitlist,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_join_waitlist(command, &self.ports, &self.dispatcher).await
    }

    /// Deactivates a member.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_deactivate_member`].
    pub async fn deactivate_member(
        &self,
        command: &DeactivateMember,
    ) -> Result<BookingCommandResult, BookingError> {
        command_handlers::handle_deactivate_member(command, &self.ports, &self.dispatcher).await
    }
}
