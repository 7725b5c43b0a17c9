//! Integration tests for booking, cancellation, and completion.

mod common;

use std::sync::Arc;

use chrono::TimeDelta;
use classbook_booking::application::query_handlers;
use classbook_booking::domain::aggregates::{BookingStatus, MembershipTier};
use classbook_booking::domain::commands::{
    BookClass, CompleteBooking, RegisterMember, ScheduleClass,
};
use classbook_booking::domain::errors::{BookingError, ErrorKind};
use classbook_core::error::DomainError;
use classbook_test_support::FailingNotifier;
use uuid::Uuid;

#[tokio::test]
async fn test_book_then_cancel_refunds_credit_and_frees_spot() {
    // Arrange
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;
    let class_id = common::schedule_class(&app.state, 1, TimeDelta::hours(3)).await;

    // Act: book
    let booking_id = common::book(&app.state, member_id, class_id).await;

    // Assert
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 1);
    assert_eq!(common::member(&app.state, member_id).await.credits, 0);

    // Act: cancel three hours ahead with a two hour threshold
    common::cancel(&app.state, booking_id).await.unwrap();

    // Assert
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 0);
    assert_eq!(common::member(&app.state, member_id).await.credits, 1);
    let booking = query_handlers::get_booking(booking_id, app.state.ports.bookings.as_ref())
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(
        app.notifier.kinds(),
        vec!["booking.confirmed", "booking.cancelled"]
    );
}

#[tokio::test]
async fn test_book_class_returns_member_class_and_booking_events() {
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 2).await;
    let class_id = common::schedule_class(&app.state, 5, TimeDelta::days(1)).await;
    let booking_id = Uuid::new_v4();

    let result = app
        .state
        .book_class(&BookClass {
            correlation_id: Uuid::new_v4(),
            booking_id,
            member_id,
            class_id,
        })
        .await
        .unwrap();

    assert_eq!(result.aggregate_id, booking_id);
    assert_eq!(result.event_ids.len(), 3);
}

#[tokio::test]
async fn test_booking_full_class_fails_without_charging_member() {
    // Arrange
    let app = common::build_test_app();
    let class_id = common::schedule_class(&app.state, 1, TimeDelta::days(1)).await;
    let first = common::register_member(&app.state, 1).await;
    let second = common::register_member(&app.state, 1).await;
    common::book(&app.state, first, class_id).await;

    // Act
    let result = common::try_book(&app.state, second, class_id).await;

    // Assert
    match result {
        Err(BookingError::ClassFull { capacity, .. }) => assert_eq!(capacity, 1),
        other => panic!("expected ClassFull, got {other:?}"),
    }
    assert_eq!(common::member(&app.state, second).await.credits, 1);
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 1);
}

#[tokio::test]
async fn test_booking_without_credits_leaves_class_untouched() {
    let app = common::build_test_app();
    let class_id = common::schedule_class(&app.state, 3, TimeDelta::days(1)).await;
    let member_id = common::register_member(&app.state, 0).await;

    let result = common::try_book(&app.state, member_id, class_id).await;

    assert!(matches!(
        result,
        Err(BookingError::InsufficientCredits { .. })
    ));
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 0);
}

#[tokio::test]
async fn test_booking_same_class_twice_is_rejected() {
    let app = common::build_test_app();
    let class_id = common::schedule_class(&app.state, 3, TimeDelta::days(1)).await;
    let member_id = common::register_member(&app.state, 5).await;
    common::book(&app.state, member_id, class_id).await;

    let result = common::try_book(&app.state, member_id, class_id).await;

    assert!(matches!(result, Err(BookingError::AlreadyBooked { .. })));
    assert_eq!(common::member(&app.state, member_id).await.credits, 4);
}

#[tokio::test]
async fn test_booking_unknown_member_reports_not_found() {
    let app = common::build_test_app();
    let class_id = common::schedule_class(&app.state, 3, TimeDelta::days(1)).await;

    let result = common::try_book(&app.state, Uuid::new_v4(), class_id).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        err,
        BookingError::Domain(DomainError::AggregateNotFound {
            aggregate_type: "member",
            ..
        })
    ));
}

#[tokio::test]
async fn test_deactivated_member_cannot_book() {
    let app = common::build_test_app();
    let class_id = common::schedule_class(&app.state, 3, TimeDelta::days(1)).await;
    let member_id = common::register_member(&app.state, 5).await;
    common::deactivate(&app.state, member_id).await;

    let result = common::try_book(&app.state, member_id, class_id).await;

    assert!(matches!(result, Err(BookingError::MemberInactive(_))));
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 0);
}

#[tokio::test]
async fn test_cancel_inside_window_is_rejected_and_state_kept() {
    // Arrange
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;
    let class_id = common::schedule_class(&app.state, 1, TimeDelta::hours(1)).await;
    let booking_id = common::book(&app.state, member_id, class_id).await;

    // Act
    let result = common::cancel(&app.state, booking_id).await;

    // Assert
    match result {
        Err(BookingError::CancellationWindowClosed {
            remaining_minutes,
            lead_time_minutes,
            ..
        }) => {
            assert_eq!(remaining_minutes, 60);
            assert_eq!(lead_time_minutes, 120);
        }
        other => panic!("expected CancellationWindowClosed, got {other:?}"),
    }
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 1);
    assert_eq!(common::member(&app.state, member_id).await.credits, 0);
}

#[tokio::test]
async fn test_cancel_exactly_at_threshold_succeeds() {
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;
    let class_id = common::schedule_class(&app.state, 1, TimeDelta::hours(2)).await;
    let booking_id = common::book(&app.state, member_id, class_id).await;

    let result = common::cancel(&app.state, booking_id).await;

    assert!(result.is_ok());
    assert_eq!(common::class(&app.state, class_id).await.occupancy, 0);
}

#[tokio::test]
async fn test_second_cancel_fails_without_second_refund() {
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;
    let class_id = common::schedule_class(&app.state, 2, TimeDelta::days(1)).await;
    let booking_id = common::book(&app.state, member_id, class_id).await;
    common::cancel(&app.state, booking_id).await.unwrap();

    let result = common::cancel(&app.state, booking_id).await;

    assert!(matches!(result, Err(BookingError::AlreadyCancelled(id)) if id == booking_id));
    assert_eq!(common::member(&app.state, member_id).await.credits, 1);
}

#[tokio::test]
async fn test_completed_booking_cannot_be_cancelled() {
    // Arrange
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;
    let class_id = common::schedule_class(&app.state, 2, TimeDelta::days(1)).await;
    let booking_id = common::book(&app.state, member_id, class_id).await;
    app.state
        .complete_booking(&CompleteBooking {
            correlation_id: Uuid::new_v4(),
            booking_id,
        })
        .await
        .unwrap();

    // Act
    let result = common::cancel(&app.state, booking_id).await;

    // Assert
    match result {
        Err(BookingError::InvalidStatusTransition { from, to, .. }) => {
            assert_eq!(from, BookingStatus::Completed);
            assert_eq!(to, BookingStatus::Cancelled);
        }
        other => panic!("expected InvalidStatusTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn test_notification_failure_does_not_undo_booking() {
    // Arrange
    let state = common::build_test_app_with_notifier(Arc::new(FailingNotifier));
    let member_id = common::register_member(&state, 1).await;
    let class_id = common::schedule_class(&state, 1, TimeDelta::days(1)).await;

    // Act
    let result = common::try_book(&state, member_id, class_id).await;

    // Assert
    assert!(result.is_ok());
    assert_eq!(common::class(&state, class_id).await.occupancy, 1);
    assert_eq!(common::member(&state, member_id).await.credits, 0);
}

#[tokio::test]
async fn test_registering_taken_member_id_is_rejected() {
    let app = common::build_test_app();
    let member_id = common::register_member(&app.state, 1).await;

    let result = app
        .state
        .register_member(&RegisterMember {
            correlation_id: Uuid::new_v4(),
            member_id,
            name: "Impostor".to_owned(),
            tier: MembershipTier::Premium,
            initial_credits: 50,
        })
        .await;

    assert!(matches!(
        result,
        Err(BookingError::Domain(DomainError::Validation(_)))
    ));
    assert_eq!(common::member(&app.state, member_id).await.credits, 1);
}

#[tokio::test]
async fn test_zero_capacity_class_is_rejected() {
    let app = common::build_test_app();

    let result = app
        .state
        .schedule_class(&ScheduleClass {
            correlation_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            name: "Empty".to_owned(),
            capacity: 0,
            starts_at: common::now(),
        })
        .await;

    assert!(matches!(result, Err(BookingError::InvalidCapacity(0))));
}
