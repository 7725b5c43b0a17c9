//! Query handlers for the class booking context.
//!
//! Queries load aggregates through the repository ports and return
//! read-only view DTOs. They never record events.

use chrono::{DateTime, Utc};
use classbook_core::aggregate::AggregateRoot;
use classbook_core::error::DomainError;
use classbook_core::repository::{SortOrder, load_required};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{Booking, BookingStatus, FitnessClass, Member, MembershipTier};
use crate::domain::ports::{
    BOOKING, BookingRepository, FITNESS_CLASS, FitnessClassRepository, MEMBER, MemberRepository,
    WaitlistRepository,
};

/// Read-only view of a member.
#[derive(Debug, Serialize)]
pub struct MemberView {
    /// The member identifier.
    pub member_id: Uuid,
    /// Display name.
    pub name: String,
    /// Membership tier.
    pub tier: MembershipTier,
    /// Current credit balance.
    pub credits: u32,
    /// Whether the member can book.
    pub active: bool,
    /// Persisted version.
    pub version: i64,
}

/// Read-only view of a fitness class.
#[derive(Debug, Serialize)]
pub struct ClassView {
    /// The class identifier.
    pub class_id: Uuid,
    /// Class name.
    pub name: String,
    /// Maximum number of booked members.
    pub capacity: u32,
    /// Current number of booked members.
    pub occupancy: u32,
    /// Class start time.
    pub starts_at: DateTime<Utc>,
    /// Persisted version.
    pub version: i64,
}

/// Read-only view of a booking.
#[derive(Debug, Serialize)]
pub struct BookingView {
    /// The booking identifier.
    pub booking_id: Uuid,
    /// The booking member.
    pub member_id: Uuid,
    /// The booked class.
    pub class_id: Uuid,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// When the booking was made.
    pub booked_at: DateTime<Utc>,
    /// Reason given on cancellation, if any.
    pub cancellation_reason: Option<String>,
}

/// Read-only view of one waitlist position.
#[derive(Debug, Serialize)]
pub struct WaitlistEntryView {
    /// The entry identifier.
    pub entry_id: Uuid,
    /// The queued member.
    pub member_id: Uuid,
    /// 1-based queue position.
    pub position: usize,
    /// When the member joined the queue.
    pub created_at: DateTime<Utc>,
}

/// Retrieves a member.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no member has the ID.
pub async fn get_member(
    member_id: Uuid,
    repo: &MemberRepository,
) -> Result<MemberView, DomainError> {
    let member: Member = load_required(repo, member_id, MEMBER).await?;
    Ok(MemberView {
        member_id,
        name: member.name().to_owned(),
        tier: member.tier(),
        credits: member.credits(),
        active: member.is_active(),
        version: member.version(),
    })
}

/// Retrieves a class.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no class has the ID.
pub async fn get_class(
    class_id: Uuid,
    repo: &FitnessClassRepository,
) -> Result<ClassView, DomainError> {
    let class: FitnessClass = load_required(repo, class_id, FITNESS_CLASS).await?;
    Ok(ClassView {
        class_id,
        name: class.name().to_owned(),
        capacity: class.capacity(),
        occupancy: class.occupancy(),
        starts_at: class.starts_at(),
        version: class.version(),
    })
}

/// Retrieves a booking.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no booking has the ID.
pub async fn get_booking(
    booking_id: Uuid,
    repo: &dyn BookingRepository,
) -> Result<BookingView, DomainError> {
    let booking: Booking = load_required(repo, booking_id, BOOKING).await?;
    Ok(BookingView {
        booking_id,
        member_id: booking.member_id(),
        class_id: booking.class_id(),
        status: booking.status(),
        booked_at: booking.booked_at(),
        cancellation_reason: booking.cancellation_reason().map(str::to_owned),
    })
}

/// Lists a class's waitlist in promotion order. An unknown class yields an
/// empty list.
///
/// # Errors
///
/// Returns whatever the repository reports.
pub async fn list_waitlist(
    class_id: Uuid,
    repo: &dyn WaitlistRepository,
) -> Result<Vec<WaitlistEntryView>, DomainError> {
    let entries = repo.find_by_class(class_id, SortOrder::Ascending).await?;
    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| WaitlistEntryView {
            entry_id: entry.aggregate_id(),
            member_id: entry.member_id(),
            position: index + 1,
            created_at: entry.created_at(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone, Utc};
    use classbook_core::aggregate::AggregateRoot;
    use classbook_core::error::DomainError;
    use classbook_core::repository::{Repository, SortOrder};
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::WaitlistEntry;

    struct MemberStub(HashMap<Uuid, Member>);

    #[async_trait]
    impl Repository<Member> for MemberStub {
        async fn get_by_id(&self, id: Uuid) -> Result<Option<Member>, DomainError> {
            Ok(self.0.get(&id).cloned())
        }

        async fn save(&self, _aggregate: &mut Member) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct WaitlistStub(Vec<WaitlistEntry>);

    #[async_trait]
    impl Repository<WaitlistEntry> for WaitlistStub {
        async fn get_by_id(&self, id: Uuid) -> Result<Option<WaitlistEntry>, DomainError> {
            Ok(self.0.iter().find(|e| e.aggregate_id() == id).cloned())
        }

        async fn save(&self, _aggregate: &mut WaitlistEntry) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[async_trait]
    impl WaitlistRepository for WaitlistStub {
        async fn find_by_class(
            &self,
            class_id: Uuid,
            _order: SortOrder,
        ) -> Result<Vec<WaitlistEntry>, DomainError> {
            Ok(self
                .0
                .iter()
                .filter(|e| e.class_id() == class_id)
                .cloned()
                .collect())
        }

        async fn remove(&self, _entry_id: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_member_returns_view_with_state() {
        // Arrange
        let member_id = Uuid::new_v4();
        let member = Member::reconstitute(
            member_id,
            3,
            "Ada".to_owned(),
            MembershipTier::Premium,
            9,
            true,
        );
        let repo = MemberStub(HashMap::from([(member_id, member)]));

        // Act
        let view = get_member(member_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.member_id, member_id);
        assert_eq!(view.name, "Ada");
        assert_eq!(view.tier, MembershipTier::Premium);
        assert_eq!(view.credits, 9);
        assert!(view.active);
        assert_eq!(view.version, 3);
    }

    #[tokio::test]
    async fn test_get_member_returns_not_found_for_unknown_id() {
        let repo = MemberStub(HashMap::new());
        let member_id = Uuid::new_v4();

        let result = get_member(member_id, &repo).await;

        match result {
            Err(DomainError::AggregateNotFound { aggregate_type, id }) => {
                assert_eq!(aggregate_type, MEMBER);
                assert_eq!(id, member_id);
            }
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_waitlist_numbers_positions_from_one() {
        // Arrange
        let class_id = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let entries: Vec<WaitlistEntry> = (0..3)
            .map(|i| {
                WaitlistEntry::reconstitute(
                    Uuid::new_v4(),
                    1,
                    Uuid::new_v4(),
                    class_id,
                    start + TimeDelta::minutes(i),
                )
            })
            .collect();
        let expected: Vec<Uuid> = entries.iter().map(AggregateRoot::aggregate_id).collect();
        let repo = WaitlistStub(entries);

        // Act
        let views = list_waitlist(class_id, &repo).await.unwrap();

        // Assert
        assert_eq!(
            views.iter().map(|v| v.entry_id).collect::<Vec<_>>(),
            expected
        );
        assert_eq!(
            views.iter().map(|v| v.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_list_waitlist_for_unknown_class_is_empty() {
        let repo = WaitlistStub(Vec::new());

        let views = list_waitlist(Uuid::new_v4(), &repo).await.unwrap();

        assert!(views.is_empty());
    }
}
