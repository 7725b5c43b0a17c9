//! Repository port for aggregate persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;

/// Ordering applied by repository queries that return several aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

/// Repository trait for loading and saving one kind of aggregate.
///
/// Implementations return the current persisted state and detect
/// conflicting concurrent writes through the aggregate version.
#[async_trait]
pub trait Repository<A: AggregateRoot>: Send + Sync {
    /// Loads an aggregate, or `None` when no aggregate has that id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<A>, DomainError>;

    /// Persists `aggregate` with optimistic concurrency.
    ///
    /// On success the new version is written back through
    /// [`AggregateRoot::mark_persisted`]. Pending events are left in place
    /// for the caller to drain.
    async fn save(&self, aggregate: &mut A) -> Result<(), DomainError>;
}

/// Loads an aggregate that must exist.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` on a lookup miss, or whatever the
/// repository reports.
pub async fn load_required<A, R>(
    repo: &R,
    id: Uuid,
    aggregate_type: &'static str,
) -> Result<A, DomainError>
where
    A: AggregateRoot,
    R: Repository<A> + ?Sized,
{
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found(aggregate_type, id))
}
