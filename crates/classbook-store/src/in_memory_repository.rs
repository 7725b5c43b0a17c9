//! Generic in-memory implementation of the `Repository` port.

use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use classbook_core::aggregate::AggregateRoot;
use classbook_core::error::DomainError;
use classbook_core::repository::{Repository, SortOrder};
use tracing::debug;
use uuid::Uuid;

struct Record<A> {
    aggregate: A,
    inserted: u64,
}

struct Inner<A> {
    records: HashMap<Uuid, Record<A>>,
    next_insert: u64,
}

/// Thread-safe map from aggregate id to the last saved state.
///
/// Versions advance by the number of pending events on each save, matching
/// the sequence numbers the aggregate assigned to those events. Every record
/// remembers its insertion order so queries can break timestamp ties.
pub struct InMemoryRepository<A> {
    inner: RwLock<Inner<A>>,
}

impl<A> InMemoryRepository<A>
where
    A: AggregateRoot + Clone,
{
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                next_insert: 0,
            }),
        }
    }

    /// Number of stored aggregates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.records.len())
    }

    /// Whether nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }

    /// Stored aggregates matching `filter`, ordered by `key` and then by
    /// insertion order. `Descending` reverses the whole sequence.
    pub(crate) fn query<K, F, G>(
        &self,
        filter: F,
        key: G,
        order: SortOrder,
    ) -> Result<Vec<A>, DomainError>
    where
        K: Ord,
        F: Fn(&A) -> bool,
        G: Fn(&A) -> K,
    {
        let inner = self.read()?;
        let mut matches: Vec<&Record<A>> = inner
            .records
            .values()
            .filter(|r| filter(&r.aggregate))
            .collect();
        matches.sort_by(|a, b| {
            key(&a.aggregate)
                .cmp(&key(&b.aggregate))
                .then(a.inserted.cmp(&b.inserted))
        });
        if order == SortOrder::Descending {
            matches.reverse();
        }
        Ok(matches.into_iter().map(|r| r.aggregate.clone()).collect())
    }

    /// Deletes the aggregate with `id`; returns whether it existed.
    pub(crate) fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.write()?.records.remove(&id).is_some())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<A>>, DomainError> {
        self.inner
            .read()
            .map_err(|_| DomainError::Infrastructure("repository lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<A>>, DomainError> {
        self.inner
            .write()
            .map_err(|_| DomainError::Infrastructure("repository lock poisoned".into()))
    }
}

impl<A> Default for InMemoryRepository<A>
where
    A: AggregateRoot + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for InMemoryRepository<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Clone + 'static,
{
    async fn get_by_id(&self, id: Uuid) -> Result<Option<A>, DomainError> {
        Ok(self
            .read()?
            .records
            .get(&id)
            .map(|r| r.aggregate.clone()))
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn save(&self, aggregate: &mut A) -> Result<(), DomainError> {
        let id = aggregate.aggregate_id();
        let expected = aggregate.version();
        let mut guard = self.write()?;
        let inner = &mut *guard;

        let existing = inner
            .records
            .get(&id)
            .map(|r| (r.aggregate.version(), r.inserted));
        let stored = existing.map_or(0, |(version, _)| version);
        if stored != expected {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id: id,
                expected,
                actual: stored,
            });
        }

        let version = expected + aggregate.pending_events().len() as i64;
        aggregate.mark_persisted(version);
        let mut snapshot = aggregate.clone();
        snapshot.clear_pending_events();

        let inserted = existing.map_or_else(
            || {
                let next = inner.next_insert;
                inner.next_insert += 1;
                next
            },
            |(_, inserted)| inserted,
        );
        inner.records.insert(
            id,
            Record {
                aggregate: snapshot,
                inserted,
            },
        );
        debug!(aggregate_id = %id, version, "aggregate saved");
        Ok(())
    }
}
