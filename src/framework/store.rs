//! # RecordStore Trait
//!
//! The capability the cache-aside layer consumes from the authoritative store: point get,
//! bulk get-all and insert. Schema and transaction mechanics stay behind this seam.

use crate::framework::{Record, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// Authoritative, persisted records keyed by [`Record::Id`].
///
/// Implementations may suspend on I/O. Callers bound that I/O with their own timeout and cancel
/// it by dropping the future, so implementations must not leave shared state half-written when
/// dropped mid-call.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Fetch one record. `Ok(None)` means the store has no such record.
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError>;

    /// Fetch every record currently stored.
    async fn get_all(&self) -> Result<Vec<T>, StoreError>;

    /// Persist a new record.
    async fn insert(&self, record: T) -> Result<(), StoreError>;
}

#[async_trait]
impl<T, S> RecordStore<T> for Arc<S>
where
    T: Record,
    S: RecordStore<T> + ?Sized,
{
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        (**self).get(id).await
    }

    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        (**self).get_all().await
    }

    async fn insert(&self, record: T) -> Result<(), StoreError> {
        (**self).insert(record).await
    }
}
