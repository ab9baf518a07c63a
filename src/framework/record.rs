//! # Record Trait
//!
//! The `Record` trait is the contract every value managed by the [`TtlCache`](crate::framework::TtlCache)
//! and the [`StoreActor`](crate::framework::StoreActor) must satisfy.
//!
//! # Architecture Note
//! The cache, the store and the mock store are written *once* against this trait and reused for
//! any record type. The associated `Id` type keeps lookups type-safe: an `Order` cache only
//! accepts `OrderUid` keys, and the compiler rejects anything else.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A whole, immutable snapshot that can be cached and persisted.
///
/// Records are never patched in place. A change is expressed by replacing the record, which
/// is why `Clone` is enough for sharing: every clone is an equally valid snapshot.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier (e.g., `OrderUid`, `u64`).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;

    /// Returns the identifier this record is stored under.
    fn id(&self) -> &Self::Id;
}
