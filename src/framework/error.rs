//! # Store Errors
//!
//! Errors surfaced by any [`RecordStore`](crate::framework::RecordStore) implementation.
//! Cache operations never fail, so this is the only error type the framework defines.

/// Errors that can occur while talking to the record store.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
