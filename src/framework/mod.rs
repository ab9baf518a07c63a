//! Generic caching framework for keyed records.
//!
//! This module provides the building blocks that the order service is assembled from. None of
//! them know about orders; they work for any type implementing [`Record`].
//!
//! # Main Components
//!
//! - [`Record`] - Trait that cached types implement (just "has a stable id")
//! - [`RecordStore`] - The authoritative store capability the lookup layer reads through
//! - [`StoreActor`] / [`StoreClient`] - In-process store, run as an actor
//! - [`TtlCache`] - Thread-safe, time-bounded cache with lazy and periodic eviction
//! - [`SweepHandle`] - Owner of a cache's background sweep task
//! - [`CacheStats`] - Point-in-time cache snapshot
//! - [`StoreError`] - Store failure types
//!
//! # Testing
//!
//! See the [`mock`] module for a scripted [`RecordStore`] that needs no running actor.

mod actor;
mod cache;
mod client;
mod error;
mod message;
pub mod mock;
mod record;
mod stats;
mod store;
mod sweeper;

pub use actor::StoreActor;
pub use cache::TtlCache;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use record::Record;
pub use stats::CacheStats;
pub use store::RecordStore;
pub use sweeper::SweepHandle;
