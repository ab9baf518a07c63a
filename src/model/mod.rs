//! Pure data structures carried through the cache, the store and the ingestion pipeline.

pub mod order;

pub use order::*;
