//! # TTL Cache
//!
//! This module defines the `TtlCache`, the in-memory, time-bounded half of the cache-aside
//! pair. It maps record ids to timestamped snapshots behind a single reader/writer lock.
//!
//! ## Staleness
//!
//! An entry is stale once `now - inserted_at > ttl`. [`TtlCache::get`] hides stale entries
//! (removing them lazily), [`TtlCache::sweep_expired`] removes them eagerly, and
//! [`TtlCache::stats`] counts them. All three go through [`CacheEntry::is_expired`], so they
//! can never disagree about what "stale" means.
//!
//! ## Locking
//!
//! `get`, `set` and `delete` hold the lock for O(1). Only `stats` and the sweep scan the whole
//! map, and the sweep scans under the *read* lock and then takes the write lock once for the
//! whole batch of removals.
//!
//! Timestamps use `tokio::time::Instant`, so tests can drive expiry with a paused clock.

use crate::framework::stats::{CacheCounters, CacheStats};
use crate::framework::sweeper::SweepHandle;
use crate::framework::Record;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Shortest sweep period the cache will schedule, so a tiny TTL cannot spin the sweeper.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// A record snapshot and the instant it entered the cache.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<T> {
    record: T,
    inserted_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(record: T) -> Self {
        Self {
            record,
            inserted_at: Instant::now(),
        }
    }

    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}

/// Thread-safe, time-bounded cache of `T` records keyed by `T::Id`.
///
/// All operations are infallible and never touch I/O. Share it as `Arc<TtlCache<T>>`; the
/// background sweep is started separately with [`TtlCache::spawn_sweeper`].
pub struct TtlCache<T: Record> {
    entries: RwLock<HashMap<T::Id, CacheEntry<T>>>,
    ttl: Duration,
    counters: CacheCounters,
}

impl<T: Record> TtlCache<T> {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            counters: CacheCounters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Period of the background sweep: half the TTL.
    pub fn sweep_period(&self) -> Duration {
        (self.ttl / 2).max(MIN_SWEEP_PERIOD)
    }

    /// Returns the cached record if present and fresh.
    ///
    /// A present-but-stale entry is removed and reported as a miss.
    pub fn get(&self, id: &T::Id) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(id) {
                None => {
                    self.counters.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired(now, self.ttl) => {
                    self.counters.record_hit();
                    return Some(entry.record.clone());
                }
                Some(_) => {}
            }
        }

        self.evict_if_expired(id, now);
        self.counters.record_miss();
        None
    }

    /// Removes `id` if it is still stale at `now`.
    ///
    /// Re-checked under the write lock: a concurrent `set` may have refreshed the entry since
    /// the read lock was released.
    fn evict_if_expired(&self, id: &T::Id, now: Instant) -> bool {
        let mut entries = self.entries.write();
        if !entries
            .get(id)
            .is_some_and(|entry| entry.is_expired(now, self.ttl))
        {
            return false;
        }
        entries.remove(id);
        self.counters.record_lazy_eviction();
        debug!(%id, "Evicted stale entry on read");
        true
    }

    /// Inserts or overwrites the entry for `id`, stamped with the current instant.
    pub fn set(&self, id: T::Id, record: T) {
        self.entries.write().insert(id, CacheEntry::new(record));
    }

    /// Removes the entry for `id`. Returns whether anything was removed.
    pub fn delete(&self, id: &T::Id) -> bool {
        self.entries.write().remove(id).is_some()
    }

    /// Replaces the whole mapping with an empty one and returns how many entries it held.
    pub fn invalidate_all(&self) -> usize {
        // The old map is freed after the write guard is released.
        let old = std::mem::take(&mut *self.entries.write());
        old.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether the map physically holds `id`, fresh or not.
    pub fn contains(&self, id: &T::Id) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Point-in-time snapshot computed under the read lock.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read();
        let total_entries = entries.len();
        let expired_entries = entries
            .values()
            .filter(|entry| entry.is_expired(now, self.ttl))
            .count();

        CacheStats {
            total_entries,
            expired_entries,
            valid_entries: total_entries - expired_entries,
            ttl: self.ttl,
            hits: self.counters.hits(),
            misses: self.counters.misses(),
            lazy_evictions: self.counters.lazy_evictions(),
            swept_entries: self.counters.swept_entries(),
        }
    }

    /// Removes every stale entry in one batch and returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired = self.collect_expired(now);
        if expired.is_empty() {
            return 0;
        }

        let removed = self.remove_expired(&expired, now);
        self.counters.record_swept(removed);
        if removed > 0 {
            info!(removed, "Swept expired cache entries");
        }
        removed
    }

    /// Ids of the entries stale at `now`, gathered under the read lock.
    fn collect_expired(&self, now: Instant) -> Vec<T::Id> {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Removes those of `ids` that are still stale at `now`, under one write lock.
    fn remove_expired(&self, ids: &[T::Id], now: Instant) -> usize {
        let mut entries = self.entries.write();
        let mut removed = 0;
        for id in ids {
            // An id re-`set` since it was collected is fresh again and stays.
            if entries
                .get(id)
                .is_some_and(|entry| entry.is_expired(now, self.ttl))
            {
                entries.remove(id);
                removed += 1;
            }
        }
        removed
    }

    /// Starts the background sweep, ticking every [`sweep_period`](Self::sweep_period).
    ///
    /// Must be called from within a Tokio runtime. The task holds only a weak reference, so it
    /// also stops on its own once the last `Arc` to the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweepHandle {
        SweepHandle::spawn(Arc::downgrade(self), self.sweep_period())
    }
}

impl<T: Record> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("current_entries", &self.len())
            .finish()
    }
}
