//! Cache statistics: running counters plus the point-in-time snapshot returned by
//! [`TtlCache::stats`](crate::framework::TtlCache::stats).

use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Running usage counters, updated without taking the map lock.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    lazy_evictions: AtomicU64,
    swept_entries: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lazy_eviction(&self) {
        self.lazy_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swept(&self, count: usize) {
        self.swept_entries.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub(crate) fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub(crate) fn lazy_evictions(&self) -> u64 {
        self.lazy_evictions.load(Ordering::Relaxed)
    }

    pub(crate) fn swept_entries(&self) -> u64 {
        self.swept_entries.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of the cache.
///
/// `expired_entries` is informational: entries past their TTL that neither a `get` nor the
/// sweep has removed yet still count toward `total_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    #[serde(rename = "ttl_seconds", serialize_with = "serialize_secs")]
    pub ttl: Duration,
    pub hits: u64,
    pub misses: u64,
    pub lazy_evictions: u64,
    pub swept_entries: u64,
}

impl CacheStats {
    /// Fraction of `get` calls served from the cache (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

fn serialize_secs<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(ttl.as_secs_f64())
}
