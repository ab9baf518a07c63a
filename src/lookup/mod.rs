//! # Order Lookup
//!
//! The cache-aside orchestrator. Reads go to the [`OrderCache`] first and fall through to the
//! [`RecordStore`] on a miss; whatever the store returns is written back to the cache.
//!
//! Every store call is bounded by `store_timeout`. The cache is only written after a store
//! call has returned, so dropping a lookup future (or timing out) never leaves a partial write.
//!
//! There is no single-flight: concurrent misses for the same uid each query the store and
//! each write the cache, and the last writer wins.

mod error;

pub use error::LookupError;

use crate::framework::{CacheStats, RecordStore, StoreError};
use crate::model::{Order, OrderCache, OrderUid};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// A successfully resolved order and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub order: Order,
    pub from_cache: bool,
}

/// Cache-aside reads over an order store.
pub struct OrderLookup<S: RecordStore<Order>> {
    store: S,
    cache: Arc<OrderCache>,
    store_timeout: Duration,
}

impl<S: RecordStore<Order>> OrderLookup<S> {
    pub fn new(store: S, cache: Arc<OrderCache>) -> Self {
        Self {
            store,
            cache,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn cache(&self) -> &Arc<OrderCache> {
        &self.cache
    }

    /// Resolves `uid`, serving from the cache when possible.
    ///
    /// Absent orders are not cached, so a later insert becomes visible on the next lookup.
    #[instrument(skip(self, uid), fields(%uid))]
    pub async fn get_by_id(&self, uid: &OrderUid) -> Result<LookupResult, LookupError> {
        if let Some(order) = self.cache.get(uid) {
            debug!("Cache hit");
            return Ok(LookupResult {
                order,
                from_cache: true,
            });
        }

        debug!("Cache miss, reading store");
        match self.fetch(self.store.get(uid)).await? {
            Some(order) => {
                self.cache.set(uid.clone(), order.clone());
                Ok(LookupResult {
                    order,
                    from_cache: false,
                })
            }
            None => Err(LookupError::NotFound(uid.clone())),
        }
    }

    /// Re-reads `uid` from the store, ignoring any cached copy, and overwrites the cache.
    ///
    /// If the store no longer has the order its cache entry is dropped. If the refresh read
    /// fails it is retried once; the retry's failure is returned.
    #[instrument(skip(self, uid), fields(%uid))]
    pub async fn get_by_id_with_refresh(
        &self,
        uid: &OrderUid,
    ) -> Result<LookupResult, LookupError> {
        let fetched = match self.fetch(self.store.get(uid)).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "Refresh read failed, retrying once");
                self.fetch(self.store.get(uid)).await?
            }
        };

        match fetched {
            Some(order) => {
                self.cache.set(uid.clone(), order.clone());
                info!("Cache entry refreshed");
                Ok(LookupResult {
                    order,
                    from_cache: false,
                })
            }
            None => {
                if self.cache.delete(uid) {
                    info!("Dropped cache entry for order missing from store");
                }
                Err(LookupError::NotFound(uid.clone()))
            }
        }
    }

    /// Warms the cache with every order in the store. Returns how many were loaded.
    ///
    /// A store failure aborts the load before any entry is written.
    #[instrument(skip(self))]
    pub async fn load_from_store(&self) -> Result<usize, LookupError> {
        let orders = self.fetch(self.store.get_all()).await?;
        let loaded = orders.len();
        for order in orders {
            self.cache.set(order.order_uid.clone(), order);
        }
        info!(loaded, "Cache warmed from store");
        Ok(loaded)
    }

    pub fn invalidate_one(&self, uid: &OrderUid) {
        let removed = self.cache.delete(uid);
        debug!(%uid, removed, "Invalidated cache entry");
    }

    pub fn invalidate_all(&self) {
        let dropped = self.cache.invalidate_all();
        info!(dropped, "Invalidated whole cache");
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch<R>(
        &self,
        call: impl Future<Output = Result<R, StoreError>>,
    ) -> Result<R, LookupError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(timeout = ?self.store_timeout, "Store call timed out");
                Err(LookupError::StoreTimeout(self.store_timeout))
            }
        }
    }
}
