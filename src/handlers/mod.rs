//! # Request Handlers
//!
//! Transport-neutral request handling. Each operation returns a [`HandlerResponse`] carrying an
//! HTTP-style status code, an optional cache marker and a JSON body, so any server front end
//! can render it directly.
//!
//! | Operation                   | Success                   | Failure                    |
//! |-----------------------------|---------------------------|----------------------------|
//! | `get_order(uid, refresh)`   | 200, order, `HIT`/`MISS`  | 400 blank uid, 404, 503    |
//! | `cache_stats()`             | 200, stats                |                            |
//! | `invalidate(Some(uid))`     | 200, message              | 400 blank uid              |
//! | `invalidate(None)`          | 200, message              |                            |

use crate::framework::RecordStore;
use crate::lookup::{LookupError, OrderLookup};
use crate::model::{Order, OrderUid};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, instrument, warn};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_UNAVAILABLE: u16 = 503;

/// Whether an order response was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Header-style rendering (`HIT` / `MISS`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub cache: Option<CacheStatus>,
    pub body: Value,
}

impl HandlerResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            cache: None,
            body,
        }
    }

    fn error(status: u16, message: impl Display) -> Self {
        Self {
            status,
            cache: None,
            body: json!({ "error": message.to_string() }),
        }
    }

    fn serialized(value: &impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::ok(body),
            Err(e) => {
                error!(error = %e, "Failed to encode response");
                Self::error(STATUS_INTERNAL_ERROR, "Failed to encode response")
            }
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Maps order requests onto an [`OrderLookup`].
pub struct OrderHandler<S: RecordStore<Order>> {
    lookup: Arc<OrderLookup<S>>,
}

impl<S: RecordStore<Order>> Clone for OrderHandler<S> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<S: RecordStore<Order>> OrderHandler<S> {
    pub fn new(lookup: Arc<OrderLookup<S>>) -> Self {
        Self { lookup }
    }

    /// Fetches one order. `refresh` bypasses the cache and re-reads the store.
    #[instrument(skip(self))]
    pub async fn get_order(&self, uid: &str, refresh: bool) -> HandlerResponse {
        let uid = uid.trim();
        if uid.is_empty() {
            return HandlerResponse::error(STATUS_BAD_REQUEST, "order_uid is required");
        }
        let uid = OrderUid::from(uid);

        let result = if refresh {
            self.lookup.get_by_id_with_refresh(&uid).await
        } else {
            self.lookup.get_by_id(&uid).await
        };

        match result {
            Ok(found) => {
                let mut response = HandlerResponse::serialized(&found.order);
                if response.is_success() {
                    response.cache = Some(if found.from_cache {
                        CacheStatus::Hit
                    } else {
                        CacheStatus::Miss
                    });
                }
                response
            }
            Err(e @ LookupError::NotFound(_)) => HandlerResponse::error(STATUS_NOT_FOUND, e),
            Err(e) => {
                warn!(error = %e, "Order lookup failed");
                HandlerResponse::error(STATUS_UNAVAILABLE, e)
            }
        }
    }

    pub fn cache_stats(&self) -> HandlerResponse {
        let stats = self.lookup.stats();
        let mut response = HandlerResponse::serialized(&stats);
        if let Value::Object(body) = &mut response.body {
            body.insert("hit_rate".to_string(), json!(stats.hit_rate()));
        }
        response
    }

    /// Drops one cached order, or the whole cache when `uid` is `None`.
    ///
    /// A blank `uid` is rejected rather than treated as `None`.
    #[instrument(skip(self))]
    pub fn invalidate(&self, uid: Option<&str>) -> HandlerResponse {
        match uid.map(str::trim) {
            Some("") => HandlerResponse::error(STATUS_BAD_REQUEST, "order_uid is required"),
            Some(uid) => {
                self.lookup.invalidate_one(&OrderUid::from(uid));
                HandlerResponse::ok(json!({
                    "message": format!("Cache entry for order {} invalidated", uid)
                }))
            }
            None => {
                self.lookup.invalidate_all();
                HandlerResponse::ok(json!({ "message": "Whole cache invalidated" }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockStore;
    use crate::framework::StoreError;
    use crate::model::OrderCache;
    use std::time::Duration;

    fn handler(store: &MockStore<Order>) -> OrderHandler<MockStore<Order>> {
        let cache = Arc::new(OrderCache::new(Duration::from_secs(1800)));
        OrderHandler::new(Arc::new(OrderLookup::new(store.clone(), cache)))
    }

    #[tokio::test]
    async fn test_get_order_miss_then_hit() {
        let store = MockStore::<Order>::new();
        store.stub_get(OrderUid::from("order_1"), Some(Order::sample("order_1")));
        let handler = handler(&store);

        let first = handler.get_order("order_1", false).await;
        assert_eq!(first.status, STATUS_OK);
        assert_eq!(first.cache, Some(CacheStatus::Miss));
        assert_eq!(first.body["order_uid"], "order_1");

        let second = handler.get_order("order_1", false).await;
        assert_eq!(second.cache, Some(CacheStatus::Hit));
        assert_eq!(second.body, first.body);

        let refreshed = handler.get_order("order_1", true).await;
        assert_eq!(refreshed.cache, Some(CacheStatus::Miss));
        assert_eq!(store.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_get_order_status_codes() {
        let store = MockStore::<Order>::new();
        store.stub_get(OrderUid::from("ghost"), None);
        store.stub_get_err(
            OrderUid::from("down"),
            StoreError::Unavailable("connection refused".into()),
        );
        let handler = handler(&store);

        let missing = handler.get_order("ghost", false).await;
        assert_eq!(missing.status, STATUS_NOT_FOUND);
        assert_eq!(missing.cache, None);

        let down = handler.get_order("down", false).await;
        assert_eq!(down.status, STATUS_UNAVAILABLE);
        assert!(down.body["error"].as_str().unwrap().contains("connection refused"));

        let blank = handler.get_order("   ", false).await;
        assert_eq!(blank.status, STATUS_BAD_REQUEST);
        assert_eq!(store.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_stats_and_invalidation() {
        let store = MockStore::<Order>::new();
        store.stub_get(OrderUid::from("a"), Some(Order::sample("a")));
        let handler = handler(&store);
        handler.get_order("a", false).await;
        handler.get_order("a", false).await;

        let stats = handler.cache_stats();
        assert_eq!(stats.status, STATUS_OK);
        assert_eq!(stats.body["total_entries"], 1);
        assert_eq!(stats.body["ttl_seconds"], 1800.0);
        assert_eq!(stats.body["hit_rate"], 0.5);

        let one = handler.invalidate(Some("a"));
        assert_eq!(one.status, STATUS_OK);
        assert_eq!(handler.cache_stats().body["total_entries"], 0);

        let all = handler.invalidate(None);
        assert_eq!(all.body["message"], "Whole cache invalidated");
    }

    #[test]
    fn test_blank_invalidate_is_rejected_and_keeps_cache() {
        let store = MockStore::<Order>::new();
        let handler = handler(&store);
        for uid in ["a", "b", "c"] {
            handler.lookup.cache().set(OrderUid::from(uid), Order::sample(uid));
        }

        for blank in ["", "   "] {
            let response = handler.invalidate(Some(blank));
            assert_eq!(response.status, STATUS_BAD_REQUEST);
            assert_eq!(response.body["error"], "order_uid is required");
        }
        assert_eq!(handler.lookup.cache().len(), 3);
    }
}
