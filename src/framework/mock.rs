//! # Mock Store
//!
//! Utilities for testing the lookup layer and the ingestion pipeline without a running store.
//!
//! [`MockStore`] answers [`RecordStore`] calls from two sources, checked in this order:
//!
//! 1.  **Expectations**: a FIFO queue of one-shot answers set up with `expect_get`,
//!     `expect_get_all` and `expect_insert`. Each call consumes the front entry and panics if
//!     it is of the wrong kind or for the wrong id.
//! 2.  **Stubs**: sticky answers set up with `stub_get` / `stub_get_all`, used once the queue
//!     is empty.
//!
//! A call with neither panics. Every call is counted, and `with_delay` makes each call sleep
//! first, which together with a paused clock lets tests exercise store timeouts.

use crate::framework::{Record, RecordStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected call to the mock store.
enum Expectation<T: Record> {
    Get {
        id: T::Id,
        response: Result<Option<T>, StoreError>,
    },
    GetAll {
        response: Result<Vec<T>, StoreError>,
    },
    Insert {
        response: Result<(), StoreError>,
    },
}

impl<T: Record> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Expectation::Get { .. } => "get",
            Expectation::GetAll { .. } => "get_all",
            Expectation::Insert { .. } => "insert",
        }
    }
}

struct MockState<T: Record> {
    expectations: VecDeque<Expectation<T>>,
    get_stubs: HashMap<T::Id, Result<Option<T>, StoreError>>,
    get_all_stub: Option<Result<Vec<T>, StoreError>>,
    inserted: Vec<T>,
}

/// A scripted [`RecordStore`] for tests.
///
/// # Example
/// ```ignore
/// let store = MockStore::<Order>::new();
/// store.expect_get(uid.clone()).return_ok(Some(order));
/// store.stub_get(other.clone(), None);
///
/// let lookup = OrderLookup::new(store.clone(), cache);
/// // exercise lookup...
/// store.verify(); // Ensures all expectations were met
/// ```
pub struct MockStore<T: Record> {
    state: Arc<Mutex<MockState<T>>>,
    get_calls: Arc<AtomicUsize>,
    get_all_calls: Arc<AtomicUsize>,
    insert_calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl<T: Record> Clone for MockStore<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            get_calls: Arc::clone(&self.get_calls),
            get_all_calls: Arc::clone(&self.get_all_calls),
            insert_calls: Arc::clone(&self.insert_calls),
            delay: self.delay,
        }
    }
}

impl<T: Record> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MockStore<T> {
    /// Creates a mock with no expectations and no stubs.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                expectations: VecDeque::new(),
                get_stubs: HashMap::new(),
                get_all_stub: None,
                inserted: Vec::new(),
            })),
            get_calls: Arc::new(AtomicUsize::new(0)),
            get_all_calls: Arc::new(AtomicUsize::new(0)),
            insert_calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Makes every call sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Expects a `get` for `id`.
    pub fn expect_get(&self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            state: Arc::clone(&self.state),
        }
    }

    /// Expects a `get_all`.
    pub fn expect_get_all(&self) -> GetAllExpectationBuilder<T> {
        GetAllExpectationBuilder {
            state: Arc::clone(&self.state),
        }
    }

    /// Expects an `insert`.
    pub fn expect_insert(&self) -> InsertExpectationBuilder<T> {
        InsertExpectationBuilder {
            state: Arc::clone(&self.state),
        }
    }

    /// Answers every `get(id)` with `record` once the expectation queue is empty.
    pub fn stub_get(&self, id: T::Id, record: Option<T>) {
        self.state.lock().get_stubs.insert(id, Ok(record));
    }

    /// Answers every `get(id)` with `error` once the expectation queue is empty.
    pub fn stub_get_err(&self, id: T::Id, error: StoreError) {
        self.state.lock().get_stubs.insert(id, Err(error));
    }

    /// Answers every `get_all` with `records` once the expectation queue is empty.
    pub fn stub_get_all(&self, records: Vec<T>) {
        self.state.lock().get_all_stub = Some(Ok(records));
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Records accepted by successful `insert` calls, in call order.
    pub fn inserted(&self) -> Vec<T> {
        self.state.lock().inserted.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MockStore<T> {
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let mut state = self.state.lock();
        match state.expectations.pop_front() {
            Some(Expectation::Get {
                id: expected,
                response,
            }) => {
                assert_eq!(&expected, id, "get called with unexpected id");
                response
            }
            Some(other) => panic!("Unexpected get({}), expected {}", id, other.kind()),
            None => match state.get_stubs.get(id) {
                Some(response) => response.clone(),
                None => panic!("Unexpected get({}), no expectation or stub", id),
            },
        }
    }

    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let mut state = self.state.lock();
        match state.expectations.pop_front() {
            Some(Expectation::GetAll { response }) => response,
            Some(other) => panic!("Unexpected get_all, expected {}", other.kind()),
            None => match &state.get_all_stub {
                Some(response) => response.clone(),
                None => panic!("Unexpected get_all, no expectation or stub"),
            },
        }
    }

    async fn insert(&self, record: T) -> Result<(), StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let mut state = self.state.lock();
        let response = match state.expectations.pop_front() {
            Some(Expectation::Insert { response }) => response,
            Some(other) => panic!("Unexpected insert({}), expected {}", record.id(), other.kind()),
            None => panic!("Unexpected insert({}), no expectation", record.id()),
        };
        if response.is_ok() {
            state.inserted.push(record);
        }
        response
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: Record> {
    id: T::Id,
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: Record> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Option<T>) {
        self.state.lock().expectations.push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.state.lock().expectations.push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `get_all` expectations.
pub struct GetAllExpectationBuilder<T: Record> {
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: Record> GetAllExpectationBuilder<T> {
    pub fn return_ok(self, records: Vec<T>) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::GetAll {
                response: Ok(records),
            });
    }

    pub fn return_err(self, error: StoreError) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::GetAll {
                response: Err(error),
            });
    }
}

/// Builder for `insert` expectations.
pub struct InsertExpectationBuilder<T: Record> {
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: Record> InsertExpectationBuilder<T> {
    pub fn return_ok(self) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::Insert { response: Ok(()) });
    }

    pub fn return_err(self, error: StoreError) {
        self.state
            .lock()
            .expectations
            .push_back(Expectation::Insert {
                response: Err(error),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderUid};

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        let store = MockStore::<Order>::new();
        let order = Order::sample("order_1");

        store.expect_insert().return_ok();
        store
            .expect_get(OrderUid::from("order_1"))
            .return_ok(Some(order.clone()));

        store.insert(order.clone()).await.unwrap();
        let fetched = store.get(&OrderUid::from("order_1")).await.unwrap();
        assert_eq!(fetched, Some(order.clone()));

        assert_eq!(store.inserted(), vec![order]);
        assert_eq!(store.get_calls(), 1);
        assert_eq!(store.insert_calls(), 1);
        store.verify();
    }

    #[tokio::test]
    async fn test_stubs_are_sticky() {
        let store = MockStore::<Order>::new();
        store.stub_get(OrderUid::from("gone"), None);
        store.stub_get_err(
            OrderUid::from("down"),
            StoreError::Unavailable("connection refused".into()),
        );

        for _ in 0..3 {
            assert_eq!(store.get(&OrderUid::from("gone")).await, Ok(None));
        }
        assert!(matches!(
            store.get(&OrderUid::from("down")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.get_calls(), 4);
    }

    #[tokio::test]
    async fn test_get_all_expectation_then_stub() {
        let store = MockStore::<Order>::new();
        store
            .expect_get_all()
            .return_err(StoreError::Unavailable("warming up".into()));
        store.stub_get_all(vec![Order::sample("a"), Order::sample("b")]);

        assert!(store.get_all().await.is_err());
        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(store.get_all_calls(), 3);
        store.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_panics_on_leftovers() {
        let store = MockStore::<Order>::new();
        store.expect_get_all().return_ok(vec![]);
        store.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "no expectation or stub")]
    async fn test_unscripted_call_panics() {
        let store = MockStore::<Order>::new();
        let _ = store.get(&OrderUid::from("anything")).await;
    }
}
