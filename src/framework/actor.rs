//! # Store Actor
//!
//! This module defines the `StoreActor`, the in-process record store. It implements the
//! "Server" side of the Actor Model: it owns every persisted record and processes requests
//! sequentially, so the record map needs no lock.

use crate::framework::client::StoreClient;
use crate::framework::message::StoreRequest;
use crate::framework::{Record, StoreError};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The authoritative store for records of type `T`.
///
/// # Architecture Note
/// This struct is the "Server" half of the store. It owns the records and the receiver end
/// of the channel. The [`StoreClient`] half is cheap to clone and is what the lookup layer and
/// the ingestion pipeline hold.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `StoreActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Seed** (optional): Call `with_records()` before the loop starts.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust,ignore
/// let (actor, client) = StoreActor::<Order>::new(32);
/// tokio::spawn(actor.with_records(seed).run());
/// let order = client.get(&uid).await?;
/// ```
///
/// The loop ends when every client is dropped or when [`StoreClient::shutdown`] is called.
pub struct StoreActor<T: Record> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: HashMap<T::Id, T>,
}

impl<T: Record> StoreActor<T> {
    /// Creates a new `StoreActor` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: HashMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Pre-populates the store before the loop starts. Later duplicates replace earlier ones.
    pub fn with_records(mut self, records: impl IntoIterator<Item = T>) -> Self {
        for record in records {
            self.records.insert(record.id().clone(), record);
        }
        self
    }

    /// Runs the actor's event loop, processing requests until the channel closes or a
    /// `Shutdown` request arrives.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Order" instead of "order_cache::model::order::Order")
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, size = self.records.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    debug!(record_type, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::GetAll { respond_to } => {
                    debug!(record_type, size = self.records.len(), "GetAll");
                    let _ = respond_to.send(Ok(self.records.values().cloned().collect()));
                }
                StoreRequest::Insert { record, respond_to } => {
                    let id = record.id().clone();
                    if self.records.contains_key(&id) {
                        warn!(record_type, %id, "Insert rejected, id taken");
                        let _ = respond_to.send(Err(StoreError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    self.records.insert(id.clone(), record);
                    info!(record_type, %id, size = self.records.len(), "Inserted");
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::Replace { record, respond_to } => {
                    let id = record.id().clone();
                    let previous = self.records.insert(id.clone(), record);
                    info!(record_type, %id, replaced = previous.is_some(), "Replaced");
                    let _ = respond_to.send(Ok(previous));
                }
                StoreRequest::Shutdown => {
                    debug!(record_type, "Shutdown requested");
                    break;
                }
            }
        }

        info!(record_type, size = self.records.len(), "Store stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderUid};

    #[tokio::test]
    async fn test_store_actor_lifecycle() {
        let seed = Order::sample("seed_1");
        let (actor, client) = StoreActor::<Order>::new(8);
        let handle = tokio::spawn(actor.with_records(vec![seed.clone()]).run());

        // 1. Seeded record is visible
        let found = client.get(&OrderUid::from("seed_1")).await.unwrap();
        assert_eq!(found, Some(seed.clone()));

        // 2. Insert a new one
        client.insert(Order::sample("new_1")).await.unwrap();
        assert_eq!(client.get_all().await.unwrap().len(), 2);

        // 3. Duplicate insert is rejected
        let dup = client.insert(Order::sample("new_1")).await;
        assert_eq!(dup, Err(StoreError::AlreadyExists("new_1".to_string())));

        // 4. Replace swaps the whole record
        let mut changed = Order::sample("seed_1");
        changed.track_number = "TRACK_CHANGED".to_string();
        let previous = client.replace(changed.clone()).await.unwrap();
        assert_eq!(previous, Some(seed));
        let found = client.get(&OrderUid::from("seed_1")).await.unwrap().unwrap();
        assert_eq!(found.track_number, "TRACK_CHANGED");

        // 5. Unknown id is absent, not an error
        assert_eq!(client.get(&OrderUid::from("nope")).await.unwrap(), None);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_explicit_shutdown_closes_lingering_clients() {
        let (actor, client) = StoreActor::<Order>::new(8);
        let lingering = client.clone();
        let handle = tokio::spawn(actor.run());

        client.shutdown().await;
        handle.await.unwrap();

        let result = lingering.get(&OrderUid::from("any")).await;
        assert_eq!(result, Err(StoreError::Closed));
    }
}
