//! # Store Client
//!
//! This module defines the cloneable handle for communicating with a `StoreActor`.

use crate::framework::message::StoreRequest;
use crate::framework::{Record, RecordStore, StoreError};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// ## StoreClient
///
/// The `StoreClient<T>` forwards requests to a [`StoreActor<T>`](crate::framework::StoreActor)
/// over a Tokio mpsc channel and receives results via oneshot channels. It holds only a sender,
/// so cloning is inexpensive and clones can be shared across tasks.
///
/// Dropping the future of any call is safe: the actor either never sees the request or
/// completes it and discards the reply.
#[derive(Clone)]
pub struct StoreClient<T: Record> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Record> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get {
                id: id.clone(),
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::GetAll { respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, record: T) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { record, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Upserts a whole record and returns the snapshot it replaced, if any.
    pub async fn replace(&self, record: T) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Replace { record, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Asks the actor to stop. A no-op if it already has.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(StoreRequest::Shutdown).await;
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for StoreClient<T> {
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        StoreClient::get(self, id).await
    }

    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        StoreClient::get_all(self).await
    }

    async fn insert(&self, record: T) -> Result<(), StoreError> {
        StoreClient::insert(self, record).await
    }
}
