//! # Ingestion Pipeline
//!
//! Order events arrive as raw JSON payloads on an mpsc channel. Each one is parsed, validated,
//! persisted through the [`RecordStore`], and only then written to the cache, so the cache never
//! holds an order the store rejected. Bad events are logged and skipped; they never stop the
//! pipeline.

mod error;

pub use error::IngestError;

use crate::framework::RecordStore;
use crate::model::{Order, OrderCache, OrderUid};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Counts reported when the pipeline stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Cloneable producer handle. The pipeline stops once every sender is dropped.
#[derive(Debug, Clone)]
pub struct IngestSender {
    sender: mpsc::Sender<Vec<u8>>,
}

impl IngestSender {
    /// Queues a raw event payload, waiting for buffer space if needed.
    pub async fn publish(&self, payload: impl Into<Vec<u8>>) -> Result<(), IngestError> {
        self.sender
            .send(payload.into())
            .await
            .map_err(|_| IngestError::Closed)
    }

    /// Serializes `order` the way the upstream producer does and queues it.
    pub async fn publish_order(&self, order: &Order) -> Result<(), IngestError> {
        let payload = serde_json::to_vec(order)?;
        self.publish(payload).await
    }
}

/// Consumer side of the event channel.
pub struct IngestPipeline<S: RecordStore<Order>> {
    receiver: mpsc::Receiver<Vec<u8>>,
    store: S,
    cache: Arc<OrderCache>,
}

impl<S: RecordStore<Order>> IngestPipeline<S> {
    /// Creates the pipeline and its first sender.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the event channel. Publishers wait when it is full.
    pub fn new(store: S, cache: Arc<OrderCache>, buffer_size: usize) -> (Self, IngestSender) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let pipeline = Self {
            receiver,
            store,
            cache,
        };
        (pipeline, IngestSender { sender })
    }

    /// Consumes events until every [`IngestSender`] is dropped.
    pub async fn run(mut self) -> IngestSummary {
        info!("Ingestion started");
        let mut summary = IngestSummary::default();

        while let Some(payload) = self.receiver.recv().await {
            match self.ingest(&payload).await {
                Ok(uid) => {
                    summary.accepted += 1;
                    info!(%uid, "Order ingested");
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!(error = %e, bytes = payload.len(), "Order event rejected");
                }
            }
        }

        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Ingestion stopped"
        );
        summary
    }

    async fn ingest(&self, payload: &[u8]) -> Result<OrderUid, IngestError> {
        let order: Order = serde_json::from_slice(payload)?;
        debug!(uid = %order.order_uid, "Parsed order event");
        order.validate()?;

        let uid = order.order_uid.clone();
        self.store.insert(order.clone()).await?;
        self.cache.set(uid.clone(), order);
        Ok(uid)
    }
}
