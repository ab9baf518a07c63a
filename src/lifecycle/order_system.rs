use crate::framework::{StoreActor, StoreClient, SweepHandle};
use crate::handlers::OrderHandler;
use crate::ingest::{IngestPipeline, IngestSender, IngestSummary};
use crate::lifecycle::AppConfig;
use crate::lookup::{LookupError, OrderLookup};
use crate::model::{Order, OrderCache};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Errors raised while starting or stopping the [`OrderSystem`].
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Cache warm-up failed: {0}")]
    Warmup(#[from] LookupError),
    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),
}

/// The runtime orchestrator for the order service.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the store actor, the cache sweeper and
///   the ingestion pipeline
/// - **Dependency Wiring**: Handing one shared `Arc<OrderCache>` to the lookup layer and the
///   ingestion pipeline
/// - **Warm-up**: Loading every stored order into the cache before serving
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::start(&AppConfig::default()).await?;
///
/// system.ingest.publish_order(&order).await?;
/// let response = system.handler().get_order("order_1", false).await;
///
/// // Gracefully shut down when done
/// let summary = system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Cache-aside reads for request handling
    pub lookup: Arc<OrderLookup<StoreClient<Order>>>,

    /// Direct store access (seeding, corrections)
    pub store: StoreClient<Order>,

    /// Producer side of the ingestion pipeline
    pub ingest: IngestSender,

    sweeper: SweepHandle,
    store_handle: JoinHandle<()>,
    ingest_handle: JoinHandle<IngestSummary>,
}

impl OrderSystem {
    /// Starts the system with an empty store.
    pub async fn start(config: &AppConfig) -> Result<Self, SystemError> {
        Self::start_with_records(config, Vec::new()).await
    }

    /// Starts the system with `seed` already in the store.
    ///
    /// This method:
    /// 1. Spawns the store actor
    /// 2. Creates the shared cache and, if configured, warms it from the store
    /// 3. Starts the cache sweeper
    /// 4. Spawns the ingestion pipeline
    ///
    /// A failed warm-up stops the store again and is returned as an error.
    pub async fn start_with_records(
        config: &AppConfig,
        seed: Vec<Order>,
    ) -> Result<Self, SystemError> {
        info!(
            ttl_secs = config.cache.ttl_secs,
            seeded = seed.len(),
            "Starting order system"
        );

        let (store_actor, store) = StoreActor::<Order>::new(config.store.buffer_size);
        let store_handle = tokio::spawn(store_actor.with_records(seed).run());

        let cache = Arc::new(OrderCache::new(config.ttl()));
        let lookup = Arc::new(
            OrderLookup::new(store.clone(), Arc::clone(&cache))
                .with_store_timeout(config.store_timeout()),
        );

        if config.cache.warm_on_start {
            if let Err(e) = lookup.load_from_store().await {
                error!(error = %e, "Cache warm-up failed, stopping store");
                store.shutdown().await;
                store_handle.await?;
                return Err(e.into());
            }
        }

        let sweeper = cache.spawn_sweeper();

        let (pipeline, ingest) =
            IngestPipeline::new(store.clone(), cache, config.ingest.buffer_size);
        let ingest_handle = tokio::spawn(pipeline.run());

        info!("Order system started");
        Ok(Self {
            lookup,
            store,
            ingest,
            sweeper,
            store_handle,
            ingest_handle,
        })
    }

    /// A request handler sharing this system's lookup layer.
    pub fn handler(&self) -> OrderHandler<StoreClient<Order>> {
        OrderHandler::new(Arc::clone(&self.lookup))
    }

    /// Gracefully shuts down the entire system.
    ///
    /// This method:
    /// 1. Drops the ingestion sender and waits for queued events to drain
    /// 2. Closes the cache sweeper
    /// 3. Stops the store actor and waits for it
    ///
    /// Clones of [`IngestSender`] held elsewhere keep the pipeline alive, so drop them first.
    /// The store is stopped explicitly, so lingering [`StoreClient`] clones only see
    /// [`StoreError::Closed`](crate::framework::StoreError::Closed) afterwards.
    pub async fn shutdown(self) -> Result<IngestSummary, SystemError> {
        info!("Shutting down order system...");

        drop(self.ingest);
        let summary =
            stop_tasks(self.ingest_handle, self.sweeper, &self.store, self.store_handle).await?;

        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Order system shutdown complete"
        );
        Ok(summary)
    }
}

/// Stops every background task even if an earlier one failed; the first error wins.
async fn stop_tasks(
    ingest_handle: JoinHandle<IngestSummary>,
    sweeper: SweepHandle,
    store: &StoreClient<Order>,
    store_handle: JoinHandle<()>,
) -> Result<IngestSummary, SystemError> {
    let ingested = ingest_handle.await.inspect_err(|e| {
        error!("Ingestion task failed: {:?}", e);
    });

    if let Err(e) = sweeper.close().await {
        warn!("Sweeper task failed: {:?}", e);
    }

    store.shutdown().await;
    let stored = store_handle.await.inspect_err(|e| {
        error!("Store task failed: {:?}", e);
    });

    let summary = ingested?;
    stored?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::StoreError;
    use crate::model::OrderUid;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_ingestion_still_stops_store() {
        let (store_actor, store) = StoreActor::<Order>::new(8);
        let store_handle = tokio::spawn(store_actor.run());
        let lingering = store.clone();

        let cache = Arc::new(OrderCache::new(Duration::from_secs(60)));
        let sweeper = cache.spawn_sweeper();
        let ingest_handle: JoinHandle<IngestSummary> =
            tokio::spawn(async { panic!("ingestion blew up") });

        let result = stop_tasks(ingest_handle, sweeper, &store, store_handle).await;
        assert!(matches!(result, Err(SystemError::Task(ref e)) if e.is_panic()));

        // The store actor was still told to stop and has exited.
        let after = lingering.get(&OrderUid::from("any")).await;
        assert_eq!(after, Err(StoreError::Closed));
    }
}
