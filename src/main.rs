//! Scripted walk through the order service: seed, warm-up, ingestion, cached reads, refresh,
//! invalidation and shutdown.

use order_cache::lifecycle::{setup_tracing, AppConfig, OrderSystem};
use order_cache::model::Order;
use std::error::Error;
use std::time::Duration;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let config = AppConfig::load()?;
    info!(?config, "Configuration loaded");

    let seed = vec![Order::sample("order_1"), Order::sample("order_2")];
    let system = OrderSystem::start_with_records(&config, seed).await?;
    let handler = system.handler();

    let span = tracing::info_span!("ingestion");
    async {
        system.ingest.publish_order(&Order::sample("order_3")).await?;
        system.ingest.publish(b"{\"order_uid\": \"broken\"}".to_vec()).await?;
        Ok::<_, Box<dyn Error>>(())
    }
    .instrument(span)
    .await?;

    // Give the pipeline a moment to persist the new order.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let span = tracing::info_span!("reads");
    async {
        for uid in ["order_1", "order_3", "order_1", "missing"] {
            let response = handler.get_order(uid, false).await;
            info!(uid, status = response.status, cache = ?response.cache, "GET order");
        }

        let mut corrected = Order::sample("order_1");
        corrected.track_number = "TRACK_CORRECTED".to_string();
        system.store.replace(corrected).await?;

        let stale = handler.get_order("order_1", false).await;
        let fresh = handler.get_order("order_1", true).await;
        info!(
            cached = %stale.body["track_number"],
            refreshed = %fresh.body["track_number"],
            "Refresh picked up the correction"
        );
        Ok::<_, Box<dyn Error>>(())
    }
    .instrument(span)
    .await?;

    info!(stats = %handler.cache_stats().body, "Cache stats");
    handler.invalidate(Some("order_2"));
    handler.invalidate(None);
    info!(stats = %handler.cache_stats().body, "Cache stats after invalidation");

    drop(handler);
    let summary = system.shutdown().await?;
    info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        "Application completed successfully"
    );
    Ok(())
}
