use order_cache::framework::StoreError;
use order_cache::handlers::{CacheStatus, STATUS_NOT_FOUND, STATUS_OK};
use order_cache::lifecycle::{AppConfig, OrderSystem};
use order_cache::model::{Order, OrderUid};
use std::time::Duration;

/// Waits until the ingestion pipeline has cached `uid`.
async fn wait_until_cached(system: &OrderSystem, uid: &str) {
    let uid = OrderUid::from(uid);
    for _ in 0..200 {
        if system.lookup.cache().contains(&uid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("order {} was never cached", uid);
}

/// Full end-to-end integration test with the real store actor.
#[tokio::test]
async fn test_full_order_system_integration() {
    let config = AppConfig::default();
    let seed = vec![Order::sample("seed_1"), Order::sample("seed_2")];
    let system = OrderSystem::start_with_records(&config, seed)
        .await
        .expect("Failed to start system");
    let handler = system.handler();

    // Warm-up loaded the seed
    assert_eq!(system.lookup.stats().valid_entries, 2);
    let seeded = handler.get_order("seed_1", false).await;
    assert_eq!(seeded.status, STATUS_OK);
    assert_eq!(seeded.cache, Some(CacheStatus::Hit));

    // Ingest a new order and a bad one
    system
        .ingest
        .publish_order(&Order::sample("new_1"))
        .await
        .expect("Failed to publish");
    system
        .ingest
        .publish(b"{\"order_uid\": 42}".to_vec())
        .await
        .expect("Failed to publish");
    wait_until_cached(&system, "new_1").await;

    // Ingested orders are persisted, not just cached
    let stored = system
        .store
        .get(&OrderUid::from("new_1"))
        .await
        .expect("Store failed");
    assert_eq!(stored, Some(Order::sample("new_1")));

    // Invalidate, then the next read is a miss served by the store and re-cached
    handler.invalidate(Some("new_1"));
    let miss = handler.get_order("new_1", false).await;
    assert_eq!(miss.cache, Some(CacheStatus::Miss));
    let hit = handler.get_order("new_1", false).await;
    assert_eq!(hit.cache, Some(CacheStatus::Hit));
    assert_eq!(hit.body, miss.body);

    // Unknown ids are 404 and are not cached
    let missing = handler.get_order("nope", false).await;
    assert_eq!(missing.status, STATUS_NOT_FOUND);
    assert!(!system.lookup.cache().contains(&OrderUid::from("nope")));

    drop(handler);
    let summary = system.shutdown().await.expect("Shutdown failed");
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 1);
}

/// A correction in the store is invisible to plain reads until a refresh.
#[tokio::test]
async fn test_refresh_picks_up_store_correction() {
    let system = OrderSystem::start_with_records(&AppConfig::default(), vec![Order::sample("a")])
        .await
        .unwrap();
    let handler = system.handler();

    let mut corrected = Order::sample("a");
    corrected.track_number = "TRACK_CORRECTED".to_string();
    let previous = system.store.replace(corrected).await.unwrap();
    assert_eq!(previous, Some(Order::sample("a")));

    let cached = handler.get_order("a", false).await;
    assert_eq!(cached.cache, Some(CacheStatus::Hit));
    assert_ne!(cached.body["track_number"], "TRACK_CORRECTED");

    let refreshed = handler.get_order("a", true).await;
    assert_eq!(refreshed.cache, Some(CacheStatus::Miss));
    assert_eq!(refreshed.body["track_number"], "TRACK_CORRECTED");

    let after = handler.get_order("a", false).await;
    assert_eq!(after.cache, Some(CacheStatus::Hit));
    assert_eq!(after.body["track_number"], "TRACK_CORRECTED");

    drop(handler);
    system.shutdown().await.unwrap();
}

/// Expired entries are swept without any reads, then served from the store again.
#[tokio::test(start_paused = true)]
async fn test_sweeper_expires_entries() {
    let config = AppConfig::from_toml("[cache]\nttl_secs = 60").unwrap();
    let seed = vec![Order::sample("a"), Order::sample("b")];
    let system = OrderSystem::start_with_records(&config, seed)
        .await
        .unwrap();
    assert_eq!(system.lookup.cache().len(), 2);

    // ttl + ttl/2 is the worst case for the sweep
    tokio::time::sleep(Duration::from_secs(91)).await;
    assert_eq!(system.lookup.cache().len(), 0);
    assert_eq!(system.lookup.stats().swept_entries, 2);

    let result = system.lookup.get_by_id(&OrderUid::from("a")).await.unwrap();
    assert!(!result.from_cache);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cold_start_without_warmup() {
    let config = AppConfig::from_toml("[cache]\nwarm_on_start = false").unwrap();
    let system = OrderSystem::start_with_records(&config, vec![Order::sample("a")])
        .await
        .unwrap();
    assert!(system.lookup.cache().is_empty());

    let result = system.lookup.get_by_id(&OrderUid::from("a")).await.unwrap();
    assert!(!result.from_cache);
    assert_eq!(system.lookup.cache().len(), 1);

    system.shutdown().await.unwrap();
}

/// Store clients held past shutdown fail fast instead of hanging.
#[tokio::test]
async fn test_shutdown_with_lingering_store_client() {
    let system = OrderSystem::start(&AppConfig::default()).await.unwrap();
    let lingering = system.store.clone();

    let summary = system.shutdown().await.unwrap();
    assert_eq!(summary.accepted, 0);

    let result = lingering.get(&OrderUid::from("any")).await;
    assert_eq!(result, Err(StoreError::Closed));
}
