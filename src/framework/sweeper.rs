//! # Background Sweep
//!
//! The sweep task removes expired entries from a [`TtlCache`] on a fixed period. It is owned
//! through a [`SweepHandle`]: closing the handle (or dropping it) stops the task.

use crate::framework::{Record, TtlCache};
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Owner of a running sweep task.
///
/// `close` consumes the handle, so a sweep can only be stopped once. Dropping the handle
/// without calling `close` also stops the task at its next scheduling point.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweepHandle {
    pub(crate) fn spawn<T: Record>(cache: Weak<TtlCache<T>>, period: Duration) -> Self {
        let (shutdown, mut stop) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "Sweeper started");

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit close and when the handle is dropped.
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else {
                            debug!("Cache dropped, sweeper exiting");
                            break;
                        };
                        cache.sweep_expired();
                    }
                }
            }

            info!("Sweeper stopped");
        });

        Self { shutdown, handle }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the task to stop and waits until it has exited.
    pub async fn close(self) -> Result<(), JoinError> {
        let _ = self.shutdown.send(());
        self.handle.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderUid};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_removed_within_ttl_plus_period() {
        let ttl = Duration::from_secs(60);
        let cache = Arc::new(TtlCache::<Order>::new(ttl));
        let sweeper = cache.spawn_sweeper();

        cache.set(OrderUid::from("a"), Order::sample("a"));
        cache.set(OrderUid::from("b"), Order::sample("b"));

        // Nothing is stale yet at the first tick.
        sleep(cache.sweep_period() + Duration::from_millis(1)).await;
        assert_eq!(cache.len(), 2);

        sleep(ttl + cache.sweep_period()).await;
        assert_eq!(cache.len(), 0, "no read was needed to evict");
        assert_eq!(cache.stats().swept_entries, 2);

        sweeper.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_task() {
        let cache = Arc::new(TtlCache::<Order>::new(Duration::from_secs(60)));
        let sweeper = cache.spawn_sweeper();
        assert!(!sweeper.is_finished());

        sweeper.close().await.unwrap();

        // With the sweeper gone, a stale entry stays until something reads it.
        cache.set(OrderUid::from("a"), Order::sample("a"));
        sleep(Duration::from_secs(600)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expired_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let cache = Arc::new(TtlCache::<Order>::new(Duration::from_secs(60)));
        drop(cache.spawn_sweeper());

        cache.set(OrderUid::from("a"), Order::sample("a"));
        sleep(Duration::from_secs(600)).await;
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_exits_when_cache_dropped() {
        let cache = Arc::new(TtlCache::<Order>::new(Duration::from_secs(10)));
        let sweeper = cache.spawn_sweeper();
        drop(cache);

        sleep(Duration::from_secs(6)).await;
        assert!(sweeper.is_finished());
        sweeper.close().await.unwrap();
    }
}
