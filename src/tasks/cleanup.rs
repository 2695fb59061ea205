//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

// == Sweeper ==
/// Handle to a running cleanup task.
///
/// Dropping the handle also ends the task at its next wake-up, but only
/// [`Sweeper::stop`] waits for it to finish.
#[derive(Debug)]
pub struct Sweeper {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Signals the task to stop and waits until it has exited.
    pub async fn stop(self) {
        // The task may already be gone if the cache was dropped.
        let _ = self.stop_tx.send(());
        let _ = self.handle.await;
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// Every `interval` the task takes the write lock and removes expired
/// entries, each counted as an eviction. It runs until stopped through the
/// returned [`Sweeper`], until the handle is dropped, or until the store
/// itself has been dropped.
///
/// # Arguments
/// * `name` - Cache name used in log lines
/// * `cache` - Weak reference to the store, so the task never keeps it alive
/// * `interval` - Time between cleanup runs; must be non-zero
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<String>::new(CacheConfig::default())));
/// let sweeper = spawn_cleanup_task("sessions", Arc::downgrade(&store), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_cleanup_task<V>(
    name: &str,
    cache: Weak<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> Sweeper
where
    V: Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let name = name.to_string();

    let handle = tokio::spawn(async move {
        debug!(
            "Starting TTL cleanup task for cache '{}' with interval of {:?}",
            name, interval
        );

        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let Some(cache) = cache.upgrade() else {
                break;
            };

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries from '{}'", removed, name);
            } else {
                debug!("TTL cleanup: no expired entries found in '{}'", name);
            }
        }

        debug!("TTL cleanup task for cache '{}' stopped", name);
    });

    Sweeper { stop_tx, handle }
}
