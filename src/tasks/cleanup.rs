//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cached artifacts.
//! Expiry is also discovered lazily on read; this task reclaims memory
//! eagerly in long-running hosts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ArtifactCache;

/// Spawns a background task that periodically sweeps expired artifacts.
///
/// The task runs in an infinite loop, sleeping for the specified
/// interval between sweeps. It acquires a write lock on the cache to
/// remove expired entries.
///
/// # Arguments
/// * `cache` - Shared reference to the artifact cache
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the
/// task during shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<ArtifactCache>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting artifact TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired artifacts", removed);
            } else {
                debug!("TTL cleanup: no expired artifacts found");
            }
        }
    })
}
