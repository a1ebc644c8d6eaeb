//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::PolicyCaches;

/// Shortest pause between two sweeps. Each sweep takes every region's write
/// lock, so a zero interval would spin on them.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a background task that periodically purges expired entries from
/// every cache region.
///
/// Expired entries already read as misses; the sweep only returns their
/// memory without waiting for the next lookup.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(caches: Arc<PolicyCaches>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_task_every(caches, Duration::from_secs(cleanup_interval_secs))
}

/// Same as [`spawn_cleanup_task`] with an arbitrary interval, raised to
/// [`MIN_CLEANUP_INTERVAL`] if shorter.
pub fn spawn_cleanup_task_every(caches: Arc<PolicyCaches>, interval: Duration) -> JoinHandle<()> {
    let interval = sweep_interval(interval);
    tokio::spawn(async move {
        info!(?interval, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = caches.purge_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

fn sweep_interval(requested: Duration) -> Duration {
    if requested < MIN_CLEANUP_INTERVAL {
        warn!(
            ?requested,
            minimum = ?MIN_CLEANUP_INTERVAL,
            "Cleanup interval too short, using the minimum"
        );
        return MIN_CLEANUP_INTERVAL;
    }
    requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RegionPolicy;
    use crate::filter::PolicyFilter;

    fn short_lived_caches() -> Arc<PolicyCaches> {
        Arc::new(PolicyCaches::new(RegionPolicy::bounded(
            100,
            Duration::from_millis(50),
        )))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let caches = short_lived_caches();
        caches
            .filtered
            .put(PolicyFilter::default().signature(), Vec::new())
            .await;

        let handle = spawn_cleanup_task_every(caches.clone(), Duration::from_millis(30));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(
            caches.filtered.is_empty().await,
            "Expired entry should have been cleaned up"
        );
        assert_eq!(caches.filtered.stats().await.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_unexpiring_regions() {
        let caches = short_lived_caches();
        caches
            .by_id
            .put(1, crate::models::policy::fixtures::record(1, "AP-1"))
            .await;

        let handle = spawn_cleanup_task_every(caches.clone(), Duration::from_millis(30));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(caches.by_id.len().await, 1, "by-id entries never expire");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(short_lived_caches(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[test]
    fn test_zero_interval_is_raised_to_minimum() {
        assert_eq!(sweep_interval(Duration::ZERO), MIN_CLEANUP_INTERVAL);
        assert_eq!(sweep_interval(Duration::from_millis(1)), MIN_CLEANUP_INTERVAL);
        assert_eq!(sweep_interval(Duration::from_secs(60)), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_zero_interval_still_sweeps() {
        let caches = short_lived_caches();
        caches
            .filtered
            .put(PolicyFilter::default().signature(), Vec::new())
            .await;

        let handle = spawn_cleanup_task(caches.clone(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(caches.filtered.is_empty().await);
        assert!(!handle.is_finished());

        handle.abort();
    }
}
