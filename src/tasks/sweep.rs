//! Cache Expiry Sweep
//!
//! Background task that periodically removes expired cache entries, whether
//! or not anyone reads them again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that sweeps expired entries from `cache`.
///
/// The first sweep runs one `interval` after spawning. The returned handle
/// is used to abort the task on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::new(CacheConfig::default()));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: Arc<CacheStore<V>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Serialize + Send + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting cache expiry sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!(removed, remaining = cache.len(), "Cache sweep removed expired entries");
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
