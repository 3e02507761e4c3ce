//! Cache Module
//!
//! Navigation-list and metadata caching over persistent storage, with
//! read-time expiry and oldest-first eviction under quota pressure.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::storage::DynStorage;

mod entry;
mod index;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::{is_expired, probe_timestamp, CacheEntry, EntryMetadata};
pub use index::{RecordIndex, RecordSummary};
pub use key::{derive_list_key, derive_metadata_key, is_managed_key, FilterMode};
pub use stats::{format_bytes, format_timestamp, CacheStats};
pub use store::{eviction_count, NavigationCache};

/// Cache over a type-erased backend, shared between async tasks.
///
/// Every operation takes the write lock, since reads delete expired and
/// corrupted records and stats fill the record index.
pub type SharedCache = Arc<RwLock<NavigationCache<DynStorage>>>;

/// Runs `f` against the shared cache on the blocking thread pool.
///
/// Storage backends do synchronous I/O, so cache calls stay off the async
/// worker threads.
pub async fn with_cache<F, R>(cache: &SharedCache, f: F) -> Result<R>
where
    F: FnOnce(&mut NavigationCache<DynStorage>) -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let cache = Arc::clone(cache);
    tokio::task::spawn_blocking(move || {
        let mut guard = cache.blocking_write();
        f(&mut *guard)
    })
    .await
    .map_err(|e| CacheError::Internal(format!("Cache task failed: {}", e)))?
}

// == Public Constants ==
/// Prefix shared by every key this cache writes
pub const CACHE_PREFIX: &str = "nav_notion_cache_";

/// Payload-shape version embedded in every key; bump to orphan old records
pub const CACHE_VERSION: &str = "1.0";

/// Separator between sorted tags in a list key
pub const TAG_DELIMITER: &str = ",";

/// Default expiry window in milliseconds (24 hours)
pub const DEFAULT_EXPIRY_MS: u64 = 24 * 60 * 60 * 1000;

/// Share of cache records removed by one pruning pass
pub const EVICTION_FRACTION: f64 = 0.25;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::{json, Value};

    fn create_shared_cache() -> SharedCache {
        let storage: DynStorage = Box::new(MemoryStorage::new());
        Arc::new(RwLock::new(NavigationCache::new(storage)))
    }

    #[tokio::test]
    async fn test_with_cache_runs_operations() {
        let cache = create_shared_cache();

        with_cache(&cache, |cache| {
            cache.set_cache(&["x"], FilterMode::Single, &json!([1]), None)
        })
        .await
        .unwrap();

        let entry = with_cache(&cache, |cache| {
            cache.get_cache::<Value, _>(&["x"], FilterMode::Single, None)
        })
        .await
        .unwrap();
        assert_eq!(entry.map(|entry| entry.data), Some(json!([1])));
    }

    #[tokio::test]
    async fn test_with_cache_reports_panics_as_internal() {
        let cache = create_shared_cache();

        let result: Result<()> = with_cache(&cache, |_| panic!("boom")).await;
        assert!(matches!(result, Err(CacheError::Internal(_))));
    }
}
