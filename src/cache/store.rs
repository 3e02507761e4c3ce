//! Cache Store Module
//!
//! Main cache engine: memoizes navigation lists and database metadata over a
//! quota-limited `Storage`, with read-time expiry and oldest-first pruning
//! when a write runs out of room.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::entry::{is_expired, CacheEntry, EntryMetadata};
use crate::cache::index::{RecordIndex, RecordSummary};
use crate::cache::key::{derive_list_key, derive_metadata_key, FilterMode};
use crate::cache::{CacheStats, DEFAULT_EXPIRY_MS, EVICTION_FRACTION};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StorageError};
use crate::storage::Storage;

// == Navigation Cache ==
/// Cache of filtered navigation lists and the database metadata record.
///
/// Every operation runs synchronously against the backing store; nothing
/// happens in the background. Reads take `&mut self` because they delete
/// expired and corrupted records on the way.
///
/// Bulk operations walk a `RecordIndex` built on first use and updated on
/// every write and delete, so they never re-read payloads.
pub struct NavigationCache<S: Storage> {
    /// Persistent key-value backend
    storage: S,
    /// Time source for stamping and ageing entries
    clock: Arc<dyn Clock>,
    /// Expiry window in milliseconds when no override is given
    default_expiry_ms: u64,
    /// Record summaries, None until the first bulk operation
    index: Option<RecordIndex>,
}

impl<S: Storage> NavigationCache<S> {
    // == Constructor ==
    /// Creates a cache over `storage` using the system clock and a 24 hour
    /// default expiry.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit clock.
    pub fn with_clock(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            default_expiry_ms: DEFAULT_EXPIRY_MS,
            index: None,
        }
    }

    /// Replaces the default expiry window.
    pub fn with_default_expiry(mut self, expiry_ms: u64) -> Self {
        self.default_expiry_ms = expiry_ms;
        self
    }

    pub fn default_expiry_ms(&self) -> u64 {
        self.default_expiry_ms
    }

    /// Borrows the backing store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrows the backing store.
    ///
    /// Writes made this way bypass the cache, so the record index is
    /// dropped and rebuilt on the next bulk operation.
    pub fn storage_mut(&mut self) -> &mut S {
        self.index = None;
        &mut self.storage
    }

    // == List Cache ==
    /// Returns the cached list for a filter signature, None on miss.
    pub fn get_cache<T, Tag>(
        &mut self,
        tags: &[Tag],
        mode: FilterMode,
        expiry_override: Option<u64>,
    ) -> Result<Option<CacheEntry<T>>>
    where
        T: DeserializeOwned,
        Tag: AsRef<str>,
    {
        let key = derive_list_key(tags, mode);
        self.get_entry(&key, expiry_override)
    }

    /// Stores a list for a filter signature, replacing any previous one.
    pub fn set_cache<T, Tag>(
        &mut self,
        tags: &[Tag],
        mode: FilterMode,
        data: &T,
        metadata: Option<EntryMetadata>,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
        Tag: AsRef<str>,
    {
        let key = derive_list_key(tags, mode);
        self.set_entry(&key, data, metadata)
    }

    /// Drops the list cached for a filter signature.
    pub fn remove_cache<Tag: AsRef<str>>(&mut self, tags: &[Tag], mode: FilterMode) -> Result<()> {
        let key = derive_list_key(tags, mode);
        self.delete_record(&key)
    }

    // == Metadata Cache ==
    /// Returns the cached database metadata, None on miss.
    pub fn get_metadata_cache<T: DeserializeOwned>(
        &mut self,
        expiry_override: Option<u64>,
    ) -> Result<Option<CacheEntry<T>>> {
        self.get_entry(&derive_metadata_key(), expiry_override)
    }

    /// Stores the database metadata record.
    pub fn set_metadata_cache<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<()> {
        self.set_entry(&derive_metadata_key(), data, None)
    }

    /// Drops the database metadata record.
    pub fn remove_metadata_cache(&mut self) -> Result<()> {
        self.delete_record(&derive_metadata_key())
    }

    // == Get Entry ==
    /// Shared read path for both cache domains.
    ///
    /// Corrupted records and expired entries are deleted and reported as a
    /// miss.
    pub fn get_entry<T: DeserializeOwned>(
        &mut self,
        key: &str,
        expiry_override: Option<u64>,
    ) -> Result<Option<CacheEntry<T>>> {
        let Some(raw) = self.storage.read(key)? else {
            debug!("Cache miss: {}", key);
            return Ok(None);
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Corrupted cache record {}, removing: {}", key, e);
                self.delete_record(key)?;
                return Ok(None);
            }
        };

        let window = expiry_override.unwrap_or(self.default_expiry_ms);
        let now = self.clock.now_ms();
        if entry.is_expired_at(now, window) {
            debug!(
                "Cache entry {} expired (age {}ms, window {}ms)",
                key,
                entry.age_ms(now),
                window
            );
            self.delete_record(key)?;
            return Ok(None);
        }

        debug!("Cache hit: {}", key);
        Ok(Some(entry))
    }

    // == Set Entry ==
    /// Shared write path for both cache domains.
    ///
    /// A quota failure triggers one pruning pass and one retry; if the retry
    /// also runs out of room the write is dropped and `Ok(())` returned. Any
    /// other storage failure is returned to the caller.
    pub fn set_entry<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        data: &T,
        metadata: Option<EntryMetadata>,
    ) -> Result<()> {
        let entry = CacheEntry::new(self.clock.now_ms(), data, metadata);
        let raw = serde_json::to_string(&entry)?;

        match self.write_record(key, &raw) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_quota_exceeded() => {
                warn!("Storage quota exceeded writing {}, pruning old entries", key);
            }
            Err(e) => return Err(e.into()),
        }

        self.prune_oldest()?;

        match self.write_record(key, &raw) {
            Ok(()) => Ok(()),
            Err(e) if e.is_quota_exceeded() => {
                error!("Failed to write cache entry {} after pruning: {}", key, e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    // == Clear All ==
    /// Deletes every record carrying the cache prefix, from any version.
    ///
    /// Returns the number of records removed.
    pub fn clear_all_cache(&mut self) -> Result<usize> {
        let keys: Vec<String> = self
            .index()?
            .snapshot()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            self.delete_record(key)?;
        }
        info!("Cleared {} cache entries", keys.len());
        Ok(keys.len())
    }

    // == Clear Expired ==
    /// Deletes records older than the window, plus any record whose
    /// timestamp cannot be read.
    ///
    /// Returns the number of records removed.
    pub fn clear_expired_cache(&mut self, expiry_override: Option<u64>) -> Result<usize> {
        let window = expiry_override.unwrap_or(self.default_expiry_ms);
        let now = self.clock.now_ms();
        let records = self.index()?.snapshot();
        let mut removed = 0;

        for (key, summary) in records {
            let stale = match summary.timestamp {
                Some(timestamp) => is_expired(timestamp, now, window),
                None => {
                    warn!("Corrupted cache record {}, removing", key);
                    true
                }
            };
            if stale {
                self.delete_record(&key)?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Expiry sweep: removed {} cache entries", removed);
        } else {
            debug!("Expiry sweep: no expired entries found");
        }
        Ok(removed)
    }

    // == Prune Oldest ==
    /// Evicts the oldest quarter of cache records (at least one when any
    /// exist), ordered by write time.
    ///
    /// Records without a readable timestamp sort as oldest. Returns the
    /// number of records removed.
    pub fn prune_oldest(&mut self) -> Result<usize> {
        let candidates = self.index()?.oldest_first();
        if candidates.is_empty() {
            return Ok(0);
        }

        let evict_count = eviction_count(candidates.len());
        for key in candidates.iter().take(evict_count) {
            self.delete_record(key)?;
        }

        info!(
            "Pruned {} of {} cache entries",
            evict_count,
            candidates.len()
        );
        Ok(evict_count)
    }

    // == Stats ==
    /// Scans the cache records and summarizes them.
    ///
    /// Records whose timestamp cannot be read are skipped. The first call
    /// builds the record index; later calls never touch payloads.
    pub fn cache_stats(&mut self) -> Result<CacheStats> {
        let records = self.index()?.snapshot();

        let mut stats = CacheStats::new();
        for (_, summary) in records {
            if let Some(timestamp) = summary.timestamp {
                stats.record_entry(summary.bytes, timestamp);
            }
        }
        Ok(stats)
    }

    // == Record Index ==
    /// Returns the record index, building it from storage on first use.
    fn index(&mut self) -> std::result::Result<&RecordIndex, StorageError> {
        if self.index.is_none() {
            let index = RecordIndex::build(&self.storage)?;
            debug!("Built record index over {} cache entries", index.len());
            self.index = Some(index);
        }
        Ok(self.index.get_or_insert_with(RecordIndex::default))
    }

    fn write_record(&mut self, key: &str, raw: &str) -> std::result::Result<(), StorageError> {
        self.storage.write(key, raw)?;
        if let Some(index) = self.index.as_mut() {
            index.insert(key, RecordSummary::from_raw(raw));
        }
        Ok(())
    }

    fn delete_record(&mut self, key: &str) -> Result<()> {
        self.storage.delete(key)?;
        if let Some(index) = self.index.as_mut() {
            index.remove(key);
        }
        Ok(())
    }
}

/// Number of records one pruning pass removes from `count` candidates.
pub fn eviction_count(count: usize) -> usize {
    (count as f64 * EVICTION_FRACTION).ceil() as usize
}
