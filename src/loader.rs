//! Loader Module
//!
//! Cache-or-fetch data loading for the dashboard. The remote source (a Notion
//! database behind some HTTP route) is abstracted as `NavigationSource`; the
//! loader consults the cache first and stores what it fetches, treating the
//! cache as best-effort throughout.

use std::collections::BTreeSet;
use std::future::Future;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::{with_cache, CacheEntry, EntryMetadata, FilterMode, SharedCache};
use crate::models::{DatabaseMetadata, NavigationItem};
use crate::settings::CacheSettings;

const NEXT_CURSOR_FIELD: &str = "nextCursor";
const HAS_MORE_FIELD: &str = "hasMore";

// == Navigation Source ==
/// Remote supplier of navigation data, consulted on cache misses.
pub trait NavigationSource: Send + Sync {
    /// Fetches the items matching a filter signature.
    fn fetch_items(
        &self,
        tags: &[String],
        mode: FilterMode,
    ) -> impl Future<Output = anyhow::Result<ItemPage>> + Send;

    /// Fetches the database metadata record.
    fn fetch_metadata(&self) -> impl Future<Output = anyhow::Result<DatabaseMetadata>> + Send;
}

/// One page of navigation items plus its pagination cursor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemPage {
    pub items: Vec<NavigationItem>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl ItemPage {
    fn to_metadata(&self) -> EntryMetadata {
        let mut metadata = EntryMetadata::new();
        metadata.insert(NEXT_CURSOR_FIELD.to_string(), json!(self.next_cursor));
        metadata.insert(HAS_MORE_FIELD.to_string(), json!(self.has_more));
        metadata
    }

    fn from_entry(entry: CacheEntry<Vec<NavigationItem>>) -> Self {
        let metadata = entry.metadata.unwrap_or_default();
        Self {
            items: entry.data,
            next_cursor: metadata
                .get(NEXT_CURSOR_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            has_more: metadata
                .get(HAS_MORE_FIELD)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Result of a load, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    /// True when served from the cache
    pub from_cache: bool,
    /// Write time of the cache entry that served this load
    pub cached_at: Option<u64>,
}

impl<T> Loaded<T> {
    fn fresh(data: T) -> Self {
        Self {
            data,
            from_cache: false,
            cached_at: None,
        }
    }

    fn cached(data: T, timestamp: u64) -> Self {
        Self {
            data,
            from_cache: true,
            cached_at: Some(timestamp),
        }
    }
}

// == Navigation Loader ==
/// Combines a shared cache with a remote source.
pub struct NavigationLoader<Src> {
    cache: SharedCache,
    source: Src,
}

impl<Src: NavigationSource> NavigationLoader<Src> {
    pub fn new(cache: SharedCache, source: Src) -> Self {
        Self { cache, source }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Load Items ==
    /// Returns the items for a filter signature, from cache when fresh.
    ///
    /// Only a failing fetch is an error; cache faults are logged and the
    /// load carries on without the cache.
    pub async fn load_items(
        &self,
        tags: &[String],
        mode: FilterMode,
        settings: &CacheSettings,
        force_refresh: bool,
    ) -> anyhow::Result<Loaded<ItemPage>> {
        if settings.caching_enabled() && !force_refresh {
            let owned_tags = tags.to_vec();
            let expiry = settings.expiry_override_ms();
            let cached = with_cache(&self.cache, move |cache| {
                cache.get_cache::<Vec<NavigationItem>, _>(&owned_tags, mode, expiry)
            })
            .await;
            match cached {
                Ok(Some(entry)) => {
                    let timestamp = entry.timestamp;
                    return Ok(Loaded::cached(ItemPage::from_entry(entry), timestamp));
                }
                Ok(None) => debug!("No cached items for {:?} ({})", tags, mode),
                Err(e) => warn!("Cache read failed, fetching directly: {}", e),
            }
        }

        let page = self
            .source
            .fetch_items(tags, mode)
            .await
            .context("Failed to fetch navigation items")?;

        if settings.caching_enabled() {
            let owned_tags = tags.to_vec();
            let items = page.items.clone();
            let metadata = page.to_metadata();
            let stored = with_cache(&self.cache, move |cache| {
                cache.set_cache(&owned_tags, mode, &items, Some(metadata))
            })
            .await;
            if let Err(e) = stored {
                warn!("Cache write failed, continuing without cache: {}", e);
            }
        }

        Ok(Loaded::fresh(page))
    }

    // == Load Metadata ==
    /// Returns the database metadata, from cache when fresh.
    pub async fn load_metadata(
        &self,
        settings: &CacheSettings,
        force_refresh: bool,
    ) -> anyhow::Result<Loaded<DatabaseMetadata>> {
        if settings.caching_enabled() && !force_refresh {
            let expiry = settings.expiry_override_ms();
            let cached = with_cache(&self.cache, move |cache| {
                cache.get_metadata_cache::<DatabaseMetadata>(expiry)
            })
            .await;
            match cached {
                Ok(Some(entry)) => return Ok(Loaded::cached(entry.data, entry.timestamp)),
                Ok(None) => debug!("No cached database metadata"),
                Err(e) => warn!("Cache read failed, fetching directly: {}", e),
            }
        }

        let metadata = self
            .source
            .fetch_metadata()
            .await
            .context("Failed to fetch database metadata")?;

        if settings.caching_enabled() {
            let record = metadata.clone();
            let stored =
                with_cache(&self.cache, move |cache| cache.set_metadata_cache(&record)).await;
            if let Err(e) = stored {
                warn!("Cache write failed, continuing without cache: {}", e);
            }
        }

        Ok(Loaded::fresh(metadata))
    }
}

/// Sorted, de-duplicated tags across a set of items.
pub fn collect_tags(items: &[NavigationItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
