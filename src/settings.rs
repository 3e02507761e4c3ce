//! Settings Module
//!
//! User-facing cache preferences: how long cached lists stay fresh and the
//! default tag filter mode.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{FilterMode, NavigationCache};
use crate::error::Result;
use crate::storage::Storage;

/// Default freshness in hours
pub const DEFAULT_CACHE_EXPIRY_HOURS: u64 = 24;

/// Longest selectable freshness (30 days)
pub const MAX_CACHE_EXPIRY_HOURS: u64 = 720;

const MS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Cache preferences chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Freshness window in hours, 0 disables caching
    pub cache_expiry_hours: u64,
    /// How selected tags combine
    pub tag_filter_mode: FilterMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_expiry_hours: DEFAULT_CACHE_EXPIRY_HOURS,
            tag_filter_mode: FilterMode::Single,
        }
    }
}

impl CacheSettings {
    pub fn with_expiry_hours(hours: u64) -> Self {
        Self {
            cache_expiry_hours: hours,
            ..Self::default()
        }
    }

    /// False when the user turned caching off.
    pub fn caching_enabled(&self) -> bool {
        self.cache_expiry_hours > 0
    }

    /// Expiry window to pass to cache reads.
    pub fn expiry_override_ms(&self) -> Option<u64> {
        Some(self.cache_expiry_hours.saturating_mul(MS_PER_HOUR))
    }

    /// Changes the freshness window.
    ///
    /// Turning caching off (0 hours) wipes every cached record at once.
    pub fn set_cache_expiry_hours<S: Storage>(
        &mut self,
        hours: u64,
        cache: &mut NavigationCache<S>,
    ) -> Result<()> {
        self.cache_expiry_hours = hours;
        if hours == 0 {
            let removed = cache.clear_all_cache()?;
            info!("Caching disabled, removed {} cached entries", removed);
        }
        Ok(())
    }

    /// Restores defaults. Cached data is left alone.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
