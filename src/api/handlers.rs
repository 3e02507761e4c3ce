//! API Handlers
//!
//! HTTP request handlers exposing the navigation cache operations.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{
    derive_list_key, derive_metadata_key, with_cache, CacheEntry, NavigationCache, SharedCache,
};
use crate::config::Config;
use crate::error::{CacheError, Result, StorageError};
use crate::models::{
    CacheQuery, ClearResponse, DeleteResponse, EntryResponse, ExpiryQuery, HealthResponse,
    SetCacheRequest, SetMetadataRequest, SetResponse, StatsResponse, UpdateSettingsRequest,
};
use crate::settings::CacheSettings;
use crate::storage::DynStorage;

/// Application state shared across all handlers.
///
/// Lock order is settings first, then cache.
#[derive(Clone)]
pub struct AppState {
    /// Shared navigation cache
    pub cache: SharedCache,
    /// User cache preferences
    pub settings: Arc<RwLock<CacheSettings>>,
}

impl AppState {
    /// Creates a new AppState with the given cache and settings.
    pub fn new(cache: NavigationCache<DynStorage>, settings: CacheSettings) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the configured storage backend and seeds the settings.
    pub fn from_config(config: &Config) -> std::result::Result<Self, StorageError> {
        let cache = NavigationCache::new(config.open_storage()?);
        let settings = CacheSettings::with_expiry_hours(config.cache_expiry_hours);
        Ok(Self::new(cache, settings))
    }

    async fn caching_enabled(&self) -> bool {
        self.settings.read().await.caching_enabled()
    }

    /// Expiry window from the query, falling back to the user's setting.
    async fn expiry_window(&self, requested: Option<u64>) -> Option<u64> {
        match requested {
            Some(window) => Some(window),
            None => self.settings.read().await.expiry_override_ms(),
        }
    }
}

/// Handler for GET /cache
///
/// Returns the cached list for `tags` + `mode`, 404 on miss.
pub async fn get_cache_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<EntryResponse>> {
    let tags = query.tag_list();
    let mode = query.mode;
    let key = derive_list_key(&tags, mode);
    let expiry = state.expiry_window(query.expiry_ms).await;

    let entry: Option<CacheEntry<Value>> =
        with_cache(&state.cache, move |cache| cache.get_cache(&tags, mode, expiry)).await?;

    match entry {
        Some(entry) => Ok(Json(EntryResponse::new(key, entry))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /cache
///
/// Stores a list under its filter signature. Nothing is written while
/// caching is disabled.
pub async fn set_cache_handler(
    State(state): State<AppState>,
    Json(req): Json<SetCacheRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = derive_list_key(&req.tags, req.mode);
    if !state.caching_enabled().await {
        debug!("Caching disabled, skipping write of {}", key);
        return Ok(Json(SetResponse::skipped(key)));
    }

    with_cache(&state.cache, move |cache| {
        cache.set_cache(&req.tags, req.mode, &req.data, req.metadata)
    })
    .await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /cache
///
/// Removes the list for `tags` + `mode`; succeeds when nothing was cached.
pub async fn delete_cache_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<DeleteResponse>> {
    let tags = query.tag_list();
    let mode = query.mode;
    let key = derive_list_key(&tags, mode);

    with_cache(&state.cache, move |cache| cache.remove_cache(&tags, mode)).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /metadata
pub async fn get_metadata_handler(
    State(state): State<AppState>,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<EntryResponse>> {
    let expiry = state.expiry_window(query.expiry_ms).await;

    let entry = with_cache(&state.cache, move |cache| {
        cache.get_metadata_cache::<Value>(expiry)
    })
    .await?;

    match entry {
        Some(entry) => Ok(Json(EntryResponse::new(derive_metadata_key(), entry))),
        None => Err(CacheError::NotFound(derive_metadata_key())),
    }
}

/// Handler for PUT /metadata
pub async fn set_metadata_handler(
    State(state): State<AppState>,
    Json(req): Json<SetMetadataRequest>,
) -> Result<Json<SetResponse>> {
    if req.data.is_null() {
        return Err(CacheError::InvalidRequest(
            "Data cannot be null".to_string(),
        ));
    }

    if !state.caching_enabled().await {
        debug!("Caching disabled, skipping metadata write");
        return Ok(Json(SetResponse::skipped(derive_metadata_key())));
    }

    with_cache(&state.cache, move |cache| cache.set_metadata_cache(&req.data)).await?;

    Ok(Json(SetResponse::new(derive_metadata_key())))
}

/// Handler for DELETE /metadata
pub async fn delete_metadata_handler(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>> {
    with_cache(&state.cache, |cache| cache.remove_metadata_cache()).await?;

    Ok(Json(DeleteResponse::new(derive_metadata_key())))
}

/// Handler for POST /cache/clear
pub async fn clear_all_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = with_cache(&state.cache, |cache| cache.clear_all_cache()).await?;

    Ok(Json(ClearResponse { removed }))
}

/// Handler for POST /cache/clear-expired
pub async fn clear_expired_handler(
    State(state): State<AppState>,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<ClearResponse>> {
    let expiry = state.expiry_window(query.expiry_ms).await;

    let removed =
        with_cache(&state.cache, move |cache| cache.clear_expired_cache(expiry)).await?;

    Ok(Json(ClearResponse { removed }))
}

/// Handler for GET /stats
///
/// Returns a snapshot of what the cache holds.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = with_cache(&state.cache, |cache| cache.cache_stats()).await?;

    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<CacheSettings> {
    Json(*state.settings.read().await)
}

/// Handler for PUT /settings
///
/// Setting `cache_expiry_hours` to 0 clears the cache.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<CacheSettings>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut settings = state.settings.write().await;
    let mut updated = *settings;
    if let Some(mode) = req.tag_filter_mode {
        updated.tag_filter_mode = mode;
    }
    if let Some(hours) = req.cache_expiry_hours {
        updated = with_cache(&state.cache, move |cache| {
            updated.set_cache_expiry_hours(hours, cache)?;
            Ok(updated)
        })
        .await?;
    }
    *settings = updated;

    Ok(Json(updated))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
