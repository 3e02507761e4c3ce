//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, EntryMetadata};

/// Response body for a cache hit (GET /cache, GET /metadata)
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    /// The derived storage key
    pub key: String,
    /// Write time (Unix milliseconds)
    pub timestamp: u64,
    /// The cached payload
    pub data: Value,
    /// Side-channel metadata, if any was stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

impl EntryResponse {
    /// Creates a new EntryResponse from a cache entry
    pub fn new(key: impl Into<String>, entry: CacheEntry<Value>) -> Self {
        Self {
            key: key.into(),
            timestamp: entry.timestamp,
            data: entry.data,
            metadata: entry.metadata,
        }
    }
}

/// Response body for write operations (PUT /cache, PUT /metadata)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
    /// False when caching is disabled and nothing was written
    pub stored: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached", key),
            key,
            stored: true,
        }
    }

    /// Response for a write skipped because caching is disabled
    pub fn skipped(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Caching disabled, key '{}' not stored", key),
            key,
            stored: false,
        }
    }
}

/// Response body for single-key removal (DELETE /cache, DELETE /metadata)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for bulk removal (POST /cache/clear, /cache/clear-expired)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of records deleted
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Number of cache records
    pub item_count: usize,
    /// Total serialized size, human readable
    pub total_size: String,
    /// Total serialized size in bytes
    pub total_bytes: usize,
    /// Oldest write time in local time, null when empty
    pub oldest_cache: Option<String>,
    /// Newest write time in local time, null when empty
    pub newest_cache: Option<String>,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            item_count: stats.item_count,
            total_size: stats.total_size(),
            total_bytes: stats.total_bytes,
            oldest_cache: stats.oldest_cache(),
            newest_cache: stats.newest_cache(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
