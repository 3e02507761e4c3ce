//! Payload types and API request/response models
//!
//! `navigation` holds the data the cache stores; `requests` and `responses`
//! are the DTOs of the HTTP API.

pub mod navigation;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use navigation::{DatabaseMetadata, NavigationItem, TagOption};
pub use requests::{
    CacheQuery, ExpiryQuery, SetCacheRequest, SetMetadataRequest, UpdateSettingsRequest,
};
pub use responses::{
    ClearResponse, DeleteResponse, EntryResponse, ErrorResponse, HealthResponse, SetResponse,
    StatsResponse,
};
