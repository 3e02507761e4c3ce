//! Navigation Cache - client-side caching for tag-filtered navigation lists
//!
//! Stores navigation lists and database metadata in persistent key-value
//! storage with read-time expiry, corruption self-healing and oldest-first
//! eviction when the storage quota is exhausted.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod settings;
pub mod storage;

pub use api::AppState;
pub use cache::{FilterMode, NavigationCache, SharedCache};
pub use config::Config;
pub use loader::{NavigationLoader, NavigationSource};
pub use settings::CacheSettings;
