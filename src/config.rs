//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::StorageError;
use tracing::warn;

use crate::settings::{DEFAULT_CACHE_EXPIRY_HOURS, MAX_CACHE_EXPIRY_HOURS};
use crate::storage::{DynStorage, FileStorage, MemoryStorage, DEFAULT_QUOTA_BYTES};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Initial cache freshness in hours (0 disables caching)
    pub cache_expiry_hours: u64,
    /// Storage quota in bytes, None for unlimited
    pub storage_quota: Option<usize>,
    /// Directory for file-backed storage, None keeps records in memory
    pub storage_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_EXPIRY_HOURS` - Cache freshness in hours (default: 24, max: 720)
    /// - `STORAGE_QUOTA_BYTES` - Storage quota, 0 for unlimited (default: 5 MiB)
    /// - `STORAGE_DIR` - Directory for persistent storage (default: in-memory)
    pub fn from_env() -> Self {
        let quota = env::var("STORAGE_QUOTA_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_QUOTA_BYTES);

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_expiry_hours: parse_expiry_hours(env::var("CACHE_EXPIRY_HOURS").ok()),
            storage_quota: (quota > 0).then_some(quota),
            storage_dir: env::var("STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Opens the storage backend this configuration selects.
    pub fn open_storage(&self) -> Result<DynStorage, StorageError> {
        match &self.storage_dir {
            Some(dir) => Ok(Box::new(FileStorage::open(dir, self.storage_quota)?)),
            None => Ok(Box::new(match self.storage_quota {
                Some(quota) => MemoryStorage::with_quota(quota),
                None => MemoryStorage::new(),
            })),
        }
    }
}

/// Parses the expiry setting, clamping it to the limit `PUT /settings` enforces.
fn parse_expiry_hours(raw: Option<String>) -> u64 {
    let hours = raw
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_CACHE_EXPIRY_HOURS);
    if hours > MAX_CACHE_EXPIRY_HOURS {
        warn!(
            "CACHE_EXPIRY_HOURS={} exceeds {}, clamping",
            hours, MAX_CACHE_EXPIRY_HOURS
        );
        return MAX_CACHE_EXPIRY_HOURS;
    }
    hours
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_expiry_hours: DEFAULT_CACHE_EXPIRY_HOURS,
            storage_quota: Some(DEFAULT_QUOTA_BYTES),
            storage_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_expiry_hours, 24);
        assert_eq!(config.storage_quota, Some(5 * 1024 * 1024));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_EXPIRY_HOURS");
        env::remove_var("STORAGE_QUOTA_BYTES");
        env::remove_var("STORAGE_DIR");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_expiry_hours, 24);
        assert_eq!(config.storage_quota, Some(DEFAULT_QUOTA_BYTES));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_parse_expiry_hours() {
        assert_eq!(parse_expiry_hours(None), 24);
        assert_eq!(parse_expiry_hours(Some("abc".to_string())), 24);
        assert_eq!(parse_expiry_hours(Some("0".to_string())), 0);
        assert_eq!(parse_expiry_hours(Some(" 48 ".to_string())), 48);
        assert_eq!(parse_expiry_hours(Some("720".to_string())), 720);
        assert_eq!(parse_expiry_hours(Some("10000".to_string())), 720);
    }

    #[test]
    fn test_open_memory_storage() {
        let storage = Config::default().open_storage().unwrap();
        assert!(storage.list_keys().unwrap().is_empty());
    }

    #[test]
    fn test_open_file_storage() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config {
            storage_dir: Some(temp_dir.path().join("cache")),
            ..Config::default()
        };

        let mut storage = config.open_storage().unwrap();
        storage.write("k", "v").unwrap();
        assert!(temp_dir.path().join("cache").exists());
    }
}
