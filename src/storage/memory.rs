//! In-memory storage backend.

use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::storage::{check_quota, Storage};

// == Memory Storage ==
/// Map-backed storage with optional byte quota.
///
/// Size accounting counts key bytes plus value bytes, the way browser
/// storage charges an origin.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    used: usize,
    disabled: bool,
}

impl MemoryStorage {
    /// Creates an unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Simulates storage being switched off (private browsing, policy).
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Bytes currently charged against the quota.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_enabled(&self) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable(
                "memory storage is disabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn record_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_enabled()?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_enabled()?;

        let old_size = self
            .entries
            .get(key)
            .map(|old| record_size(key, old))
            .unwrap_or(0);
        let new_size = record_size(key, value);
        check_quota(key, self.quota, self.used, old_size, new_size)?;

        self.entries.insert(key.to_string(), value.to_string());
        self.used = self.used - old_size + new_size;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.ensure_enabled()?;
        if let Some(old) = self.entries.remove(key) {
            self.used -= record_size(key, &old);
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        self.ensure_enabled()?;
        Ok(self.entries.keys().cloned().collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let mut storage = MemoryStorage::new();
        storage.write("key1", "value1").unwrap();

        assert_eq!(storage.read("key1").unwrap().as_deref(), Some("value1"));
        assert!(storage.read("missing").unwrap().is_none());
        assert_eq!(storage.used_bytes(), 10);
    }

    #[test]
    fn test_overwrite_charges_delta() {
        let mut storage = MemoryStorage::with_quota(12);
        storage.write("k", "12345").unwrap();
        // 1 + 11 = 12 fits because the old 6 bytes are released
        storage.write("k", "12345678901").unwrap();
        assert_eq!(storage.used_bytes(), 12);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_quota_exceeded() {
        let mut storage = MemoryStorage::with_quota(8);
        storage.write("a", "123").unwrap();

        let err = storage.write("b", "123456").unwrap_err();
        assert!(err.is_quota_exceeded());
        // Failed write leaves the store untouched
        assert!(storage.read("b").unwrap().is_none());
        assert_eq!(storage.used_bytes(), 4);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut storage = MemoryStorage::new();
        storage.write("a", "1").unwrap();
        storage.delete("a").unwrap();
        storage.delete("a").unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.used_bytes(), 0);
    }

    #[test]
    fn test_disabled_storage_is_unavailable() {
        let mut storage = MemoryStorage::new();
        storage.set_disabled(true);

        assert!(matches!(
            storage.write("a", "1"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(storage.read("a"), Err(StorageError::Unavailable(_))));
    }
}
