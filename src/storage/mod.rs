//! Storage Module
//!
//! Synchronous key-value backends the cache persists its records into.
//!
//! # Backends
//! - `MemoryStorage`: process-local map with an optional byte quota
//! - `FileStorage`: one file per key in a directory, same quota accounting

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Default quota, matching the 5 MiB most browsers grant an origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Storage Trait ==
/// Capability set the cache consumes from its persistent store.
///
/// Each call reads or writes a single key atomically; there is no
/// multi-key transaction.
pub trait Storage {
    /// Returns the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Fails with `StorageError::QuotaExceeded` when the write does not fit.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Absent keys are not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently stored.
    fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).list_keys()
    }
}

/// A type-erased backend that can live behind a shared lock.
pub type DynStorage = Box<dyn Storage + Send + Sync>;

// == Quota Helper ==
/// Checks that replacing `old_size` bytes with `new_size` bytes stays within
/// `quota` given `used` bytes already in the store.
pub(crate) fn check_quota(
    key: &str,
    quota: Option<usize>,
    used: usize,
    old_size: usize,
    new_size: usize,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let available = quota.saturating_sub(used.saturating_sub(old_size));
    if new_size > available {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            requested: new_size,
            available,
        });
    }
    Ok(())
}
