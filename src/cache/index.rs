//! Record Index Module
//!
//! Write-time summary of every cache record so eviction, expiry sweeps and
//! stats can walk the cache without re-reading payloads.

use std::collections::BTreeMap;

use crate::cache::entry::probe_timestamp;
use crate::cache::key::is_managed_key;
use crate::error::StorageError;
use crate::storage::Storage;

// == Record Summary ==
/// What the cache needs to know about a record without opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSummary {
    /// Write time, None when the record is unreadable
    pub timestamp: Option<u64>,
    /// Serialized size of the stored value
    pub bytes: usize,
}

impl RecordSummary {
    /// Summarizes a raw stored value.
    pub fn from_raw(raw: &str) -> Self {
        Self {
            timestamp: probe_timestamp(raw),
            bytes: raw.len(),
        }
    }
}

// == Record Index ==
/// Key to summary map covering every prefix-matching record.
///
/// Kept in step with each write and delete the cache performs.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: BTreeMap<String, RecordSummary>,
}

impl RecordIndex {
    // == Build ==
    /// Scans the store once and summarizes every cache record in it.
    pub fn build<S: Storage + ?Sized>(storage: &S) -> Result<Self, StorageError> {
        let mut records = BTreeMap::new();
        for key in storage.list_keys()? {
            if !is_managed_key(&key) {
                continue;
            }
            if let Some(raw) = storage.read(&key)? {
                records.insert(key, RecordSummary::from_raw(&raw));
            }
        }
        Ok(Self { records })
    }

    // == Insert ==
    /// Records a successful write.
    pub fn insert(&mut self, key: &str, summary: RecordSummary) {
        self.records.insert(key.to_string(), summary);
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        self.records.remove(key);
    }

    /// Owned snapshot of every tracked record, in key order.
    pub fn snapshot(&self) -> Vec<(String, RecordSummary)> {
        self.records
            .iter()
            .map(|(key, summary)| (key.clone(), *summary))
            .collect()
    }

    /// Keys ordered oldest first; unreadable records sort as time zero and
    /// ties break on the key.
    pub fn oldest_first(&self) -> Vec<String> {
        let mut ordered: Vec<(u64, &String)> = self
            .records
            .iter()
            .map(|(key, summary)| (summary.timestamp.unwrap_or(0), key))
            .collect();
        ordered.sort();
        ordered.into_iter().map(|(_, key)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
