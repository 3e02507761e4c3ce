//! Cache Entry Module
//!
//! Defines the persisted record and the lightweight timestamp probe used by
//! scans that must not pay for deserializing large payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Side-channel data stored next to a payload (pagination cursors etc).
pub type EntryMetadata = Map<String, Value>;

static TIMESTAMP_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""timestamp":(\d+)"#).expect("timestamp pattern is valid")
});

// == Cache Entry ==
/// One cached record as stored: `{"timestamp":..,"data":..,"metadata":..}`.
///
/// `timestamp` is declared first so it is serialized first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Write time (Unix milliseconds)
    pub timestamp: u64,
    /// The cached payload
    pub data: T,
    /// Opaque side-channel mapping, None when the writer supplied none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(timestamp: u64, data: T, metadata: Option<EntryMetadata>) -> Self {
        Self {
            timestamp,
            data,
            metadata,
        }
    }

    // == Age ==
    /// Milliseconds since the entry was written, zero if the clock went back.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Expired ==
    /// Checks the entry against an expiry window.
    ///
    /// Boundary condition: an age equal to the window is still valid. A zero
    /// window expires everything.
    pub fn is_expired_at(&self, now: u64, window_ms: u64) -> bool {
        is_expired(self.timestamp, now, window_ms)
    }
}

// == Utility Functions ==
/// Expiry rule shared by full reads and timestamp-only scans.
pub fn is_expired(timestamp: u64, now: u64, window_ms: u64) -> bool {
    window_ms == 0 || now.saturating_sub(timestamp) > window_ms
}

/// Extracts the `timestamp` field from a raw record without parsing it.
///
/// Returns None when the record carries no recognizable timestamp.
pub fn probe_timestamp(raw: &str) -> Option<u64> {
    TIMESTAMP_FIELD
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
