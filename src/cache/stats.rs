//! Cache Statistics Module
//!
//! Diagnostic snapshot of what the cache currently holds in storage.

use chrono::{Local, TimeZone};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

// == Cache Stats ==
/// Inventory of live cache records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of records with a readable timestamp
    pub item_count: usize,
    /// Serialized size of those records in bytes
    pub total_bytes: usize,
    /// Write time of the oldest record (Unix milliseconds)
    pub oldest_timestamp: Option<u64>,
    /// Write time of the newest record (Unix milliseconds)
    pub newest_timestamp: Option<u64>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Entry ==
    /// Counts one record of `size` bytes written at `timestamp`.
    pub fn record_entry(&mut self, size: usize, timestamp: u64) {
        self.item_count += 1;
        self.total_bytes += size;
        self.oldest_timestamp = Some(
            self.oldest_timestamp
                .map_or(timestamp, |oldest| oldest.min(timestamp)),
        );
        self.newest_timestamp = Some(
            self.newest_timestamp
                .map_or(timestamp, |newest| newest.max(timestamp)),
        );
    }

    /// Human-readable total size, e.g. `"1.5 KB"`.
    pub fn total_size(&self) -> String {
        format_bytes(self.total_bytes)
    }

    /// Local-time rendering of the oldest write, None when empty.
    pub fn oldest_cache(&self) -> Option<String> {
        self.oldest_timestamp.and_then(format_timestamp)
    }

    /// Local-time rendering of the newest write, None when empty.
    pub fn newest_cache(&self) -> Option<String> {
        self.newest_timestamp.and_then(format_timestamp)
    }
}

// == Formatting ==
/// Scales a byte count by powers of 1024 with up to two decimals.
pub fn format_bytes(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Renders epoch milliseconds in local time as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(timestamp_ms: u64) -> Option<String> {
    let millis = i64::try_from(timestamp_ms).ok()?;
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
}
