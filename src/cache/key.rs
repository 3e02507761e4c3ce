//! Cache Key Module
//!
//! Derives storage keys from filter signatures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{CACHE_PREFIX, CACHE_VERSION, TAG_DELIMITER};
use crate::error::CacheError;

// == Filter Mode ==
/// How the dashboard combines selected tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// At most one tag selected at a time
    #[default]
    Single,
    /// Any number of tags selected together
    Multiple,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Single => "single",
            FilterMode::Multiple => "multiple",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(FilterMode::Single),
            "multiple" => Ok(FilterMode::Multiple),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown filter mode '{}', expected 'single' or 'multiple'",
                other
            ))),
        }
    }
}

// == Key Derivation ==
/// Builds the list-cache key for a tag set and filter mode.
///
/// Tags are sorted before joining so the same set in any order maps to the
/// same key. An empty set yields an empty tag segment.
pub fn derive_list_key<S: AsRef<str>>(tags: &[S], mode: FilterMode) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(|tag| tag.as_ref()).collect();
    sorted.sort_unstable();
    format!(
        "{}{}_{}_{}",
        CACHE_PREFIX,
        CACHE_VERSION,
        mode,
        sorted.join(TAG_DELIMITER)
    )
}

/// Builds the fixed key of the database-metadata record.
pub fn derive_metadata_key() -> String {
    format!("{}{}_metadata", CACHE_PREFIX, CACHE_VERSION)
}

/// True for any key this cache owns, whatever its version token.
pub fn is_managed_key(key: &str) -> bool {
    key.starts_with(CACHE_PREFIX)
}
