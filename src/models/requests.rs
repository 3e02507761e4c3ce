//! Request DTOs for the cache API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{EntryMetadata, FilterMode};
use crate::settings::MAX_CACHE_EXPIRY_HOURS;

/// Query string addressing a list cache entry (GET/DELETE /cache)
///
/// # Fields
/// - `tags`: comma-separated tag list, empty or absent for "no filter"
/// - `mode`: tag filter mode (defaults to `single`)
/// - `expiry_ms`: optional expiry window override in milliseconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheQuery {
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub expiry_ms: Option<u64>,
}

impl CacheQuery {
    /// Splits the `tags` parameter into individual tags.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Query string carrying only an expiry override
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpiryQuery {
    #[serde(default)]
    pub expiry_ms: Option<u64>,
}

/// Request body for storing a list (PUT /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct SetCacheRequest {
    /// Tags of the filter signature
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tag filter mode
    #[serde(default)]
    pub mode: FilterMode,
    /// Payload to cache
    pub data: Value,
    /// Optional side-channel data such as pagination cursors
    #[serde(default)]
    pub metadata: Option<EntryMetadata>,
}

impl SetCacheRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Some("Tags cannot be empty strings".to_string());
        }
        if self.data.is_null() {
            return Some("Data cannot be null".to_string());
        }
        None
    }
}

/// Request body for storing database metadata (PUT /metadata)
#[derive(Debug, Clone, Deserialize)]
pub struct SetMetadataRequest {
    pub data: Value,
}

/// Request body for updating cache settings (PUT /settings)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub cache_expiry_hours: Option<u64>,
    #[serde(default)]
    pub tag_filter_mode: Option<FilterMode>,
}

impl UpdateSettingsRequest {
    pub fn validate(&self) -> Option<String> {
        match self.cache_expiry_hours {
            Some(hours) if hours > MAX_CACHE_EXPIRY_HOURS => Some(format!(
                "Cache expiry cannot exceed {} hours",
                MAX_CACHE_EXPIRY_HOURS
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_query_tag_list() {
        let query = CacheQuery {
            tags: Some("design, tools,,".to_string()),
            ..CacheQuery::default()
        };
        assert_eq!(query.tag_list(), vec!["design", "tools"]);
        assert!(CacheQuery::default().tag_list().is_empty());
    }

    #[test]
    fn test_set_cache_request_deserialize() {
        let json = r#"{"tags": ["x"], "mode": "multiple", "data": [{"id": "a"}]}"#;
        let req: SetCacheRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.mode, FilterMode::Multiple);
        assert!(req.metadata.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_set_cache_request_defaults_mode() {
        let req: SetCacheRequest = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(req.mode, FilterMode::Single);
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_tag() {
        let req = SetCacheRequest {
            tags: vec!["  ".to_string()],
            mode: FilterMode::Single,
            data: Value::Array(vec![]),
            metadata: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_rejects_null_data() {
        let req: SetCacheRequest = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_settings_request_validation() {
        let ok = UpdateSettingsRequest {
            cache_expiry_hours: Some(0),
            tag_filter_mode: None,
        };
        assert!(ok.validate().is_none());

        let too_long = UpdateSettingsRequest {
            cache_expiry_hours: Some(MAX_CACHE_EXPIRY_HOURS + 1),
            tag_filter_mode: None,
        };
        assert!(too_long.validate().is_some());
    }
}
