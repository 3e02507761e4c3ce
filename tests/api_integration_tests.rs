//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use nav_cache::{
    api::create_router,
    clock::ManualClock,
    storage::{DynStorage, MemoryStorage},
    AppState, CacheSettings, Config, NavigationCache,
};
use serde_json::Value;
use tower::ServiceExt;

const HOUR_MS: u64 = 60 * 60 * 1000;
const START_MS: u64 = 1_700_000_000_000;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_test_app_with_clock().0
}

fn create_test_app_with_clock() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let storage: DynStorage = Box::new(MemoryStorage::new());
    let cache = NavigationCache::with_clock(storage, clock.clone());
    let state = AppState::new(cache, CacheSettings::default());
    (create_router(state), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// == List Cache Tests ==

#[tokio::test]
async fn test_set_then_get_with_reordered_tags() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"tags":["tools","design"],"mode":"multiple","data":[{"id":"a"}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "nav_notion_cache_1.0_multiple_design,tools");

    let (status, json) = send(&app, "GET", "/cache?tags=design,tools&mode=multiple", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], "a");
    assert_eq!(json["timestamp"], START_MS);
}

#[tokio::test]
async fn test_mode_is_part_of_the_key() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"tags":["x"],"mode":"single","data":[1]}"#),
    )
    .await;

    let (status, _) = send(&app, "GET", "/cache?tags=x&mode=multiple", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_missing_returns_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/cache?tags=nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nav_notion_cache_1.0_single_nothing"));
}

#[tokio::test]
async fn test_set_preserves_cursor_metadata() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"tags":[],"data":[],"metadata":{"nextCursor":"c1","hasMore":true}}"#),
    )
    .await;

    let (status, json) = send(&app, "GET", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metadata"]["nextCursor"], "c1");
    assert_eq!(json["metadata"]["hasMore"], true);
}

#[tokio::test]
async fn test_set_rejects_null_data() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/cache", Some(r#"{"tags":["x"],"data":null}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["x"],"data":[1]}"#)).await;

    let (status, _) = send(&app, "DELETE", "/cache?tags=x", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", "/cache?tags=x", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/cache?tags=x", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Expiry Tests ==

#[tokio::test]
async fn test_entry_expires_after_window() {
    let (app, clock) = create_test_app_with_clock();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["x"],"data":[1]}"#)).await;

    clock.advance(HOUR_MS);
    let (status, _) = send(&app, "GET", "/cache?tags=x&expiry_ms=3600000", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(1);
    let (status, _) = send(&app, "GET", "/cache?tags=x&expiry_ms=3600000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The expired record was deleted on read
    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["itemCount"], 0);
}

#[tokio::test]
async fn test_clear_expired_keeps_fresh_entries() {
    let (app, clock) = create_test_app_with_clock();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["old"],"data":[1]}"#)).await;
    clock.advance(2 * HOUR_MS);
    send(&app, "PUT", "/cache", Some(r#"{"tags":["new"],"data":[2]}"#)).await;

    let (status, json) = send(&app, "POST", "/cache/clear-expired?expiry_ms=3600000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    let (status, _) = send(&app, "GET", "/cache?tags=new", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == Metadata Tests ==

#[tokio::test]
async fn test_metadata_lifecycle() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/metadata",
        Some(r#"{"data":{"title":"Navigation","tags":[{"name":"design","color":"blue"}]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "nav_notion_cache_1.0_metadata");

    let (status, json) = send(&app, "GET", "/metadata", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Navigation");

    let (status, _) = send(&app, "DELETE", "/metadata", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/metadata", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Clear / Stats Tests ==

#[tokio::test]
async fn test_clear_all_removes_everything() {
    let app = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["a"],"data":[1]}"#)).await;
    send(&app, "PUT", "/cache", Some(r#"{"tags":["b"],"data":[2]}"#)).await;
    send(&app, "PUT", "/metadata", Some(r#"{"data":{"title":"t"}}"#)).await;

    let (status, json) = send(&app, "POST", "/cache/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 3);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["itemCount"], 0);
    assert_eq!(stats["totalSize"], "0 Bytes");
}

#[tokio::test]
async fn test_stats_reports_entries() {
    let app = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["a"],"data":[1]}"#)).await;
    send(&app, "PUT", "/cache", Some(r#"{"tags":["b"],"data":[2]}"#)).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["itemCount"], 2);
    assert!(json["totalBytes"].as_u64().unwrap() > 0);
    assert!(json["oldestCache"].is_string());
    assert!(json["newestCache"].is_string());
}

// == Settings Tests ==

#[tokio::test]
async fn test_settings_defaults() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cache_expiry_hours"], 24);
    assert_eq!(json["tag_filter_mode"], "single");
}

#[tokio::test]
async fn test_disabling_cache_clears_entries() {
    let app = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"tags":["a"],"data":[1]}"#)).await;

    let (status, json) = send(&app, "PUT", "/settings", Some(r#"{"cache_expiry_hours":0}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cache_expiry_hours"], 0);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["itemCount"], 0);
}

#[tokio::test]
async fn test_writes_are_skipped_while_caching_disabled() {
    let app = create_test_app();

    send(&app, "PUT", "/settings", Some(r#"{"cache_expiry_hours":0}"#)).await;

    let (status, json) = send(&app, "PUT", "/cache", Some(r#"{"tags":["a"],"data":[1]}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], false);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["itemCount"], 0);
}

#[tokio::test]
async fn test_settings_reject_excessive_expiry() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/settings", Some(r#"{"cache_expiry_hours":721}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == File Storage Tests ==

#[tokio::test]
async fn test_file_storage_long_signature_roundtrip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        storage_dir: Some(temp_dir.path().to_path_buf()),
        ..Config::default()
    };
    let app = create_router(AppState::from_config(&config).unwrap());

    let tags: Vec<String> = (0..8).map(|i| format!("long-category-tag-{:03}", i)).collect();
    let body = serde_json::json!({ "tags": tags, "mode": "multiple", "data": [{"id": "a"}] });
    let (status, _) = send(&app, "PUT", "/cache", Some(&body.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/cache?tags={}&mode=multiple", tags.join(","));
    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], "a");
}

// == Health Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
