//! Integration Tests for the Diagnostics Endpoints
//!
//! Drives the full request/response cycle against shared cache and breaker
//! state.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use resilience_kit::{
    api::create_router, AppState, BreakerError, BreakerOptions, CacheConfig, CacheStore,
    CircuitBreakerRegistry,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::new(
        Arc::new(CacheStore::new(CacheConfig::default())),
        Arc::new(CircuitBreakerRegistry::new()),
    )
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

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

async fn trip(state: &AppState, name: &str) {
    let breaker = state
        .breakers
        .get_or_create(name, BreakerOptions::default().with_volume_threshold(2));
    for _ in 0..2 {
        let result: Result<(), BreakerError<String>> = breaker
            .fire(|| async { Err("ECONNREFUSED".to_string()) })
            .await;
        assert!(result.is_err());
    }
}

// == Health ==

#[tokio::test]
async fn test_health_reports_degraded_while_breaker_open() {
    let state = create_test_state();
    let app = create_router(state.clone());

    let (status, json) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());

    trip(&state, "vendor-api").await;

    let (_, json) = send(&app, "GET", "/health").await;
    assert_eq!(json["status"], "degraded");
}

// == Cache ==

#[tokio::test]
async fn test_cache_stats_shape() {
    let state = create_test_state();
    state.cache.set("control:1", json!({"id": 1, "name": "MFA"}), None);
    state.cache.get("control:1");
    state.cache.get("control:9");
    let app = create_router(state);

    let (status, json) = send(&app, "GET", "/stats/cache").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 1);
    assert_eq!(json["maxSize"], 1000);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["hitRate"], 0.5);
    assert_eq!(json["maxMemoryMB"], 100.0);
    assert!(json.get("memoryUsedMB").is_some());
}

#[tokio::test]
async fn test_invalidate_by_prefix() {
    let state = create_test_state();
    state.cache.set("audit:2024:q1", json!("a"), None);
    state.cache.set("audit:2024:q2", json!("b"), None);
    state.cache.set("control:1", json!("c"), None);
    let app = create_router(state.clone());

    let (status, json) = send(&app, "DELETE", "/cache?prefix=audit%3A2024").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prefix"], "audit:2024");
    assert_eq!(json["removed"], 2);
    assert_eq!(state.cache.keys(), vec!["control:1".to_string()]);
}

#[tokio::test]
async fn test_invalidate_requires_prefix() {
    let app = create_router(create_test_state());

    let (status, json) = send(&app, "DELETE", "/cache?prefix=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Prefix"));

    let (status, _) = send(&app, "DELETE", "/cache").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Breakers ==

#[tokio::test]
async fn test_list_breakers_sorted_with_open_count() {
    let state = create_test_state();
    state
        .breakers
        .get_or_create("vendor-api", BreakerOptions::default());
    trip(&state, "evidence-store").await;
    let app = create_router(state);

    let (status, json) = send(&app, "GET", "/breakers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["open"], 1);
    let breakers = json["breakers"].as_array().unwrap();
    assert_eq!(breakers.len(), 2);
    assert_eq!(breakers[0]["name"], "evidence-store");
    assert_eq!(breakers[0]["state"], "OPEN");
    assert_eq!(breakers[0]["failures"], 2);
    assert!(breakers[0]["lastFailureTime"].is_number());
    assert_eq!(breakers[1]["name"], "vendor-api");
    assert_eq!(breakers[1]["state"], "CLOSED");
}

#[tokio::test]
async fn test_get_single_breaker() {
    let state = create_test_state();
    trip(&state, "vendor-api").await;
    let app = create_router(state);

    let (status, json) = send(&app, "GET", "/breakers/vendor-api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "vendor-api");
    assert_eq!(json["state"], "OPEN");

    let (status, json) = send(&app, "GET", "/breakers/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("unknown"));
}

#[tokio::test]
async fn test_reset_closes_all_breakers() {
    let state = create_test_state();
    trip(&state, "vendor-api").await;
    trip(&state, "evidence-store").await;
    let app = create_router(state.clone());

    let (status, json) = send(&app, "POST", "/breakers/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);

    let (_, json) = send(&app, "GET", "/breakers").await;
    assert_eq!(json["open"], 0);
    for breaker in json["breakers"].as_array().unwrap() {
        assert_eq!(breaker["state"], "CLOSED");
        assert_eq!(breaker["failures"], 0);
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_router(create_test_state());
    let (status, _) = send(&app, "GET", "/get/anything").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
