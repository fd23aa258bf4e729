//! Integration tests for the Fixcast REST endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use fixcast_core::{Hub, ServerConfig};
use fixcast_server::router::build_router;
use fixcast_server::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(Hub::with_buffer(16))))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn ingest_request(body: &str) -> Request<Body> {
    Request::post("/ingest")
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_ping_returns_pong() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_string(response.into_body()).await, "pong");
}

#[tokio::test]
async fn test_ingest_then_get_device() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(ingest_request(
            r#"{"id": "A05A9C8481B0", "lat": -3.4, "lon": 119.19, "sats": 5, "hdop": 2.1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);

    let response = router
        .oneshot(Request::get("/device/A05A9C8481B0").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["id"], "A05A9C8481B0");
    assert_eq!(json["lat"], -3.4);
    assert_eq!(json["lon"], 119.19);
    assert_eq!(json["sats"], 5);
    assert_eq!(json["hdop"], 2.1);
    assert!(json["ts"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_ingest_non_numeric_lat_is_client_error() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(ingest_request(r#"{"id": "A", "lat": "x", "lon": 1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("lat/lon"));
    assert!(state.hub.store().is_empty().unwrap());
}

#[tokio::test]
async fn test_ingest_malformed_body_is_client_error() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(ingest_request("{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(
            Request::post("/ingest")
                .body(Body::from(r#"{"lat": 1, "lon": 2}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.hub.store().is_empty().unwrap());
}

#[tokio::test]
async fn test_ingest_oversized_body_is_rejected() {
    let hub = Arc::new(Hub::with_buffer(16));
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::with_config(Arc::clone(&hub), config));
    let router = build_router(state);

    let padding = "x".repeat(256);
    let body = format!(r#"{{"id": "{padding}", "lat": 1, "lon": 2}}"#);
    let response = router.oneshot(ingest_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(hub.store().is_empty().unwrap());
}

#[tokio::test]
async fn test_ingest_falls_back_to_device_header() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let request = Request::post("/ingest")
        .header("content-type", "application/json")
        .header("x-device-id", "D1")
        .body(Body::from(r#"{"lat": -3.4, "lon": 119.19, "sats": 5, "hdop": 2.1}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = state.hub.store().get("D1").unwrap();
    assert_eq!(record.fix.satellite_count(), Some(5));
}

#[tokio::test]
async fn test_ingest_falls_back_to_peer_address() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let peer: SocketAddr = "192.0.2.10:50123".parse().unwrap();
    let mut request = ingest_request(r#"{"lat": 1.5, "lon": 2.5}"#);
    request.extensions_mut().insert(ConnectInfo(peer));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.hub.store().get("192.0.2.10").is_ok());
}

#[tokio::test]
async fn test_ingest_without_any_identity_uses_unknown() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(ingest_request(r#"{"id": "", "lat": 1, "lon": 2}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.hub.store().get("unknown").is_ok());
}

#[tokio::test]
async fn test_list_devices() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    for body in [
        r#"{"id": "B", "lat": 2, "lon": 2}"#,
        r#"{"id": "A", "lat": 1, "lon": 1, "sats": 0}"#,
    ] {
        let response = router.clone().oneshot(ingest_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(Request::get("/devices").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let devices = json.as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(json[0]["id"], "A");
    assert_eq!(json[0]["sats"], 0);
    assert_eq!(json[0]["hdop"], Value::Null);
    assert_eq!(json[1]["id"], "B");
    assert_eq!(json[1]["sats"], Value::Null);
}

#[tokio::test]
async fn test_get_device_not_found() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/device/ghost").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_status_counts() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));
    let _subscription = state.hub.subscribe().unwrap();

    let response = router
        .clone()
        .oneshot(ingest_request(r#"{"id": "A", "lat": 1, "lon": 1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["devices"], 1);
    assert_eq!(json["subscribers"], 1);
    assert!(json["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_cors_preflight_for_ingest() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::options("/ingest")
                .header("origin", "http://map.example")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type, x-device-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn test_unknown_path_without_static_dir_is_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/map/somewhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_dir_serves_assets_with_spa_fallback() {
    let dir: PathBuf = std::env::temp_dir().join(format!("fixcast-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>map</html>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log('map');").unwrap();

    let config = ServerConfig {
        static_dir: Some(dir.clone()),
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::with_config(Arc::new(Hub::with_buffer(4)), config));
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_string(response.into_body()).await, "console.log('map');");

    let response = router
        .clone()
        .oneshot(Request::get("/devices/on/map").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_string(response.into_body()).await, "<html>map</html>");

    let response = router
        .oneshot(Request::get("/devices").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, serde_json::json!([]));

    std::fs::remove_dir_all(&dir).ok();
}
