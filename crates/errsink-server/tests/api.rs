//! Integration tests for the viewer HTTP API.
//!
//! These tests verify that the API reflects collector state, including state
//! produced by a real TCP client, and that the operator actions (clear,
//! auto-clear toggle) take effect.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use errsink_core::{spawn_collector, Collector};
use errsink_server::{config::Config, routes, state::AppState};
use errsink_types::ConnectionStatus;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tower::ServiceExt;

/// Create a test app over fresh state.
fn create_test_app(auto_clear: bool) -> (Router, Arc<AppState>) {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        collector_addr: "127.0.0.1:0".parse().unwrap(),
        auto_clear,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config));
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state.clone());
    (app, state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app(true);
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_idle_state() {
    let (app, _) = create_test_app(true);

    let (status, body) = get(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "not_connected",
            "markup": "<b style='color:red'>NOT CONNECTED</b>"
        })
    );

    let (_, body) = get(&app, "/api/log").await;
    assert_eq!(body, json!({"log": "", "length": 0}));

    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(body["auto_clear"], true);
    assert_eq!(body["sessions_accepted"], 0);
    assert!(body.get("peer").is_none());
}

#[tokio::test]
async fn test_auto_clear_toggle() {
    let (app, state) = create_test_app(true);

    let request = Request::put("/api/auto-clear")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"auto_clear": false}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"auto_clear": false}));
    assert!(!state.collector.auto_clear());

    let (_, body) = get(&app, "/api/auto-clear").await;
    assert_eq!(body, json!({"auto_clear": false}));
}

#[tokio::test]
async fn test_auto_clear_rejects_bad_body() {
    let (app, state) = create_test_app(true);

    let request = Request::put("/api/auto-clear")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"auto_clear": "sometimes"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
    assert!(state.collector.auto_clear());
}

#[tokio::test]
async fn test_clear_log() {
    let (app, state) = create_test_app(true);
    state.collector.append_chunk(b"stale output").await;

    let request = Request::delete("/api/log").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/log").await;
    assert_eq!(body["log"], "");
}

#[tokio::test]
async fn test_api_reflects_live_session() {
    let (app, state) = create_test_app(true);
    let collector = Collector::bind(state.config.collector_addr, state.collector.clone()).unwrap();
    let addr = collector.local_addr();
    spawn_collector(collector);

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"boom\n").await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let (_, body) = get(&app, "/api/state").await;
        if body["log"].as_str().is_some_and(|log| log.ends_with("boom\n")) {
            assert_eq!(body["status"], "connected");
            assert_eq!(body["status_markup"], ConnectionStatus::Connected.markup());
            assert_eq!(body["peer"], client.local_addr().unwrap().to_string());
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "log never showed client data");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    drop(client);
    loop {
        let (_, body) = get(&app, "/api/status").await;
        if body["status"] == "not_connected" {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "status never reset");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let (_, body) = get(&app, "/api/log").await;
    let log = body["log"].as_str().unwrap();
    assert!(log.starts_with("<b style='color:green;'>Connected At "));
    assert!(log.ends_with("</b><br/>boom\n"));
}
