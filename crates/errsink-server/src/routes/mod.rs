//! HTTP route handlers.

pub mod collector;
pub mod ws;

use crate::state::AppState;
use axum::{
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/state", get(collector::state))
        .route("/status", get(collector::status))
        .route("/log", get(collector::log).delete(collector::clear_log))
        .route(
            "/auto-clear",
            get(collector::auto_clear).put(collector::set_auto_clear),
        )
        .route("/health", get(health))
}

/// Routes mounted under `/ws`.
pub fn ws_routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(ws::upgrade))
}
