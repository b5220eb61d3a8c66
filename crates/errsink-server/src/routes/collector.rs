//! Read access to the collector state, plus the two operator actions.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use errsink_types::{ConnectionStatus, StateSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: ConnectionStatus,
    pub markup: &'static str,
}

#[derive(Serialize)]
pub struct LogResponse {
    pub log: String,
    pub length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoClearBody {
    pub auto_clear: bool,
}

pub async fn state(State(state): State<Arc<AppState>>) -> Json<StateSnapshot> {
    Json(state.collector.snapshot().await)
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.collector.status().await;
    Json(StatusResponse {
        status,
        markup: status.markup(),
    })
}

pub async fn log(State(state): State<Arc<AppState>>) -> Json<LogResponse> {
    let log = state.collector.log().await;
    Json(LogResponse {
        length: log.len(),
        log,
    })
}

/// Empty the log. Connection status is left alone.
pub async fn clear_log(State(state): State<Arc<AppState>>) -> StatusCode {
    state.collector.clear().await;
    tracing::info!(target: "errsink::api", "Log cleared by viewer");
    StatusCode::NO_CONTENT
}

pub async fn auto_clear(State(state): State<Arc<AppState>>) -> Json<AutoClearBody> {
    Json(AutoClearBody {
        auto_clear: state.collector.auto_clear(),
    })
}

pub async fn set_auto_clear(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AutoClearBody>,
) -> Json<AutoClearBody> {
    state.collector.set_auto_clear(body.auto_clear);
    tracing::info!(target: "errsink::api", "Auto-clear set to {}", body.auto_clear);
    Json(body)
}
