//! WebSocket route handler.

use crate::events_ws::handle_events_websocket;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;

pub async fn upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    if let Err(e) = handle_events_websocket(socket, state).await {
        tracing::warn!(target: "errsink::ws", "Viewer WebSocket error: {}", e);
    }
}
