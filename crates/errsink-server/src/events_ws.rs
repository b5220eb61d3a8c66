//! Live push of collector state to viewers.
//!
//! A viewer receives one `snapshot` message on connect and then every
//! collector event in order. If it falls far enough behind that the broadcast
//! channel drops events, it gets a fresh snapshot instead of the missing ones.

use crate::state::AppState;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use errsink_core::EventFeed;
use errsink_types::CollectorEvent;
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Serialize a collector event for the wire.
pub fn encode_event(event: &CollectorEvent) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(event)?.into()))
}

/// Send every event from `feed` to `sink` until the sink fails.
pub async fn forward_events<S>(mut feed: EventFeed, mut sink: S)
where
    S: Sink<Message> + Unpin,
{
    while let Some(event) = feed.next().await {
        let Ok(msg) = encode_event(&event) else {
            continue;
        };
        if sink.send(msg).await.is_err() {
            debug!(target: "errsink::ws", "Viewer send failed");
            break;
        }
    }
}

/// Serve one viewer until either side goes away.
pub async fn handle_events_websocket(socket: WebSocket, state: Arc<AppState>) -> Result<()> {
    let (ws_tx, mut ws_rx) = socket.split();

    let feed = EventFeed::new(state.collector.clone()).await;
    info!(target: "errsink::ws", "Viewer connected");

    let mut send_task = tokio::spawn(forward_events(feed, ws_tx));

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Ping(_) => {
                    trace!(target: "errsink::ws", "Ping from viewer");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!(target: "errsink::ws", "Viewer disconnected");
    Ok(())
}
