//! Per-viewer stream of collector events.

use crate::ServerState;
use errsink_types::{CollectorEvent, StateSnapshot};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// Events for one viewer: a snapshot first, then every later change.
///
/// If the viewer falls behind the broadcast channel, the lagging receiver is
/// dropped together with the events it still holds, and the feed restarts
/// from a fresh snapshot. Applying the yielded events in order with
/// [`StateSnapshot::apply`] always reproduces the server log exactly.
pub struct EventFeed {
    state: Arc<ServerState>,
    rx: broadcast::Receiver<CollectorEvent>,
    pending: Option<StateSnapshot>,
}

impl EventFeed {
    pub async fn new(state: Arc<ServerState>) -> Self {
        let (rx, snapshot) = state.subscribe_with_snapshot().await;
        Self {
            state,
            rx,
            pending: Some(snapshot),
        }
    }

    /// Next event for the viewer. `None` once the collector state is gone.
    pub async fn next(&mut self) -> Option<CollectorEvent> {
        if let Some(snapshot) = self.pending.take() {
            return Some(CollectorEvent::Snapshot(snapshot));
        }

        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                debug!(target: "errsink::ws", "Viewer lagged by {} events, resyncing", skipped);
                let (rx, snapshot) = self.state.subscribe_with_snapshot().await;
                self.rx = rx;
                Some(CollectorEvent::Snapshot(snapshot))
            }
            Err(RecvError::Closed) => None,
        }
    }
}
