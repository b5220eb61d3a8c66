//! Push messages sent from the collector to live viewers.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::{ConnectionStatus, StateSnapshot};

/// A change to the collector state.
///
/// Viewers that apply these in order on top of an initial
/// [`CollectorEvent::Snapshot`] reproduce the server-side log exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectorEvent {
    /// Full state, sent on connect and after a viewer falls behind.
    Snapshot(StateSnapshot),
    /// Connection status flipped.
    StatusChanged {
        status: ConnectionStatus,
        markup: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        peer: Option<SocketAddr>,
    },
    /// Text appended to the end of the log.
    LogAppended { text: String },
    /// Log reset to empty.
    LogCleared,
    /// The auto-clear toggle changed.
    AutoClearChanged { auto_clear: bool },
}

impl CollectorEvent {
    pub fn status_changed(status: ConnectionStatus, peer: Option<SocketAddr>) -> Self {
        CollectorEvent::StatusChanged {
            status,
            markup: status.markup().to_string(),
            peer,
        }
    }
}

impl StateSnapshot {
    /// Apply one event the way a viewer does.
    ///
    /// Only fields carried by events are updated. The counters, and the
    /// `connected_since` of a new session, arrive with the next snapshot.
    pub fn apply(&mut self, event: &CollectorEvent) {
        match event {
            CollectorEvent::Snapshot(snapshot) => *self = snapshot.clone(),
            CollectorEvent::StatusChanged {
                status,
                markup,
                peer,
            } => {
                self.status = *status;
                self.status_markup.clone_from(markup);
                self.peer = *peer;
                if !status.is_connected() {
                    self.connected_since = None;
                }
            }
            CollectorEvent::LogAppended { text } => self.log.push_str(text),
            CollectorEvent::LogCleared => self.log.clear(),
            CollectorEvent::AutoClearChanged { auto_clear } => self.auto_clear = *auto_clear,
        }
    }
}
