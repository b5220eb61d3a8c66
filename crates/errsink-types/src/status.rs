//! Connection status and collector state snapshots.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Markup rendered by the viewer while a client is streaming.
pub const CONNECTED_MARKUP: &str = "<b style='color:green'>CONNECTED</b>";

/// Markup rendered by the viewer while the collector waits for a client.
pub const NOT_CONNECTED_MARKUP: &str = "<b style='color:red'>NOT CONNECTED</b>";

/// Whether a client is currently streaming into the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// A session is active.
    Connected,
    /// Waiting in accept.
    #[default]
    NotConnected,
}

impl ConnectionStatus {
    /// Fixed markup the viewer renders for this status.
    pub fn markup(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => CONNECTED_MARKUP,
            ConnectionStatus::NotConnected => NOT_CONNECTED_MARKUP,
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "CONNECTED"),
            ConnectionStatus::NotConnected => write!(f, "NOT CONNECTED"),
        }
    }
}

/// Point-in-time copy of the collector state, consistent across all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub status: ConnectionStatus,
    /// Rendered status markup (see [`ConnectionStatus::markup`]).
    pub status_markup: String,
    /// Full log text, session markers included.
    pub log: String,
    pub auto_clear: bool,
    /// Peer of the active session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<SocketAddr>,
    /// When the active session was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_since: Option<DateTime<Local>>,
    /// Sessions accepted since the process started.
    pub sessions_accepted: u64,
    /// Raw bytes received since the process started.
    pub bytes_received: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_markup() {
        assert_eq!(
            ConnectionStatus::Connected.markup(),
            "<b style='color:green'>CONNECTED</b>"
        );
        assert_eq!(
            ConnectionStatus::NotConnected.markup(),
            "<b style='color:red'>NOT CONNECTED</b>"
        );
    }

    #[test]
    fn test_status_default_is_not_connected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::NotConnected);
        assert!(!ConnectionStatus::default().is_connected());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ConnectionStatus::NotConnected).unwrap();
        assert_eq!(json, "\"not_connected\"");
        let parsed: ConnectionStatus = serde_json::from_str("\"connected\"").unwrap();
        assert_eq!(parsed, ConnectionStatus::Connected);
    }
}
