//! Shared collector state.
//!
//! The collector task is the only writer of status and log during normal
//! operation; any number of HTTP and websocket handlers read concurrently.
//! Status and log sit behind one lock so a reader never sees a status that
//! disagrees with the log it is paired with. Every mutation is published on a
//! broadcast channel while the write lock is held, so subscribers observe
//! events in the same order the state changed.

use crate::decode::{decode_ascii, session_marker};
use chrono::{DateTime, Local};
use errsink_types::{CollectorEvent, ConnectionStatus, StateSnapshot};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Capacity of the event channel before slow viewers start lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct LogState {
    status: ConnectionStatus,
    log: String,
    peer: Option<SocketAddr>,
    connected_since: Option<DateTime<Local>>,
}

/// Process-wide collector state, shared as `Arc<ServerState>`.
pub struct ServerState {
    inner: RwLock<LogState>,
    auto_clear: AtomicBool,
    // Counters only change under the write lock of `inner`.
    sessions_accepted: AtomicU64,
    bytes_received: AtomicU64,
    event_tx: broadcast::Sender<CollectorEvent>,
}

impl ServerState {
    pub fn new(auto_clear: bool) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(LogState::default()),
            auto_clear: AtomicBool::new(auto_clear),
            sessions_accepted: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            event_tx,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectorEvent> {
        self.event_tx.subscribe()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.read().await.status
    }

    /// Copy of the current log text.
    pub async fn log(&self) -> String {
        self.inner.read().await.log.clone()
    }

    pub fn auto_clear(&self) -> bool {
        self.auto_clear.load(Ordering::Acquire)
    }

    /// Flip the auto-clear toggle. Takes effect at the next session start.
    pub fn set_auto_clear(&self, enabled: bool) {
        let previous = self.auto_clear.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            debug!(target: "errsink::collector", "Auto-clear set to {}", enabled);
            self.publish(CollectorEvent::AutoClearChanged { auto_clear: enabled });
        }
    }

    /// Consistent copy of every exported field.
    pub async fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read().await;
        self.snapshot_locked(&inner)
    }

    /// Subscribe and snapshot at the same instant.
    ///
    /// Events are only published under the write lock, so holding the read
    /// lock across both gives an exact cut: the receiver yields precisely the
    /// changes that are not already in the snapshot.
    pub async fn subscribe_with_snapshot(
        &self,
    ) -> (broadcast::Receiver<CollectorEvent>, StateSnapshot) {
        let inner = self.inner.read().await;
        let rx = self.event_tx.subscribe();
        (rx, self.snapshot_locked(&inner))
    }

    fn snapshot_locked(&self, inner: &LogState) -> StateSnapshot {
        StateSnapshot {
            status: inner.status,
            status_markup: inner.status.markup().to_string(),
            log: inner.log.clone(),
            auto_clear: self.auto_clear(),
            peer: inner.peer,
            connected_since: inner.connected_since,
            sessions_accepted: self.sessions_accepted.load(Ordering::Acquire),
            bytes_received: self.bytes_received.load(Ordering::Acquire),
        }
    }

    /// Record a connection accepted at `at`.
    pub async fn mark_connected(&self, peer: SocketAddr, at: DateTime<Local>) {
        let mut inner = self.inner.write().await;
        inner.status = ConnectionStatus::Connected;
        inner.peer = Some(peer);
        inner.connected_since = Some(at);
        self.publish(CollectorEvent::status_changed(ConnectionStatus::Connected, Some(peer)));
    }

    /// Return to waiting for a connection.
    pub async fn mark_disconnected(&self) {
        let mut inner = self.inner.write().await;
        inner.status = ConnectionStatus::NotConnected;
        inner.peer = None;
        inner.connected_since = None;
        self.publish(CollectorEvent::status_changed(ConnectionStatus::NotConnected, None));
    }

    /// Start a session's log section: empty the log if auto-clear is on, then
    /// append the start marker. Both happen under one write lock.
    ///
    /// Returns the 1-based number of this session.
    pub async fn begin_session(&self, at: DateTime<Local>) -> u64 {
        let mut inner = self.inner.write().await;
        if self.auto_clear() {
            inner.log.clear();
            self.publish(CollectorEvent::LogCleared);
        }

        let marker = session_marker(at);
        inner.log.push_str(&marker);
        self.publish(CollectorEvent::LogAppended { text: marker });

        self.sessions_accepted.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decode a received chunk and append it verbatim to the log.
    pub async fn append_chunk(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let text = decode_ascii(bytes);
        let mut inner = self.inner.write().await;
        inner.log.push_str(&text);
        self.bytes_received
            .fetch_add(bytes.len() as u64, Ordering::AcqRel);
        self.publish(CollectorEvent::LogAppended { text });
    }

    /// Empty the log without touching the connection status.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.log.clear();
        self.publish(CollectorEvent::LogCleared);
    }

    fn publish(&self, event: CollectorEvent) {
        // No subscribers is the normal case when nobody is viewing
        let _ = self.event_tx.send(event);
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(true)
    }
}
