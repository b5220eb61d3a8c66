//! Per-connection session handler.

use crate::{CollectorError, ServerState};
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

/// Bytes requested from the connection per read (16KB).
pub const READ_CHUNK_SIZE: usize = 16 * 1024;

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Peer closed the connection in order.
    Closed { bytes: u64 },
    /// A read failed; everything received before it is already in the log.
    Errored { bytes: u64, error: CollectorError },
}

impl SessionOutcome {
    /// Bytes received before the session ended.
    pub fn bytes(&self) -> u64 {
        match self {
            SessionOutcome::Closed { bytes } | SessionOutcome::Errored { bytes, .. } => *bytes,
        }
    }
}

/// Drain one connection into the shared log until the peer closes or a read
/// fails. The start marker is stamped with `started_at`.
///
/// Errors never escape: they end the session and are reported in the
/// returned outcome. The stream is dropped on return.
pub async fn handle_session<R>(
    mut stream: R,
    state: &ServerState,
    started_at: DateTime<Local>,
) -> SessionOutcome
where
    R: AsyncRead + Unpin,
{
    let session = state.begin_session(started_at).await;
    debug!(target: "errsink::session", "Session {} receiving", session);

    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut bytes = 0u64;

    let outcome = loop {
        match stream.read(&mut buf).await {
            Ok(0) => break SessionOutcome::Closed { bytes },
            Ok(n) => {
                state.append_chunk(&buf[..n]).await;
                bytes += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                break SessionOutcome::Errored {
                    bytes,
                    error: CollectorError::Session(e),
                };
            }
        }
    };

    match &outcome {
        SessionOutcome::Closed { bytes } => {
            info!(target: "errsink::session", "Session {} closed by peer after {} bytes", session, bytes);
        }
        SessionOutcome::Errored { bytes, error } => {
            debug!(target: "errsink::session", "Session {} ended after {} bytes: {}", session, bytes, error);
        }
    }

    outcome
}
