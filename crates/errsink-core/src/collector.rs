//! TCP listener loop feeding sessions one at a time.

use crate::session::{handle_session, SessionOutcome};
use crate::{CollectorError, Result, ServerState};
use chrono::Local;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Pending connections the kernel queues while a session is active.
pub const LISTEN_BACKLOG: u32 = 10;

/// Owns the collector's listening socket and runs sessions strictly in
/// sequence: the next connection is accepted only after the current session
/// handler has returned.
pub struct Collector {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<ServerState>,
}

impl Collector {
    /// Bind and start listening on `addr`.
    ///
    /// Must be called from within a tokio runtime. Any failure here is a
    /// [`CollectorError::Bind`], the only collector error that is fatal.
    pub fn bind(addr: SocketAddr, state: Arc<ServerState>) -> Result<Self> {
        let bind_err = |source| CollectorError::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept and serve connections forever.
    ///
    /// Accept failures are logged and retried. There is no read timeout: a
    /// peer that never sends and never closes holds the collector until it
    /// goes away.
    pub async fn run(self) {
        info!(target: "errsink::collector", "Collector listening on {}", self.local_addr);
        loop {
            match self.accept().await {
                Ok((stream, peer)) => self.serve(stream, peer).await,
                Err(e) => {
                    warn!(target: "errsink::collector", "{}", e);
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await.map_err(CollectorError::Accept)
    }

    async fn serve(&self, stream: TcpStream, peer: SocketAddr) {
        info!(target: "errsink::collector", "Accepted connection from {}", peer);
        let accepted_at = Local::now();
        self.state.mark_connected(peer, accepted_at).await;

        let outcome = handle_session(stream, &self.state, accepted_at).await;
        if let SessionOutcome::Errored { error, .. } = &outcome {
            warn!(target: "errsink::collector", "Session from {} aborted: {}", peer, error);
        }

        self.state.mark_disconnected().await;
        debug!(target: "errsink::collector", "Waiting for next connection");
    }
}

/// Run the collector on its own task for the rest of the process.
pub fn spawn_collector(collector: Collector) -> JoinHandle<()> {
    tokio::spawn(collector.run())
}
