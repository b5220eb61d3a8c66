//! Error types for the collector.

use std::net::SocketAddr;
use thiserror::Error;

/// Failures of the collector, tagged by how far they are allowed to propagate.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Could not bind or listen. Aborts startup.
    #[error("Failed to bind collector on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A single accept failed. The loop retries.
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// A read failed mid-session. Ends that session only.
    #[error("Session read failed: {0}")]
    Session(#[source] std::io::Error),
}

impl CollectorError {
    /// Only bind failures must reach the operator.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectorError::Bind { .. })
    }
}
