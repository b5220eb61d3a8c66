//! Core of the errsink collector: the accept loop, the per-connection
//! session handler, and the shared state they write into.

mod collector;
mod decode;
mod error;
mod feed;
mod session;
mod state;

pub use collector::{spawn_collector, Collector, LISTEN_BACKLOG};
pub use decode::{decode_ascii, session_marker};
pub use error::CollectorError;
pub use feed::EventFeed;
pub use session::{handle_session, SessionOutcome, READ_CHUNK_SIZE};
pub use state::ServerState;

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;
