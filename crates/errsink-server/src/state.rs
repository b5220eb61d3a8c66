//! Shared application state.

use crate::config::Config;
use errsink_core::ServerState;
use std::sync::Arc;

/// State handed to every HTTP and websocket handler.
pub struct AppState {
    /// Collector state, also held by the collector task.
    pub collector: Arc<ServerState>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let collector = Arc::new(ServerState::new(config.auto_clear));
        Self { collector, config }
    }
}
