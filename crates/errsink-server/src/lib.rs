//! errsink server library - HTTP/WebSocket viewer surface for the error-log collector.
//!
//! Holds the configuration, logging setup, routes, and application state. It's
//! separated from main.rs so the router can be exercised in integration tests.

pub mod config;
pub mod events_ws;
pub mod logging;
pub mod routes;
pub mod state;
