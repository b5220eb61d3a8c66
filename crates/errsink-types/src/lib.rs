//! Shared types for the errsink error-log collector.

mod event;
mod status;

pub use event::*;
pub use status::*;
