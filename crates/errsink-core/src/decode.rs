//! Byte decoding and session markers written into the log.

use chrono::{DateTime, Local};

/// Decode one received chunk, one byte per character.
///
/// Bytes outside the ASCII range become `'?'`. Nothing is carried between
/// chunks, so a multi-byte character split across reads decodes the same as
/// one that arrived whole.
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// The line appended to the log when a session starts.
pub fn session_marker(at: DateTime<Local>) -> String {
    format!(
        "<b style='color:green;'>Connected At {}</b><br/>",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}
