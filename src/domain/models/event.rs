//! Analysis event wire format.
//!
//! Each event travels as one `data: <payload>` line. The payload is either
//! the [`DONE_SENTINEL`] or a JSON object with a `text` delta or an `error`
//! message.

use serde::{Deserialize, Serialize};

/// Payload marking the end of the event stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Prefix of every event line.
pub const DATA_PREFIX: &str = "data:";

/// JSON payload of one event line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEvent {
    /// Terminal failure reported by the producer
    Error { error: String },
    /// Text delta to append to the accumulated output
    Text { text: String },
}

impl RelayEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}
