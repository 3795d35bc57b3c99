//! Anthropic Messages API adapter.
//!
//! Streams text deltas from `POST /v1/messages` with `stream: true`.

pub mod client;
pub mod retry;
pub mod streaming;
pub mod types;

pub use client::AnthropicGenerator;
pub use retry::RetryPolicy;
pub use streaming::{sse_events, text_deltas, SseParser};
