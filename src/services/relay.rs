//! Event relay.
//!
//! Producer side of the analysis event protocol: turns a text-generation
//! delta stream into `data: <payload>` event lines, ending with the
//! `[DONE]` sentinel. A generation error becomes an `error` event and ends
//! the relay without the sentinel.

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use tracing::warn;

use crate::domain::models::{RelayEvent, DONE_SENTINEL};
use crate::domain::ports::TextStream;

/// Encode one event as a `data:` line followed by a blank line.
pub fn encode_event(event: &RelayEvent) -> Bytes {
    let payload = serde_json::to_string(event).unwrap_or_default();
    Bytes::from(format!("data: {payload}\n\n"))
}

/// The end-of-stream sentinel line.
pub fn done_event() -> Bytes {
    Bytes::from(format!("data: {DONE_SENTINEL}\n\n"))
}

/// Relay a delta stream as encoded event lines.
pub fn relay_events(deltas: TextStream) -> impl Stream<Item = Bytes> + Send + 'static {
    stream::unfold(Some(deltas), |state| async move {
        let mut deltas = state?;
        loop {
            match deltas.next().await {
                Some(Ok(text)) if text.is_empty() => continue,
                Some(Ok(text)) => return Some((encode_event(&RelayEvent::text(text)), Some(deltas))),
                Some(Err(err)) => {
                    warn!(error = %err, "generation failed mid-stream");
                    return Some((encode_event(&RelayEvent::error(err.to_string())), None));
                }
                None => return Some((done_event(), None)),
            }
        }
    })
}
