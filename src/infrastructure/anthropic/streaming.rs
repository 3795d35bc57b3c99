//! Server-Sent Events parsing for streaming Messages API responses.
//!
//! The API sends one JSON event per SSE event block:
//!
//! ```text
//! event: content_block_delta
//! data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}
//!
//! ```
//!
//! [`SseParser`] turns raw body chunks into [`StreamEvent`]s; [`text_deltas`]
//! reduces those to the text the model produced.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use tracing::{debug, trace, warn};

use super::types::{Delta, StreamEvent};
use crate::domain::errors::GeneratorError;
use crate::domain::ports::TextStream;

/// Incremental SSE parser.
///
/// Chunks may split lines (and multi-byte characters) anywhere; incomplete
/// lines are kept until the rest arrives.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk and return the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, GeneratorError>> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
            } else if let Some(data) = line.strip_prefix("data:") {
                self.data
                    .push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
            // `event:`, `id:`, `retry:` and `:` comments carry nothing we need
        }

        events
    }

    /// Flush an event left open when the body ended without a blank line.
    pub fn finish(&mut self) -> Option<Result<StreamEvent, GeneratorError>> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&rest);
            if let Some(data) = line.trim_end_matches('\r').strip_prefix("data:") {
                self.data
                    .push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
        }
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<Result<StreamEvent, GeneratorError>> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();

        trace!(payload_len = payload.len(), "sse event");
        Some(serde_json::from_str(&payload).map_err(GeneratorError::from))
    }
}

struct EventState<S> {
    body: S,
    parser: SseParser,
    ready: VecDeque<Result<StreamEvent, GeneratorError>>,
    exhausted: bool,
}

/// Parse a response body into stream events.
pub fn sse_events<S>(body: S) -> impl Stream<Item = Result<StreamEvent, GeneratorError>> + Send
where
    S: Stream<Item = Result<Bytes, GeneratorError>> + Send + Unpin,
{
    let state = EventState {
        body,
        parser: SseParser::new(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((event, state));
            }
            if state.exhausted {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.ready.extend(state.parser.push(&chunk)),
                Some(Err(err)) => {
                    state.exhausted = true;
                    state.ready.push_back(Err(err));
                }
                None => {
                    state.exhausted = true;
                    state.ready.extend(state.parser.finish());
                }
            }
        }
    })
}

/// Reduce stream events to text deltas.
///
/// The text stream ends at `message_stop`. An `error` event, a malformed
/// event, or a body error is yielded once and ends the stream.
pub fn text_deltas<S>(events: S) -> TextStream
where
    S: Stream<Item = Result<StreamEvent, GeneratorError>> + Send + 'static,
{
    stream::unfold(Some(Box::pin(events)), |state| async move {
        let mut events = state?;
        loop {
            match events.next().await? {
                Ok(StreamEvent::ContentBlockDelta {
                    delta: Delta::TextDelta { text },
                }) => return Some((Ok(text), Some(events))),
                Ok(StreamEvent::MessageDelta { delta }) => {
                    if delta.stop_reason.as_deref() == Some("max_tokens") {
                        warn!("generation stopped at max_tokens; the result may be truncated");
                    } else {
                        debug!(stop_reason = ?delta.stop_reason, "generation stopped");
                    }
                }
                Ok(StreamEvent::MessageStop) => return None,
                Ok(StreamEvent::Error { error }) => {
                    let err = GeneratorError::Stream {
                        error_type: error.error_type,
                        message: error.message,
                    };
                    return Some((Err(err), None));
                }
                Ok(_) => {}
                Err(err) => return Some((Err(err), None)),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str) -> String {
        format!(
            "event: content_block_delta\ndata: {{\"type\":\"content_block_delta\",\"index\":0,\"delta\":{{\"type\":\"text_delta\",\"text\":{}}}}}\n\n",
            serde_json::to_string(text).unwrap()
        )
    }

    async fn collect_text(body: Vec<String>) -> Vec<Result<String, GeneratorError>> {
        let chunks: Vec<Result<Bytes, GeneratorError>> =
            body.into_iter().map(|s| Ok(Bytes::from(s))).collect();
        text_deltas(sse_events(stream::iter(chunks))).collect().await
    }

    #[test]
    fn test_parser_handles_split_lines() {
        let mut parser = SseParser::new();
        let body = delta("Hello");
        let (head, tail) = body.split_at(40);

        assert!(parser.push(head.as_bytes()).is_empty());
        let events = parser.push(tail.as_bytes());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].as_ref().unwrap(),
            StreamEvent::ContentBlockDelta { delta: Delta::TextDelta { text } } if text == "Hello"
        ));
    }

    #[test]
    fn test_parser_accepts_crlf() {
        let mut parser = SseParser::new();
        let events = parser.push(b"event: ping\r\ndata: {\"type\":\"ping\"}\r\n\r\n");
        assert!(matches!(events[..], [Ok(StreamEvent::Ping)]));
    }

    #[test]
    fn test_parser_finish_flushes_last_event() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"data: {\"type\":\"message_stop\"}").is_empty());
        assert!(matches!(parser.finish(), Some(Ok(StreamEvent::MessageStop))));
        assert!(parser.finish().is_none());
    }

    #[tokio::test]
    async fn test_text_deltas_in_order() {
        let body = vec![
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n".to_string(),
            delta("{\"score\""),
            delta(": 8}"),
            "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"}}\n\n".to_string(),
            "data: {\"type\":\"message_stop\"}\n\n".to_string(),
            delta("after stop"),
        ];

        let texts: Vec<String> = collect_text(body)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(texts, vec!["{\"score\"", ": 8}"]);
    }

    #[tokio::test]
    async fn test_error_event_ends_stream() {
        let body = vec![
            delta("{"),
            "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n".to_string(),
            delta("never"),
        ];

        let items = collect_text(body).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(
            &items[1],
            Err(GeneratorError::Stream { error_type, .. }) if error_type == "overloaded_error"
        ));
    }

    #[tokio::test]
    async fn test_malformed_event_is_an_error() {
        let items = collect_text(vec!["data: {not json\n\n".to_string()]).await;
        assert!(matches!(items[..], [Err(GeneratorError::Json(_))]));
    }
}
