//! Stream aggregation.
//!
//! Turns transport fragments into published results. Fragments carry
//! `data: <payload>` event lines with arbitrary boundaries; text deltas are
//! appended to one accumulation buffer and the extractor is re-run over the
//! whole buffer after every delta.

use futures::{Stream, StreamExt};
use tracing::{debug, instrument, trace};

use crate::domain::errors::{AnalysisError, AnalysisResult, TransportError};
use crate::domain::models::{PartialResult, RelayEvent, DATA_PREFIX, DONE_SENTINEL};
use crate::services::analysis_session::ResultPublisher;
use crate::services::extractor::extract;

/// Outcome of ingesting one fragment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// New best-known result, if the fragment changed it
    pub update: Option<PartialResult>,
    /// The end-of-stream sentinel was seen
    pub done: bool,
    /// Error message reported by the producer; the stream is closed
    pub failure: Option<String>,
}

enum LineOutcome {
    Skip,
    Appended,
    Done,
    Failed(String),
}

/// Accumulates one request's event stream.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    /// Concatenated text deltas; append-only
    buffer: String,
    /// Trailing event line still waiting for its newline
    pending_line: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    undecoded: Vec<u8>,
    latest: Option<PartialResult>,
    closed: bool,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated text so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Latest best-known result.
    pub fn latest(&self) -> Option<&PartialResult> {
        self.latest.as_ref()
    }

    /// Whether the stream ended (sentinel, producer error, or `finish`).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Ingest a raw byte fragment. UTF-8 sequences split across fragments
    /// are held back until complete.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> Ingested {
        self.undecoded.extend_from_slice(bytes);
        let text = self.decode_available();
        self.ingest(&text)
    }

    /// Ingest a text fragment.
    ///
    /// A producer error event closes the aggregator and is reported in
    /// [`Ingested::failure`], alongside any update from text deltas earlier
    /// in the same fragment. Fragments arriving after the stream closed are
    /// ignored.
    pub fn ingest(&mut self, fragment: &str) -> Ingested {
        let mut ingested = Ingested::default();
        if self.closed {
            return ingested;
        }

        self.pending_line.push_str(fragment);
        let mut appended = false;

        while let Some(newline) = self.pending_line.find('\n') {
            let line: String = self.pending_line.drain(..=newline).collect();
            match self.apply_line(&line) {
                LineOutcome::Skip => {}
                LineOutcome::Appended => {
                    appended = true;
                    if let Some(update) = self.refresh() {
                        ingested.update = Some(update);
                    }
                }
                LineOutcome::Done => {
                    ingested.done = true;
                    self.close();
                    break;
                }
                LineOutcome::Failed(message) => {
                    ingested.failure = Some(message);
                    self.close();
                    break;
                }
            }
        }

        trace!(
            buffer_len = self.buffer.len(),
            appended,
            updated = ingested.update.is_some(),
            "fragment ingested"
        );
        ingested
    }

    /// Close the stream and run the final extraction over the whole buffer.
    ///
    /// A trailing line without its newline is processed first, so a stream
    /// that ends without a final newline loses nothing.
    pub fn finish(&mut self) -> AnalysisResult<Option<PartialResult>> {
        if !self.closed && !self.pending_line.is_empty() {
            let line = std::mem::take(&mut self.pending_line);
            if let LineOutcome::Failed(message) = self.apply_line(&line) {
                self.close();
                return Err(AnalysisError::Producer(message));
            }
        }
        self.close();

        self.latest = extract(&self.buffer);
        debug!(
            buffer_len = self.buffer.len(),
            extracted = self.latest.is_some(),
            "final extraction"
        );
        Ok(self.latest.clone())
    }

    fn apply_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return LineOutcome::Skip;
        };
        let payload = payload.trim();

        if payload.is_empty() {
            return LineOutcome::Skip;
        }
        if payload == DONE_SENTINEL {
            return LineOutcome::Done;
        }

        match serde_json::from_str::<RelayEvent>(payload) {
            Ok(RelayEvent::Text { text }) => {
                self.buffer.push_str(&text);
                LineOutcome::Appended
            }
            Ok(RelayEvent::Error { error }) => LineOutcome::Failed(error),
            Err(err) => {
                debug!(error = %err, payload_len = payload.len(), "skipping undecodable event line");
                LineOutcome::Skip
            }
        }
    }

    /// Decode every complete character in `undecoded`. Invalid sequences
    /// become U+FFFD; an incomplete sequence at the tail stays buffered.
    fn decode_available(&mut self) -> String {
        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.undecoded) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.undecoded.clear();
                    return text;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.undecoded[..valid]));
                    match err.error_len() {
                        None => {
                            self.undecoded.drain(..valid);
                            return text;
                        }
                        Some(invalid) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.undecoded.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
    }

    /// Re-run extraction; returns the result only if it differs from the
    /// latest one.
    fn refresh(&mut self) -> Option<PartialResult> {
        let extracted = extract(&self.buffer)?;
        if self.latest.as_ref() == Some(&extracted) {
            return None;
        }
        self.latest = Some(extracted.clone());
        Some(extracted)
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending_line.clear();
        self.undecoded.clear();
    }
}

/// Drive a fragment stream through a fresh aggregator, publishing every
/// update and, at the end, the definitive result.
///
/// Stops early on a producer error, a transport error, or when the
/// publisher's request has been superseded.
#[instrument(skip_all, fields(request_id = %publisher.request_id()))]
pub async fn aggregate<S>(
    mut fragments: S,
    publisher: &ResultPublisher,
) -> AnalysisResult<Option<PartialResult>>
where
    S: Stream<Item = Result<bytes::Bytes, TransportError>> + Unpin,
{
    let mut aggregator = StreamAggregator::new();
    let mut fragment_count = 0usize;

    while let Some(fragment) = fragments.next().await {
        if !publisher.is_current() {
            debug!(fragment_count, "request superseded, abandoning stream");
            return Err(AnalysisError::Superseded);
        }

        let ingested = aggregator.ingest_bytes(&fragment?);
        fragment_count += 1;

        if let Some(update) = ingested.update {
            debug!(
                score = ?update.score,
                rules = update.rule_count(),
                improved_prompt = update.improved_prompt.is_some(),
                "publishing partial result"
            );
            if !publisher.publish_partial(update) {
                return Err(AnalysisError::Superseded);
            }
        }

        if let Some(message) = ingested.failure {
            debug!(fragment_count, "producer reported an error");
            return Err(AnalysisError::Producer(message));
        }

        if ingested.done {
            break;
        }
    }

    let result = aggregator.finish()?;
    debug!(
        fragment_count,
        complete = result.as_ref().is_some_and(PartialResult::is_complete),
        "stream finished"
    );

    if !publisher.complete(result.clone()) {
        return Err(AnalysisError::Superseded);
    }
    Ok(result)
}
