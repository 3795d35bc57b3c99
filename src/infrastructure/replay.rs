//! Replay generator for offline runs and tests.

use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};

use crate::domain::errors::GeneratorError;
use crate::domain::ports::{GenerationRequest, TextGenerator, TextStream};

/// Streams a fixed text in small chunks, as a model would.
#[derive(Debug, Clone)]
pub struct ReplayGenerator {
    text: String,
    chunk_chars: usize,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl ReplayGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chunk_chars: 16,
            delay: None,
            failure: None,
        }
    }

    /// Characters per delta; zero is treated as one.
    #[must_use]
    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    /// Pause between deltas.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// End the stream with a mid-stream error after the text.
    #[must_use]
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn chunks(&self) -> Vec<String> {
        let chars: Vec<char> = self.text.chars().collect();
        chars
            .chunks(self.chunk_chars)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

#[async_trait]
impl TextGenerator for ReplayGenerator {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn stream_text(&self, _request: GenerationRequest) -> Result<TextStream, GeneratorError> {
        let mut items: Vec<Result<String, GeneratorError>> =
            self.chunks().into_iter().map(Ok).collect();
        if let Some(message) = &self.failure {
            items.push(Err(GeneratorError::Stream {
                error_type: "replay_error".to_string(),
                message: message.clone(),
            }));
        }

        let delay = self.delay;
        Ok(stream::iter(items)
            .then(move |item| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_chunks_text() {
        let generator = ReplayGenerator::new("héllo wörld").with_chunk_chars(4);
        let stream = generator
            .stream_text(GenerationRequest::new("", "x"))
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(Result::unwrap).collect().await;
        assert_eq!(chunks, vec!["héll", "o wö", "rld"]);
    }

    #[tokio::test]
    async fn test_replay_failure_comes_last() {
        let generator = ReplayGenerator::new("ab").with_chunk_chars(1).failing_with("boom");
        let items: Vec<_> = generator
            .stream_text(GenerationRequest::new("", "x"))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[2], Err(GeneratorError::Stream { message, .. }) if message == "boom"));
    }
}
