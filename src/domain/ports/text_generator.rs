//! Text generator port - interface for streaming LLM backends.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::errors::GeneratorError;

/// Stream of text deltas, in generation order.
pub type TextStream = BoxStream<'static, Result<String, GeneratorError>>;

/// A single generation: system instruction plus one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub user_message: String,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_message: user_message.into(),
        }
    }
}

/// Trait for services that stream generated text.
///
/// Implementations are constructed explicitly and injected where they are
/// needed; nothing holds a process-wide client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator name, for logs.
    fn name(&self) -> &'static str;

    /// Start a generation and return its delta stream.
    ///
    /// Errors returned here happen before any text was produced. Errors
    /// after that point arrive as items of the stream, which then ends.
    async fn stream_text(&self, request: GenerationRequest) -> Result<TextStream, GeneratorError>;
}
