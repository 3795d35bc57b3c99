use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::instrument;

use crate::domain::errors::TransportError;
use crate::domain::models::AnalysisPrompt;
use crate::domain::ports::{AnalysisTransport, FragmentStream, GenerationRequest, TextGenerator};
use crate::services::relay::relay_events;

/// Runs the producer side in-process: the generator's deltas are relayed
/// through the same event encoding a remote endpoint would send.
pub struct LocalRelayTransport {
    generator: Arc<dyn TextGenerator>,
    prompt: AnalysisPrompt,
}

impl LocalRelayTransport {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_prompt(generator, AnalysisPrompt::default())
    }

    pub fn with_prompt(generator: Arc<dyn TextGenerator>, prompt: AnalysisPrompt) -> Self {
        Self { generator, prompt }
    }
}

#[async_trait]
impl AnalysisTransport for LocalRelayTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip_all, fields(generator = self.generator.name()))]
    async fn open(&self, prompt: &str) -> Result<FragmentStream, TransportError> {
        let request = GenerationRequest::new(
            self.prompt.system_instruction(),
            self.prompt.user_message(prompt),
        );
        let deltas = self.generator.stream_text(request).await?;
        Ok(relay_events(deltas).map(Ok).boxed())
    }
}
