//! Prompt analysis orchestration.

use tracing::{info, instrument, warn};

use crate::domain::errors::{AnalysisError, AnalysisResult};
use crate::domain::models::PartialResult;
use crate::domain::ports::AnalysisTransport;
use crate::services::analysis_session::AnalysisSession;
use crate::services::stream_aggregator::aggregate;

/// Message published for failures that did not come from the producer.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze prompt";

/// Runs analyses over a transport and publishes their progress into a
/// session.
pub struct PromptAnalyzer<T: AnalysisTransport> {
    transport: T,
    session: AnalysisSession,
}

impl<T: AnalysisTransport> PromptAnalyzer<T> {
    pub fn new(transport: T) -> Self {
        Self::with_session(transport, AnalysisSession::new())
    }

    /// Publish into an existing session, e.g. one a UI already watches.
    pub fn with_session(transport: T, session: AnalysisSession) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    /// Analyze `prompt`, superseding any analysis still running on the
    /// same session.
    ///
    /// Returns the definitive result, which is `None` when the finished
    /// stream held nothing extractable. Failures are also published to the
    /// session: producer errors verbatim, everything else as
    /// [`GENERIC_FAILURE_MESSAGE`].
    #[instrument(skip_all, fields(transport = self.transport.name(), prompt_len = prompt.len()))]
    pub async fn analyze(&self, prompt: &str) -> AnalysisResult<Option<PartialResult>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AnalysisError::EmptyPrompt);
        }

        let publisher = self.session.begin();
        let request_id = publisher.request_id();
        info!(%request_id, "starting analysis");

        let outcome = match self.transport.open(prompt).await {
            Ok(fragments) => aggregate(fragments, &publisher).await,
            Err(err) => Err(err.into()),
        };

        match outcome {
            Ok(result) => {
                info!(
                    %request_id,
                    complete = result.as_ref().is_some_and(PartialResult::is_complete),
                    "analysis finished"
                );
                Ok(result)
            }
            Err(AnalysisError::Superseded) => {
                info!(%request_id, "analysis superseded");
                Err(AnalysisError::Superseded)
            }
            Err(err) => {
                warn!(%request_id, error = %err, "analysis failed");
                let message = match &err {
                    AnalysisError::Producer(message) => message.clone(),
                    _ => GENERIC_FAILURE_MESSAGE.to_string(),
                };
                publisher.fail(message);
                Err(err)
            }
        }
    }
}
