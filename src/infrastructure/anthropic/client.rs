use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client as ReqwestClient, Response};
use tracing::{debug, instrument};

use super::retry::RetryPolicy;
use super::streaming::{sse_events, text_deltas};
use super::types::{Message, MessagesRequest};
use crate::domain::errors::GeneratorError;
use crate::domain::models::{GeneratorConfig, RetryConfig};
use crate::domain::ports::{GenerationRequest, TextGenerator, TextStream};

/// Streaming client for the Anthropic Messages API.
pub struct AnthropicGenerator {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    api_version: String,
    max_tokens: u32,
    temperature: Option<f32>,
    retry_policy: RetryPolicy,
}

impl AnthropicGenerator {
    /// Build a generator from configuration.
    ///
    /// Fails with [`GeneratorError::MissingApiKey`] when neither the config
    /// nor `ANTHROPIC_API_KEY` provides a key.
    pub fn new(config: &GeneratorConfig, retry: &RetryConfig) -> Result<Self, GeneratorError> {
        let api_key = config
            .resolve_api_key()
            .ok_or(GeneratorError::MissingApiKey)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| GeneratorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry_policy: RetryPolicy::from_config(retry),
        })
    }

    fn build_request(&self, request: GenerationRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(request.system).filter(|s| !s.is_empty()),
            messages: vec![Message::user(request.user_message)],
            stream: true,
            temperature: self.temperature,
        }
    }

    /// Send the request and check the status. The body is left unread.
    async fn send_request(&self, request: &MessagesRequest) -> Result<Response, GeneratorError> {
        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(GeneratorError::from_status(status.as_u16(), body));
        }

        Ok(response)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GeneratorError {
    if err.is_timeout() {
        GeneratorError::Timeout
    } else {
        GeneratorError::Network(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn stream_text(&self, request: GenerationRequest) -> Result<TextStream, GeneratorError> {
        let request = self.build_request(request);
        let response = self
            .retry_policy
            .execute(|| self.send_request(&request))
            .await?;

        debug!(status = response.status().as_u16(), "generation stream opened");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed();
        Ok(text_deltas(sse_events(body)))
    }
}
