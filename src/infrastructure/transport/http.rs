use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client as ReqwestClient};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::errors::TransportError;
use crate::domain::models::TransportConfig;
use crate::domain::ports::{AnalysisTransport, FragmentStream};

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    prompt: &'a str,
}

/// Posts prompts to a remote analyze endpoint and streams its event body.
pub struct HttpAnalysisTransport {
    http_client: ReqwestClient,
    endpoint: String,
}

impl HttpAnalysisTransport {
    pub fn new(endpoint: impl Into<String>, config: &TransportConfig) -> Result<Self, TransportError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn open(&self, prompt: &str) -> Result<FragmentStream, TransportError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(header::ACCEPT, "text/event-stream")
            .json(&AnalyzeRequest { prompt })
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status(status.as_u16(), body));
        }
        if response.content_length() == Some(0) {
            return Err(TransportError::MissingBody);
        }

        debug!(status = status.as_u16(), "analysis stream opened");
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Stream(e.to_string())))
            .boxed())
    }
}
