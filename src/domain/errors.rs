//! Domain errors for prompt analysis.

use thiserror::Error;

/// Errors reported by a text-generation service.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 500, 502, 503, 504, 529)
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Error event emitted mid-stream by the service
    #[error("Stream error ({error_type}): {message}")]
    Stream {
        /// Service-specific error type, e.g. `overloaded_error`
        error_type: String,
        /// Human-readable message
        message: String,
    },

    /// No API key configured
    #[error("No API key configured; set generator.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    Unknown(u16, String),
}

impl GeneratorError {
    /// Map an HTTP status and response body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 => Self::InvalidApiKey,
            403 => Self::Forbidden(body),
            404 => Self::NotFound,
            429 => Self::RateLimitExceeded,
            500 | 502 | 503 | 504 | 529 => Self::ServerError(status, body),
            _ => Self::Unknown(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::Network(_)
        )
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidApiKey
                | Self::Forbidden(_)
                | Self::NotFound
                | Self::MissingApiKey
        )
    }
}

/// Failures of the channel that carries analysis events to the aggregator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent
    #[error("Request failed: {0}")]
    Request(String),

    /// The analyze endpoint answered with a non-success status
    #[error("Analyze endpoint returned {0}: {1}")]
    Status(u16, String),

    /// The response carried no body to stream
    #[error("Response has no body")]
    MissingBody,

    /// Reading the body failed mid-stream
    #[error("Stream interrupted: {0}")]
    Stream(String),

    /// The in-process generator could not start
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
}

/// Terminal outcomes of one analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Error event reported by the producer; surfaced verbatim
    #[error("{0}")]
    Producer(String),

    /// Transport-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A newer request or a reset replaced this one
    #[error("Analysis was superseded by a newer request")]
    Superseded,

    /// Nothing to analyze
    #[error("Prompt cannot be empty")]
    EmptyPrompt,
}

/// Convenient result alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
