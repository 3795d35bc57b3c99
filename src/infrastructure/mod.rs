//! Infrastructure layer
//!
//! Adapters behind the domain ports plus process-level concerns:
//! - Anthropic Messages API text generator
//! - Analysis transports (remote HTTP endpoint, in-process relay)
//! - Replay generator for offline runs
//! - Configuration loading and logging setup

pub mod anthropic;
pub mod config;
pub mod logging;
pub mod replay;
pub mod transport;

pub use anthropic::AnthropicGenerator;
pub use config::{ConfigError, ConfigLoader};
pub use logging::{LogConfig, LoggerImpl};
pub use replay::ReplayGenerator;
pub use transport::{HttpAnalysisTransport, LocalRelayTransport};
