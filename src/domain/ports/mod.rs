//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - TextGenerator: streaming text generation (Anthropic Messages API)
//! - AnalysisTransport: delivery of analysis events to the aggregator
//!
//! These traits keep the extraction and aggregation logic independent of
//! specific network clients.

pub mod analysis_transport;
pub mod text_generator;

pub use analysis_transport::{AnalysisTransport, FragmentStream};
pub use text_generator::{GenerationRequest, TextGenerator, TextStream};
