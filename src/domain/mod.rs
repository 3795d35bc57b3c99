//! Domain layer for Promptscore
//!
//! This module contains the analysis result model, the rule catalog, and the
//! ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{AnalysisError, AnalysisResult, GeneratorError, TransportError};
