//! Promptscore - streaming prompt quality analysis
//!
//! Promptscore asks a language model to score a prompt against a fixed rule
//! catalog and recovers the structured result while the model's JSON output
//! is still streaming, so a score, each rule evaluation and the improved
//! prompt can be shown as soon as they are complete.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): result model, rule catalog, errors and ports
//! - **Service Layer** (`services`): extraction, stream aggregation, sessions
//! - **Infrastructure Layer** (`infrastructure`): API client, transports,
//!   configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use promptscore::extract;
//!
//! let partial = extract(r#"{"score": 7, "rules": [{"rule": "Clear Obj"#).unwrap();
//! assert_eq!(partial.score, Some(7));
//! assert!(partial.rules.is_none());
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{AnalysisError, AnalysisResult, GeneratorError, TransportError};
pub use domain::models::{
    AnalysisPrompt, Config, PartialResult, RuleCatalog, RuleEvaluation, RuleStatus,
    StructuredResult,
};
pub use domain::ports::{AnalysisTransport, TextGenerator};
pub use services::{
    extract, AnalysisSession, AnalysisState, AnalysisStatus, PromptAnalyzer, StreamAggregator,
};
