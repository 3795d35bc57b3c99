pub mod analysis;
pub mod config;
pub mod event;
pub mod prompt;
pub mod rules;

pub use analysis::{
    ParseRuleStatusError, PartialResult, RuleEvaluation, RuleStatus, StructuredResult, MAX_SCORE,
};
pub use config::{Config, GeneratorConfig, LoggingConfig, RetryConfig, TransportConfig};
pub use event::{RelayEvent, DATA_PREFIX, DONE_SENTINEL};
pub use prompt::AnalysisPrompt;
pub use rules::{RuleCatalog, RuleDefinition};
