//! Service layer: extraction, aggregation and analysis orchestration.

pub mod analysis_session;
pub mod analyzer;
pub mod extractor;
pub mod relay;
pub mod stream_aggregator;

pub use analysis_session::{AnalysisSession, AnalysisState, AnalysisStatus, ResultPublisher};
pub use analyzer::{PromptAnalyzer, GENERIC_FAILURE_MESSAGE};
pub use extractor::{extract, strip_code_fence};
pub use relay::{done_event, encode_event, relay_events};
pub use stream_aggregator::{aggregate, Ingested, StreamAggregator};
