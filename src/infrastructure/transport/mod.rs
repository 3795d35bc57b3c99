//! Analysis transports.
//!
//! - [`HttpAnalysisTransport`]: remote analyze endpoint over HTTP
//! - [`LocalRelayTransport`]: in-process generator behind the event relay

pub mod http;
pub mod local;

pub use http::HttpAnalysisTransport;
pub use local::LocalRelayTransport;
