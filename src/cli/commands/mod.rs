//! CLI command implementations

pub mod analyze;
pub mod extract;
pub mod rules;
