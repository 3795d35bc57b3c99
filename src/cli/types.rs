//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::analyze::AnalyzeArgs;
use crate::cli::commands::extract::ExtractArgs;

#[derive(Parser, Debug)]
#[command(name = "promptscore")]
#[command(about = "Promptscore - streaming prompt quality analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .promptscore/config.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a prompt, showing results as they stream in
    Analyze(AnalyzeArgs),

    /// Run the extractor over a captured model output
    Extract(ExtractArgs),

    /// List the rules prompts are evaluated against
    Rules,
}
