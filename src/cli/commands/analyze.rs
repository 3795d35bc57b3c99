//! Implementation of the `promptscore analyze` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::cli::display::{progress_message, render_result};
use crate::cli::output::progress::{create_spinner_with_message, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::AnalysisError;
use crate::domain::models::{Config, PartialResult};
use crate::domain::ports::{AnalysisTransport, TextGenerator};
use crate::infrastructure::{
    AnthropicGenerator, HttpAnalysisTransport, LocalRelayTransport, ReplayGenerator,
};
use crate::services::{AnalysisSession, PromptAnalyzer, GENERIC_FAILURE_MESSAGE};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Prompt to analyze
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Remote analyze endpoint (overrides transport.endpoint)
    #[arg(short, long, value_name = "URL", env = "PROMPTSCORE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Stream a recorded model output instead of calling the API
    #[arg(long, value_name = "FILE", conflicts_with = "endpoint")]
    pub replay: Option<PathBuf>,

    /// Delay between replayed chunks, in milliseconds
    #[arg(long, default_value = "20", requires = "replay")]
    pub replay_delay_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub request_id: Option<Uuid>,
    pub complete: bool,
    pub result: Option<PartialResult>,
}

impl CommandOutput for AnalyzeOutput {
    fn to_human(&self) -> String {
        match &self.result {
            Some(result) => render_result(result),
            None => "The analysis finished without a usable result".to_string(),
        }
    }
}

pub async fn execute(args: AnalyzeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let prompt = read_prompt(&args)?;
    let transport = build_transport(&args, config)?;
    debug!(transport = transport.name(), "transport selected");

    let session = AnalysisSession::new();
    let mut updates = session.subscribe();
    let analyzer = PromptAnalyzer::with_session(transport, session.clone());

    let spinner = (!json_mode).then(|| create_spinner_with_message("Analyzing prompt..."));

    let analysis = analyzer.analyze(&prompt);
    tokio::pin!(analysis);

    let outcome = loop {
        tokio::select! {
            outcome = &mut analysis => break outcome,
            changed = updates.changed() => {
                if changed.is_err() {
                    break analysis.await;
                }
                let state = updates.borrow_and_update().clone();
                if let Some(spinner) = &spinner {
                    spinner.set_message(progress_message(&state));
                }
            }
        }
    };

    let state = session.current();
    match outcome {
        Ok(result) => {
            if let Some(spinner) = &spinner {
                spinner.finish_success("Analysis complete");
            }
            output(
                &AnalyzeOutput {
                    request_id: state.request_id,
                    complete: result.as_ref().is_some_and(PartialResult::is_complete),
                    result,
                },
                json_mode,
            );
            Ok(())
        }
        Err(err) => {
            if let Some(spinner) = &spinner {
                spinner.finish_error("Analysis failed");
            }
            if !json_mode {
                if let Some(partial) = &state.result {
                    println!("{}", render_result(partial));
                }
            }
            match err {
                AnalysisError::Producer(message) => bail!(message),
                AnalysisError::EmptyPrompt => Err(err.into()),
                other => Err(anyhow::Error::new(other).context(GENERIC_FAILURE_MESSAGE)),
            }
        }
    }
}

fn read_prompt(args: &AnalyzeArgs) -> Result<String> {
    match (&args.prompt, &args.file) {
        (Some(prompt), _) => Ok(prompt.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt from {}", path.display())),
        (None, None) => bail!("Provide a prompt or --file"),
    }
}

fn build_transport(args: &AnalyzeArgs, config: &Config) -> Result<Box<dyn AnalysisTransport>> {
    if let Some(path) = &args.replay {
        let recorded = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        let generator = ReplayGenerator::new(recorded)
            .with_delay(Duration::from_millis(args.replay_delay_ms));
        return Ok(Box::new(LocalRelayTransport::new(Arc::new(generator))));
    }

    if let Some(endpoint) = args.endpoint.as_ref().or(config.transport.endpoint.as_ref()) {
        let transport = HttpAnalysisTransport::new(endpoint.clone(), &config.transport)?;
        return Ok(Box::new(transport));
    }

    let generator: Arc<dyn TextGenerator> =
        Arc::new(AnthropicGenerator::new(&config.generator, &config.retry)?);
    Ok(Box::new(LocalRelayTransport::new(generator)))
}
