//! Implementation of the `promptscore extract` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::display::render_result;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::PartialResult;
use crate::services::extract;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File holding the model output; reads stdin when omitted
    pub file: Option<PathBuf>,

    /// Replay every prefix of the input and report when each field appears
    #[arg(long)]
    pub prefixes: bool,
}

/// A field that became visible at some prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reveal {
    /// Prefix length in bytes
    pub offset: usize,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub input_len: usize,
    pub result: Option<PartialResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveals: Option<Vec<Reveal>>,
}

impl CommandOutput for ExtractOutput {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();
        if let Some(reveals) = &self.reveals {
            if reveals.is_empty() {
                sections.push("No prefix revealed any field".to_string());
            } else {
                sections.push(TableFormatter::new().format_reveals(reveals));
            }
        }
        match &self.result {
            Some(result) => sections.push(render_result(result)),
            None => sections.push("Nothing extractable".to_string()),
        }
        sections.join("\n\n")
    }
}

pub fn execute(args: ExtractArgs, json_mode: bool) -> Result<()> {
    let input = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let reveals = args.prefixes.then(|| prefix_reveals(&input));
    output(
        &ExtractOutput {
            input_len: input.len(),
            result: extract(&input),
            reveals,
        },
        json_mode,
    );
    Ok(())
}

/// Run the extractor over every prefix (at character boundaries) and record
/// the first prefix at which the score, each rule and the improved prompt
/// appear.
pub fn prefix_reveals(input: &str) -> Vec<Reveal> {
    let mut reveals = Vec::new();
    let mut previous = PartialResult::default();

    let ends = input
        .char_indices()
        .map(|(index, _)| index)
        .skip(1)
        .chain(std::iter::once(input.len()));

    for end in ends {
        let Some(current) = extract(&input[..end]) else {
            continue;
        };

        if previous.score.is_none() {
            if let Some(score) = current.score {
                reveals.push(Reveal {
                    offset: end,
                    field: "score".to_string(),
                    value: score.to_string(),
                });
            }
        }

        if let Some(rules) = &current.rules {
            for (index, rule) in rules.iter().enumerate().skip(previous.rule_count()) {
                reveals.push(Reveal {
                    offset: end,
                    field: format!("rules[{index}]"),
                    value: format!("{} ({})", rule.rule, rule.status),
                });
            }
        }

        if previous.improved_prompt.is_none() {
            if let Some(prompt) = &current.improved_prompt {
                reveals.push(Reveal {
                    offset: end,
                    field: "improvedPrompt".to_string(),
                    value: truncate(prompt, 60),
                });
            }
        }

        previous = current;
    }

    reveals
}
