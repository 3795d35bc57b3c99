//! Shared fixtures for integration tests.

#![allow(dead_code)]

use promptscore::{RuleEvaluation, RuleStatus, StructuredResult};

pub fn rule(name: &str, status: RuleStatus, feedback: &str, recommendation: &str) -> RuleEvaluation {
    RuleEvaluation {
        rule: name.to_string(),
        status,
        feedback: feedback.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// A complete analysis covering every rule.
pub fn sample_result() -> StructuredResult {
    StructuredResult {
        score: 6,
        rules: vec![
            rule("Clear Objective", RuleStatus::Pass, "The goal is stated up front.", ""),
            rule(
                "Specific Details",
                RuleStatus::Partial,
                "Mentions \"tests\" but not which ones.",
                "List the modules that need coverage.",
            ),
            rule(
                "Relevant Context",
                RuleStatus::Fail,
                "No background on the codebase.",
                "Describe the project and its stack.",
            ),
            rule(
                "Output Format",
                RuleStatus::Partial,
                "Asks for code, no structure.",
                "Ask for one file per module.",
            ),
            rule(
                "Constraints",
                RuleStatus::Fail,
                "None given.",
                "State the test framework to use.",
            ),
        ],
        improved_prompt: "Write unit tests for the `parser` and `lexer` modules of my Rust\ncompiler using the built-in test harness.\nPut each module's tests in its own file.".to_string(),
    }
}

/// Compact JSON encoding of [`sample_result`], as a model would stream it.
pub fn sample_document() -> String {
    serde_json::to_string(&sample_result()).expect("sample result serializes")
}

/// Encode text deltas as relay event lines.
pub fn event_lines(deltas: &[&str]) -> String {
    deltas
        .iter()
        .map(|delta| {
            format!(
                "data: {}\n\n",
                serde_json::json!({ "text": delta })
            )
        })
        .collect()
}

/// Split `text` into pieces of at most `size` bytes, on character boundaries.
pub fn split_every(text: &str, size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > size {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
