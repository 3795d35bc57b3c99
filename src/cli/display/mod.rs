//! Human-readable rendering of analysis results.

pub mod colors;

use crate::domain::models::{PartialResult, RuleCatalog, RuleEvaluation};
use crate::services::{AnalysisState, AnalysisStatus};
use colors::{label, pending, section_header, status_icon, style_score, style_status};

/// Render a (possibly partial) result as a card list. Fields that have not
/// arrived yet are shown as pending.
pub fn render_result(result: &PartialResult) -> String {
    let mut lines = Vec::new();

    let score = result
        .score
        .map_or_else(|| pending("pending"), |score| style_score(score).to_string());
    lines.push(format!("{} {score}", label("Score")));

    lines.push(section_header("Rules"));
    match &result.rules {
        Some(rules) if !rules.is_empty() => {
            for rule in rules {
                lines.extend(render_rule(rule));
            }
        }
        Some(_) => lines.push(format!("  {}", pending("no rules reported"))),
        None => lines.push(format!("  {}", pending("pending"))),
    }

    let expected = RuleCatalog::standard().len();
    if let Some(rules) = &result.rules {
        if rules.len() < expected && !result.is_complete() {
            lines.push(format!(
                "  {}",
                pending(&format!("{} of {expected} rules so far", rules.len()))
            ));
        }
    }

    lines.push(section_header("Improved prompt"));
    match &result.improved_prompt {
        Some(prompt) => lines.extend(prompt.lines().map(|line| format!("  {line}"))),
        None => lines.push(format!("  {}", pending("pending"))),
    }

    lines.join("\n")
}

fn render_rule(rule: &RuleEvaluation) -> Vec<String> {
    let mut lines = vec![format!(
        "  {} {} [{}]",
        status_icon(rule.status),
        console::style(&rule.rule).bold(),
        style_status(rule.status)
    )];
    if !rule.feedback.is_empty() {
        lines.push(format!("      {}", rule.feedback));
    }
    if !rule.recommendation.is_empty() {
        lines.push(format!("      → {}", rule.recommendation));
    }
    lines
}

/// One-line progress summary for the spinner.
pub fn progress_message(state: &AnalysisState) -> String {
    let Some(result) = &state.result else {
        return match &state.status {
            AnalysisStatus::Failed(message) => message.clone(),
            _ => "Analyzing prompt...".to_string(),
        };
    };

    let mut parts = Vec::new();
    if let Some(score) = result.score {
        parts.push(format!("score {score}"));
    }
    if result.rules.is_some() {
        parts.push(format!(
            "{}/{} rules",
            result.rule_count(),
            RuleCatalog::standard().len()
        ));
    }
    if result.improved_prompt.is_some() {
        parts.push("improved prompt".to_string());
    }

    format!("Analyzing prompt... {}", parts.join(", "))
}
