//! Status and score styling for CLI output.
//!
//! Styling is dropped automatically when stdout is not a terminal or
//! colors are disabled, via `console`.

use console::{style, StyledObject};

use crate::domain::models::{RuleStatus, MAX_SCORE};

/// Colored status word.
///
/// Green for pass, yellow for partial, red for fail.
pub fn style_status(status: RuleStatus) -> StyledObject<&'static str> {
    match status {
        RuleStatus::Pass => style(status.as_str()).green().bold(),
        RuleStatus::Partial => style(status.as_str()).yellow(),
        RuleStatus::Fail => style(status.as_str()).red().bold(),
    }
}

pub fn status_icon(status: RuleStatus) -> &'static str {
    match status {
        RuleStatus::Pass => "✓",
        RuleStatus::Partial => "◐",
        RuleStatus::Fail => "✗",
    }
}

/// `score/10`, colored by band.
pub fn style_score(score: u8) -> StyledObject<String> {
    let text = format!("{score}/{MAX_SCORE}");
    match score {
        8.. => style(text).green().bold(),
        5..=7 => style(text).yellow().bold(),
        _ => style(text).red().bold(),
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}

/// Section header with underline.
pub fn section_header(title: &str) -> String {
    format!("\n{}", style(title).bold().underlined())
}

pub fn pending(text: &str) -> String {
    style(text).dim().italic().to_string()
}
