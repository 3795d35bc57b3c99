//! Analysis result domain model.
//!
//! An analysis scores a prompt against the rule catalog and proposes a
//! rewritten prompt. The generation service emits it as one JSON document;
//! while that document is still streaming, consumers see a [`PartialResult`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest score the generation service is asked to produce.
pub const MAX_SCORE: u8 = 10;

/// Outcome of evaluating a prompt against a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// The prompt satisfies the rule
    Pass,
    /// The prompt satisfies the rule only in part
    Partial,
    /// The prompt does not satisfy the rule
    Fail,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Partial => "partial",
            Self::Fail => "fail",
        }
    }
}

/// Status text that is not one of the wire names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid rule status: {0}")]
pub struct ParseRuleStatusError(pub String);

impl FromStr for RuleStatus {
    type Err = ParseRuleStatusError;

    /// Matching is exact: the generation service is instructed to emit
    /// lowercase values only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Self::Pass),
            "partial" => Ok(Self::Partial),
            "fail" => Ok(Self::Fail),
            _ => Err(ParseRuleStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation of one catalog rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// Catalog rule name. Not validated against the catalog.
    pub rule: String,
    pub status: RuleStatus,
    pub feedback: String,
    /// Suggested change; empty when the rule passes outright.
    pub recommendation: String,
}

/// Fully resolved analysis, as emitted once the stream has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResult {
    /// Overall score, 0 to [`MAX_SCORE`]
    pub score: u8,
    /// One evaluation per catalog rule, in catalog order
    pub rules: Vec<RuleEvaluation>,
    /// Rewritten prompt
    pub improved_prompt: String,
}

/// Best-effort view of an analysis that may still be streaming.
///
/// Every field is independently present or absent. `rules` only ever holds
/// complete records, and may be shorter than the final list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleEvaluation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_prompt: Option<String>,
}

impl PartialResult {
    /// True when no field has been recovered yet.
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.rules.is_none() && self.improved_prompt.is_none()
    }

    /// True when every field is present.
    pub fn is_complete(&self) -> bool {
        self.score.is_some() && self.rules.is_some() && self.improved_prompt.is_some()
    }

    /// Number of complete rule evaluations recovered so far.
    pub fn rule_count(&self) -> usize {
        self.rules.as_ref().map_or(0, Vec::len)
    }

    /// Convert into a [`StructuredResult`] when every field is present.
    pub fn into_complete(self) -> Option<StructuredResult> {
        match (self.score, self.rules, self.improved_prompt) {
            (Some(score), Some(rules), Some(improved_prompt)) => Some(StructuredResult {
                score,
                rules,
                improved_prompt,
            }),
            _ => None,
        }
    }
}

impl From<StructuredResult> for PartialResult {
    fn from(result: StructuredResult) -> Self {
        Self {
            score: Some(result.score),
            rules: Some(result.rules),
            improved_prompt: Some(result.improved_prompt),
        }
    }
}
