//! Instructions sent to the generation service.

use super::analysis::MAX_SCORE;
use super::rules::RuleCatalog;

/// Builds the system instruction and user message for one analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisPrompt {
    catalog: RuleCatalog,
}

impl AnalysisPrompt {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    /// System instruction describing the rules and the exact output schema.
    ///
    /// Field order matters for streaming: `score` first, `rules` next and
    /// `improvedPrompt` last, so the consumer can show the score and rule
    /// cards while the rewrite is still being generated.
    pub fn system_instruction(&self) -> String {
        let rules = self
            .catalog
            .rules()
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}: {}", i + 1, rule.name, rule.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are an expert prompt engineer. Evaluate the user's prompt against \
            each of the following {count} rules, in this order:\n\n\
            {rules}\n\n\
            Respond with ONLY a JSON object with exactly this shape:\n\
            {{\"score\": <integer 0-{max}>, \
            \"rules\": [{{\"rule\": \"<rule name>\", \"status\": \"pass\" | \"partial\" | \"fail\", \
            \"feedback\": \"<one or two sentences>\", \"recommendation\": \"<concrete fix, or empty string>\"}}], \
            \"improvedPrompt\": \"<the rewritten prompt>\"}}\n\n\
            Emit the fields in that order and one rules entry per rule. \
            Do not wrap the JSON in code fences and do not add any other text.",
            count = self.catalog.len(),
            rules = rules,
            max = MAX_SCORE,
        )
    }

    /// User turn carrying the prompt under analysis.
    pub fn user_message(&self, prompt: &str) -> String {
        format!("Analyze this prompt:\n\n<prompt>\n{}\n</prompt>", prompt.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_lists_every_rule() {
        let prompt = AnalysisPrompt::default();
        let instruction = prompt.system_instruction();

        for rule in RuleCatalog::standard().rules() {
            assert!(instruction.contains(rule.name), "missing {}", rule.name);
        }
        assert!(instruction.contains("\"improvedPrompt\""));
        assert!(instruction.contains("integer 0-10"));
    }

    #[test]
    fn test_user_message_trims_prompt() {
        let prompt = AnalysisPrompt::default();
        let message = prompt.user_message("  write a poem \n");
        assert!(message.contains("<prompt>\nwrite a poem\n</prompt>"));
    }
}
