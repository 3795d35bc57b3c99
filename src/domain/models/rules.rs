//! Rule catalog.
//!
//! The five heuristics a prompt is scored against. The catalog is a
//! convention shared with the generation service: it is rendered into the
//! analysis instructions and used for presentation, but extracted results
//! are never validated against it.

use serde::Serialize;

/// A single catalog rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleDefinition {
    /// Canonical rule name, as it appears in `RuleEvaluation::rule`
    pub name: &'static str,
    /// Short human-readable description
    pub description: &'static str,
}

const STANDARD_RULES: [RuleDefinition; 5] = [
    RuleDefinition {
        name: "Clear Objective",
        description: "States exactly what the model should accomplish",
    },
    RuleDefinition {
        name: "Specific Details",
        description: "Names the concrete inputs, scope, and level of detail expected",
    },
    RuleDefinition {
        name: "Relevant Context",
        description: "Gives the background, audience, or purpose the model needs",
    },
    RuleDefinition {
        name: "Output Format",
        description: "Describes the shape, length, or structure of the response",
    },
    RuleDefinition {
        name: "Constraints",
        description: "Sets boundaries such as tone, exclusions, or things to avoid",
    },
];

/// Ordered collection of rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleCatalog {
    rules: &'static [RuleDefinition],
}

impl RuleCatalog {
    /// The canonical five-rule catalog, in evaluation order.
    pub const fn standard() -> Self {
        Self {
            rules: &STANDARD_RULES,
        }
    }

    pub fn rules(&self) -> &'static [RuleDefinition] {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&'static RuleDefinition> {
        self.rules
            .iter()
            .find(|rule| rule.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Position of a rule in evaluation order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.name.eq_ignore_ascii_case(name.trim()))
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_five_rules() {
        let catalog = RuleCatalog::standard();
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.rules()[0].name, "Clear Objective");
    }

    #[test]
    fn test_rule_names_are_unique() {
        let catalog = RuleCatalog::standard();
        for (i, rule) in catalog.rules().iter().enumerate() {
            assert_eq!(catalog.position(rule.name), Some(i));
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = RuleCatalog::standard();
        assert_eq!(
            catalog.find("output format").map(|r| r.name),
            Some("Output Format")
        );
        assert!(catalog.find("Brevity").is_none());
    }
}
