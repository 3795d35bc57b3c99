//! Property tests for the extractor over every prefix of generated documents.

use promptscore::{extract, PartialResult, RuleEvaluation, RuleStatus, StructuredResult};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn status_strategy() -> impl Strategy<Value = RuleStatus> {
    prop_oneof![
        Just(RuleStatus::Pass),
        Just(RuleStatus::Partial),
        Just(RuleStatus::Fail),
    ]
}

/// Text with the characters most likely to confuse a scanner: quotes,
/// backslashes, JSON punctuation, control characters and non-ASCII.
fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,:;\"\\\\/{}\\[\\]\n\téü😀]{0,24}"
}

fn rule_strategy() -> impl Strategy<Value = RuleEvaluation> {
    (text_strategy(), status_strategy(), text_strategy(), text_strategy()).prop_map(
        |(rule, status, feedback, recommendation)| RuleEvaluation {
            rule,
            status,
            feedback,
            recommendation,
        },
    )
}

fn result_strategy() -> impl Strategy<Value = StructuredResult> {
    (
        0u8..=10,
        prop::collection::vec(rule_strategy(), 0..6),
        text_strategy(),
    )
        .prop_map(|(score, rules, improved_prompt)| StructuredResult {
            score,
            rules,
            improved_prompt,
        })
}

/// Byte offsets of every prefix, at character boundaries.
fn prefix_ends(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
}

/// Encode with the members in the given order.
fn encode_in_order(result: &StructuredResult, order: [usize; 3]) -> String {
    let members = [
        format!("\"score\": {}", result.score),
        format!(
            "\"rules\": {}",
            serde_json::to_string(&result.rules).expect("rules serialize")
        ),
        format!(
            "\"improvedPrompt\": {}",
            serde_json::to_string(&result.improved_prompt).expect("string serializes")
        ),
    ];
    let ordered: Vec<&str> = order.iter().map(|&i| members[i].as_str()).collect();
    format!("{{{}}}", ordered.join(", "))
}

fn order_strategy() -> impl Strategy<Value = [usize; 3]> {
    prop::sample::select(vec![
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ])
}

fn check_consistent(partial: &PartialResult, full: &StructuredResult) -> Result<(), TestCaseError> {
    if let Some(score) = partial.score {
        prop_assert_eq!(score, full.score);
    }
    if let Some(rules) = &partial.rules {
        prop_assert!(rules.len() <= full.rules.len());
        prop_assert_eq!(rules.as_slice(), &full.rules[..rules.len()]);
    }
    if let Some(prompt) = &partial.improved_prompt {
        prop_assert_eq!(prompt, &full.improved_prompt);
    }
    Ok(())
}

fn check_extends(earlier: &PartialResult, later: &PartialResult) -> Result<(), TestCaseError> {
    if earlier.score.is_some() {
        prop_assert_eq!(earlier.score, later.score);
    }
    if let Some(rules) = &earlier.rules {
        let later_rules = later.rules.as_ref();
        prop_assert!(later_rules.is_some(), "rules disappeared");
        if let Some(later_rules) = later_rules {
            prop_assert!(later_rules.starts_with(rules));
        }
    }
    if earlier.improved_prompt.is_some() {
        prop_assert_eq!(&earlier.improved_prompt, &later.improved_prompt);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every prefix yields nothing or values that agree with the final document.
    #[test]
    fn prop_prefixes_are_consistent(result in result_strategy()) {
        let document = serde_json::to_string(&result).unwrap();
        for end in prefix_ends(&document) {
            if let Some(partial) = extract(&document[..end]) {
                check_consistent(&partial, &result)?;
            }
        }
    }

    /// Fields never regress as the buffer grows.
    #[test]
    fn prop_extraction_is_monotonic(result in result_strategy()) {
        let document = serde_json::to_string(&result).unwrap();
        let mut previous = PartialResult::default();
        for end in prefix_ends(&document) {
            let current = extract(&document[..end]).unwrap_or_default();
            check_extends(&previous, &current)?;
            previous = current;
        }
    }

    /// The complete document decodes to the original.
    #[test]
    fn prop_complete_document_round_trips(result in result_strategy()) {
        let document = serde_json::to_string_pretty(&result).unwrap();
        prop_assert_eq!(extract(&document), Some(PartialResult::from(result)));
    }

    /// Member order does not matter, for complete and partial buffers alike.
    #[test]
    fn prop_member_order_independent(result in result_strategy(), order in order_strategy()) {
        let document = encode_in_order(&result, order);
        prop_assert_eq!(extract(&document), Some(PartialResult::from(result.clone())));

        for end in prefix_ends(&document) {
            if let Some(partial) = extract(&document[..end]) {
                check_consistent(&partial, &result)?;
            }
        }
    }

    /// Same input, same output.
    #[test]
    fn prop_extraction_is_idempotent(result in result_strategy(), cut in 0.0f64..1.0) {
        let document = serde_json::to_string(&result).unwrap();
        let mut end = (document.len() as f64 * cut) as usize;
        while !document.is_char_boundary(end) {
            end -= 1;
        }
        prop_assert_eq!(extract(&document[..end]), extract(&document[..end]));
    }

    /// Wrapping in a code fence changes nothing.
    #[test]
    fn prop_fence_tolerance(result in result_strategy(), tag in prop::sample::select(vec!["", "json", "JSON"])) {
        let document = serde_json::to_string(&result).unwrap();
        let fenced = format!("```{tag}\n{document}\n```");
        prop_assert_eq!(extract(&fenced), extract(&document));
    }

    /// Arbitrary input never panics.
    #[test]
    fn prop_arbitrary_input_never_panics(input in "\\PC{0,200}") {
        let _ = extract(&input);
    }
}
