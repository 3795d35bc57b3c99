//! Extractor behavior on representative buffers.

mod common;

use common::{rule, sample_document, sample_result};
use promptscore::services::strip_code_fence;
use promptscore::{extract, PartialResult, RuleStatus};

const FIRST_RULE: &str = r#"{"rule": "Clear Objective", "status": "pass", "feedback": "Clear goal.", "recommendation": ""}"#;

#[test]
fn scenario_a_score_only() {
    let result = extract(r#"{"score": 7"#).unwrap();
    assert_eq!(result.score, Some(7));
    assert!(result.rules.is_none());
    assert!(result.improved_prompt.is_none());
}

#[test]
fn scenario_b_incomplete_second_record_is_dropped() {
    let buffer = format!(r#"{{"score": 4, "rules": [{FIRST_RULE}, {{"rule": "Specific Det"#);
    let result = extract(&buffer).unwrap();

    assert_eq!(
        result.rules,
        Some(vec![rule("Clear Objective", RuleStatus::Pass, "Clear goal.", "")])
    );
}

#[test]
fn scenario_c_unterminated_improved_prompt_is_withheld() {
    let buffer = format!(
        r#"{{"score": 4, "rules": [{FIRST_RULE}], "improvedPrompt": "Be more speci"#
    );
    let result = extract(&buffer).unwrap();

    assert_eq!(result.score, Some(4));
    assert_eq!(result.rule_count(), 1);
    assert!(result.improved_prompt.is_none());
}

#[test]
fn scenario_d_escaped_quotes_inside_record() {
    let buffer = r#"{"score": 8, "rules": [{"rule": "Output Format", "status": "partial", "feedback": "uses \"quotes\" well", "recommendation": "Say \"JSON\"."}, {"#;
    let result = extract(buffer).unwrap();
    let rules = result.rules.unwrap();

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].feedback, r#"uses "quotes" well"#);
    assert_eq!(rules[0].recommendation, r#"Say "JSON"."#);
}

#[test]
fn scenario_e_complete_document() {
    let result = extract(&sample_document()).unwrap();
    assert_eq!(result, PartialResult::from(sample_result()));
    assert!(result.is_complete());
    assert_eq!(result.into_complete(), Some(sample_result()));
}

#[test]
fn scenario_f_empty_buffer() {
    assert!(extract("").is_none());
    assert!(extract("   \n").is_none());
}

#[test]
fn fence_open_marker_only() {
    assert!(extract("```").is_none());
    assert!(extract("```json").is_none());
    assert!(extract("```json\n").is_none());
    assert_eq!(strip_code_fence("```json"), "");
}

#[test]
fn fenced_complete_document() {
    let fenced = format!("```json\n{}\n```", sample_document());
    assert_eq!(extract(&fenced), extract(&sample_document()));

    let bare = format!("```\n{}\n```\n", sample_document());
    assert_eq!(extract(&bare), extract(&sample_document()));
}

#[test]
fn fenced_partial_document() {
    let result = extract("```json\n{\"score\": 9, \"rules\": [").unwrap();
    assert_eq!(result.score, Some(9));
}

#[test]
fn multi_digit_score() {
    assert_eq!(extract(r#"{"score": 10,"#).unwrap().score, Some(10));
    assert_eq!(extract(r#"{"score": 10"#).unwrap().score, Some(10));
}

#[test]
fn out_of_range_score_is_dropped_on_both_paths() {
    assert!(extract(r#"{"score": 25,"#).is_none());

    let partial = extract(r#"{"score": 25, "rules": [], "#).unwrap();
    assert_eq!(partial.score, None);
    assert_eq!(partial.rules, Some(vec![]));

    let complete = extract(r#"{"score": 42, "rules": [], "improvedPrompt": "Be specific."}"#).unwrap();
    assert_eq!(complete.score, None);
    assert_eq!(complete.rules, Some(vec![]));
    assert_eq!(complete.improved_prompt.as_deref(), Some("Be specific."));
}

#[test]
fn lone_one_is_held_back_until_disambiguated() {
    assert!(extract(r#"{"score": 1"#).is_none());
    assert_eq!(extract(r#"{"score": 1,"#).unwrap().score, Some(1));
    assert_eq!(extract(r#"{"score": 1}"#).unwrap().score, Some(1));
}

#[test]
fn escaped_quote_followed_by_delimiter_text() {
    let buffer = r#"{"rules": [{"rule": "Constraints", "status": "fail", "feedback": "ends with \", \"status\": \"pass", "recommendation": "x"}]"#;
    let rules = extract(buffer).unwrap().rules.unwrap();

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].status, RuleStatus::Fail);
    assert_eq!(rules[0].feedback, r#"ends with ", "status": "pass"#);
}

#[test]
fn escaped_quote_is_not_a_closing_quote() {
    let open = r#"{"score": 5, "improvedPrompt": "Say \"done\" when \"finished"#;
    assert!(extract(open).unwrap().improved_prompt.is_none());

    let closed = format!("{open}\\\"\"");
    assert_eq!(
        extract(&closed).unwrap().improved_prompt.as_deref(),
        Some(r#"Say "done" when "finished""#)
    );
}

#[test]
fn trailing_backslash_keeps_string_open() {
    let buffer = r#"{"score": 5, "improvedPrompt": "C:\\path\"#;
    assert!(extract(buffer).unwrap().improved_prompt.is_none());
}

#[test]
fn unicode_escapes_decode() {
    let buffer = r#"{"score": 3, "improvedPrompt": "caf\u00e9 \ud83d\ude00"}"#;
    assert_eq!(
        extract(buffer).unwrap().improved_prompt.as_deref(),
        Some("café 😀")
    );
}

#[test]
fn non_json_output_yields_nothing() {
    assert!(extract("I'm sorry, I can't evaluate that prompt.").is_none());
}

#[test]
fn empty_closed_rules_array() {
    let result = extract(r#"{"score": 2, "rules": [], "improvedPr"#).unwrap();
    assert_eq!(result.rules, Some(vec![]));
}

#[test]
fn record_with_unknown_status_is_skipped() {
    let buffer = format!(
        r#"{{"rules": [{{"rule": "Constraints", "status": "maybe", "feedback": "", "recommendation": ""}}, {FIRST_RULE}]"#
    );
    let rules = extract(&buffer).unwrap().rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule, "Clear Objective");
}
