//! End-to-end analyses over the in-process relay.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{sample_document, sample_result};
use promptscore::infrastructure::{LocalRelayTransport, ReplayGenerator};
use promptscore::services::{AnalysisSession, AnalysisStatus};
use promptscore::{AnalysisError, PromptAnalyzer};

fn analyzer(generator: ReplayGenerator, session: &AnalysisSession) -> PromptAnalyzer<LocalRelayTransport> {
    PromptAnalyzer::with_session(LocalRelayTransport::new(Arc::new(generator)), session.clone())
}

#[tokio::test]
async fn test_replayed_analysis_completes() {
    let session = AnalysisSession::new();
    let analyzer = analyzer(ReplayGenerator::new(sample_document()).with_chunk_chars(5), &session);

    let result = analyzer.analyze("write tests").await.unwrap();
    assert_eq!(result.and_then(|r| r.into_complete()), Some(sample_result()));
    assert_eq!(session.current().status, AnalysisStatus::Complete);
}

#[tokio::test]
async fn test_fenced_output_is_recovered() {
    let session = AnalysisSession::new();
    let fenced = format!("```json\n{}\n```", sample_document());
    let analyzer = analyzer(ReplayGenerator::new(fenced).with_chunk_chars(4), &session);

    let result = analyzer.analyze("write tests").await.unwrap().unwrap();
    assert!(result.is_complete());
}

#[tokio::test]
async fn test_partial_results_are_observed_while_streaming() {
    let session = AnalysisSession::new();
    let mut updates = session.subscribe();
    let analyzer = analyzer(
        ReplayGenerator::new(sample_document())
            .with_chunk_chars(8)
            .with_delay(Duration::from_millis(1)),
        &session,
    );

    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            let done = state.status == AnalysisStatus::Complete;
            seen.push(state);
            if done {
                break;
            }
        }
        seen
    });

    analyzer.analyze("write tests").await.unwrap();
    let seen = observer.await.unwrap();

    assert!(seen
        .iter()
        .any(|s| s.status == AnalysisStatus::Streaming && s.result.as_ref().is_some_and(|r| !r.is_complete())));
    assert_eq!(seen.last().map(|s| s.status.clone()), Some(AnalysisStatus::Complete));
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_result() {
    let session = AnalysisSession::new();
    let document = sample_document();
    let cut = document.find("\"improvedPrompt\"").unwrap();
    let generator = ReplayGenerator::new(&document[..cut]).failing_with("Overloaded");
    let analyzer = analyzer(generator, &session);

    let err = analyzer.analyze("write tests").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Producer(_)));

    let state = session.current();
    assert!(matches!(state.status, AnalysisStatus::Failed(ref m) if m.contains("Overloaded")));
    let partial = state.result.unwrap();
    assert_eq!(partial.score, Some(sample_result().score));
    assert_eq!(partial.rule_count(), 5);
    assert!(partial.improved_prompt.is_none());
}

#[tokio::test]
async fn test_reset_cancels_in_flight_analysis() {
    let session = AnalysisSession::new();
    let analyzer = analyzer(
        ReplayGenerator::new(sample_document())
            .with_chunk_chars(2)
            .with_delay(Duration::from_millis(2)),
        &session,
    );

    let resetter = {
        let session = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.reset();
        })
    };

    let err = analyzer.analyze("write tests").await.unwrap_err();
    resetter.await.unwrap();

    assert!(matches!(err, AnalysisError::Superseded));
    assert_eq!(session.current().status, AnalysisStatus::Idle);
    assert!(session.current().result.is_none());
}

#[tokio::test]
async fn test_newer_request_wins() {
    let session = AnalysisSession::new();
    let slow = analyzer(
        ReplayGenerator::new(sample_document())
            .with_chunk_chars(2)
            .with_delay(Duration::from_millis(2)),
        &session,
    );
    let fast = analyzer(ReplayGenerator::new(r#"{"score": 9, "rules": [], "improvedPrompt": "Fast"}"#), &session);

    let (slow_outcome, fast_outcome) = tokio::join!(slow.analyze("first"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        fast.analyze("second").await
    });

    assert!(matches!(slow_outcome, Err(AnalysisError::Superseded)));
    assert_eq!(fast_outcome.unwrap().and_then(|r| r.score), Some(9));

    let state = session.current();
    assert_eq!(state.status, AnalysisStatus::Complete);
    assert_eq!(state.result.and_then(|r| r.improved_prompt).as_deref(), Some("Fast"));
}

#[tokio::test]
async fn test_empty_prompt() {
    let session = AnalysisSession::new();
    let analyzer = analyzer(ReplayGenerator::new("{}"), &session);
    assert!(matches!(analyzer.analyze("  \n").await, Err(AnalysisError::EmptyPrompt)));
}
