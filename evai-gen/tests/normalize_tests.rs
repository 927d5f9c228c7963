//! Integration tests for the score normalization engine

mod helpers;

use evai_common::score::ScoreVector;
use evai_common::{AccessibilityCategory, PolicyTable};
use evai_gen::error::ErrorKind;
use evai_gen::prompt::NORMALIZATION_SYSTEM_PROMPT;
use evai_gen::{GenerationBackend, ScoreNormalizer};
use helpers::{policy_table_without, Outcome, ScriptedBackend};
use std::sync::Arc;

fn normalizer(backend: Arc<ScriptedBackend>) -> ScoreNormalizer {
    let backend: Arc<dyn GenerationBackend> = backend;
    ScoreNormalizer::new(backend, Arc::new(PolicyTable::builtin()))
}

fn raw() -> ScoreVector {
    ScoreVector::new(4.0, 8.0, 6.0, 6.0).unwrap()
}

#[tokio::test]
async fn test_prompt_carries_rationale_and_raw_dimensions() {
    let backend = Arc::new(ScriptedBackend::new());
    let normalizer = normalizer(backend.clone());

    let result = normalizer
        .normalize("I w-w-want to be a pilot", &raw(), AccessibilityCategory::Speech)
        .await
        .unwrap();
    assert_eq!(result.normalized_score, 7.5);

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert_eq!(prompt.system, NORMALIZATION_SYSTEM_PROMPT);
    let policy = PolicyTable::builtin()
        .lookup(AccessibilityCategory::Speech)
        .unwrap()
        .clone();
    assert!(prompt.user.contains(&policy.fairness_rationale));
    assert!(prompt.user.contains("fluency: 4.0"));
    assert!(prompt.user.contains("mean: 6.00"));
}

#[tokio::test]
async fn test_upstream_errors_propagate_verbatim() {
    let backend =
        Arc::new(ScriptedBackend::new().with_normalization(Outcome::Fail(ErrorKind::RateLimited)));
    let err = normalizer(backend)
        .normalize("hello", &raw(), AccessibilityCategory::Autism)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
}

#[tokio::test]
async fn test_missing_justification_is_invalid() {
    let backend = Arc::new(ScriptedBackend::new().with_normalization(Outcome::Reply(
        r#"{"normalized_score": 6.0, "justification": "  "}"#.into(),
    )));
    let err = normalizer(backend)
        .normalize("hello", &raw(), AccessibilityCategory::General)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_out_of_range_score_is_not_clamped() {
    let backend = Arc::new(ScriptedBackend::new().with_normalization(Outcome::Reply(
        r#"Here you go: {"normalized_score": 11.5, "justification": "Generous."}"#.into(),
    )));
    let err = normalizer(backend)
        .normalize("hello", &raw(), AccessibilityCategory::General)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_invalid_raw_score_rejected_without_call() {
    let backend = Arc::new(ScriptedBackend::new());
    let normalizer = normalizer(backend.clone());
    let invalid = ScoreVector {
        fluency: -1.0,
        ..raw()
    };

    let err = normalizer
        .normalize("hello", &invalid, AccessibilityCategory::General)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(backend.generate_count(), 0);
}

#[tokio::test]
async fn test_missing_policy_is_configuration_error() {
    let backend = Arc::new(ScriptedBackend::new());
    let backend_dyn: Arc<dyn GenerationBackend> = backend.clone();
    let normalizer = ScoreNormalizer::new(
        backend_dyn,
        Arc::new(policy_table_without(AccessibilityCategory::Aac)),
    );

    let err = normalizer
        .normalize("hello", &raw(), AccessibilityCategory::Aac)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ConfigurationError);
    assert_eq!(backend.generate_count(), 0);
}
