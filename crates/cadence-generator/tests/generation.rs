// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the two-pass generation pipeline.

use cadence_core::{
    AttemptStatus, CadenceError, GenerationPhase, MessageType, SequenceStatus, ToneAxes,
};
use cadence_generator::ExecutorConfig;
use cadence_test_utils::{MockProvider, TestHarness, fixtures};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn scripted(responses: Vec<String>) -> TestHarness {
    TestHarness::builder()
        .with_mock_responses(responses)
        .build()
        .await
        .expect("harness should build")
}

#[tokio::test]
async fn known_demo_id_generates_three_step_sequence() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(3),
    ])
    .await;

    let result = harness
        .generate(&fixtures::request("known-demo-id", 3))
        .await
        .unwrap();

    assert_eq!(result.sequence.status, SequenceStatus::Completed);
    assert_eq!(result.sequence.step_count, 3);
    assert_eq!(result.sequence.overall_confidence, Some(0.82));
    assert!(result.sequence.error_message.is_none());

    let steps: Vec<_> = result.messages.iter().map(|m| m.step_number).collect();
    assert_eq!(steps, vec![1, 2, 3]);
    let types: Vec<_> = result.messages.iter().map(|m| m.message_type).collect();
    assert_eq!(
        types,
        vec![
            MessageType::ConnectionRequest,
            MessageType::FollowUpValue,
            MessageType::DirectAsk
        ]
    );

    assert!(result.usage.attempt_count >= 2);
    assert_eq!(result.usage.total_tokens, 60);
    assert!(result.usage.total_cost_usd > 0.0);
    assert_eq!(result.usage.models, vec!["gpt-4o"]);

    let analysis = result.sequence.prospect_analysis.unwrap();
    assert_eq!(analysis["seniority"], "executive");
    assert!(analysis["pain_points"].is_array());
}

#[tokio::test]
async fn recovers_fenced_and_prefixed_output() {
    let harness = scripted(vec![
        fixtures::fenced(&fixtures::analysis_response()),
        format!("Sure! {}", fixtures::sequence_response(2)),
    ])
    .await;

    let result = harness
        .generate(&fixtures::request("jane-doe", 2))
        .await
        .unwrap();
    assert_eq!(result.sequence.status, SequenceStatus::Completed);
    assert_eq!(result.messages.len(), 2);
}

#[tokio::test]
async fn sparse_analysis_is_normalized_before_storage() {
    let harness = scripted(vec![
        r#"{"summary": "Ops leader", "seniority": "wizard", "pain_points": "budget"}"#.into(),
        fixtures::sequence_response(1),
    ])
    .await;

    let result = harness
        .generate(&fixtures::request("jane-doe", 1))
        .await
        .unwrap();
    let analysis = result.sequence.prospect_analysis.unwrap();
    assert_eq!(analysis["seniority"], "unknown");
    assert_eq!(analysis["pain_points"], serde_json::json!([]));
    assert_eq!(analysis["communication_style"], "");
}

#[tokio::test]
async fn second_pass_prompt_carries_tone_and_analysis() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(3),
    ])
    .await;
    let request = fixtures::request("jane-doe", 3);
    harness.generate(&request).await.unwrap();

    let requests = harness.mock_provider.requests().await;
    assert_eq!(requests.len(), 2);
    let pass2_system = &requests[1].messages[0].content;
    assert!(pass2_system.contains(&cadence_tone::translate(&request.tone)));
    let pass2_user = &requests[1].messages[1].content;
    assert!(pass2_user.contains("slow CI pipelines"));
    assert!(pass2_user.contains(&request.context));
    assert!(requests.iter().all(|r| r.json_mode));
}

#[tokio::test]
async fn invalid_request_creates_nothing() {
    let harness = scripted(vec![]).await;

    let err = harness
        .generate(&fixtures::request("jane-doe", 11))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::Validation(_)));

    let mut request = fixtures::request("jane-doe", 3);
    request.tone.warmth = 1.5;
    let err = harness.generate(&request).await.unwrap_err();
    assert!(matches!(err, CadenceError::Validation(_)));

    assert!(harness.storage.list_sequences(None).await.unwrap().is_empty());
    assert!(harness.mock_provider.requests().await.is_empty());
}

#[tokio::test]
async fn unknown_tone_config_is_not_found_before_sequence_exists() {
    let harness = scripted(vec![]).await;
    let mut request = fixtures::request("jane-doe", 3);
    request.tone_config_id = Some("tc-missing".into());

    let err = harness.generate(&request).await.unwrap_err();
    match err {
        CadenceError::NotFound { entity, id } => {
            assert_eq!(entity, "tone configuration");
            assert_eq!(id, "tc-missing");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(harness.storage.list_sequences(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn saved_tone_config_is_referenced() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(2),
    ])
    .await;
    let mut axes = ToneAxes::new(0.1, 0.9, 0.9);
    axes.humor = Some(0.8);
    let saved = harness
        .generator
        .save_tone_config("playful", axes.clone())
        .await
        .unwrap();

    let mut request = fixtures::request("jane-doe", 2);
    request.tone_config_id = Some(saved.id.clone());
    let result = harness.generate(&request).await.unwrap();

    assert_eq!(result.sequence.tone_config_id, saved.id);
    let requests = harness.mock_provider.requests().await;
    assert!(requests[1].messages[0].content.contains(&cadence_tone::translate(&axes)));
    // No ad-hoc config is created when a saved one is referenced.
    assert_eq!(harness.generator.tone_configs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn inline_tone_is_persisted_as_ad_hoc_config() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(1),
    ])
    .await;
    let request = fixtures::request("jane-doe", 1);
    let result = harness.generate(&request).await.unwrap();

    let configs = harness.generator.tone_configs().await.unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].id, result.sequence.tone_config_id);
    assert_eq!(configs[0].axes, request.tone);
}

#[tokio::test]
async fn missing_messages_array_fails_and_keeps_analysis() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        r#"{"sequence": "I could not do it"}"#.into(),
    ])
    .await;

    let err = harness
        .generate(&fixtures::request("jane-doe", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::Parse { .. }));

    let sequences = harness.storage.list_sequences(None).await.unwrap();
    assert_eq!(sequences.len(), 1);
    let failed = &sequences[0];
    assert_eq!(failed.status, SequenceStatus::Failed);
    assert!(failed.error_message.as_deref().unwrap().contains("messages"));
    assert!(failed.prospect_analysis.is_some());
    assert!(harness.storage.get_messages(&failed.id).await.unwrap().is_empty());

    // The raw pass-2 reply stays in the attempt log.
    let attempts = harness.generator.attempts(&failed.id).await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].phase, GenerationPhase::SequenceGeneration);
    assert!(attempts[1].raw_response.as_deref().unwrap().contains("could not"));
}

#[tokio::test]
async fn unparseable_analysis_fails_sequence() {
    let harness = scripted(vec!["I am unable to analyze this profile.".into()]).await;

    let err = harness
        .generate(&fixtures::request("jane-doe", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::Parse { .. }));
    let sequences = harness.storage.list_sequences(Some(SequenceStatus::Failed)).await.unwrap();
    assert_eq!(sequences.len(), 1);
    assert!(sequences[0].prospect_analysis.is_none());
}

#[tokio::test]
async fn exhausted_models_fail_sequence_with_six_attempts() {
    let provider = MockProvider::new();
    for i in 0..6 {
        provider
            .push_error(CadenceError::provider(format!("upstream {i}")))
            .await;
    }
    let harness = TestHarness::builder()
        .with_provider(provider)
        .build()
        .await
        .unwrap();

    let err = harness
        .generate(&fixtures::request("jane-doe", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::FallbackExhausted { attempts: 6, .. }));

    let sequences = harness.storage.list_sequences(None).await.unwrap();
    let failed = &sequences[0];
    assert_eq!(failed.status, SequenceStatus::Failed);
    let attempts = harness.generator.attempts(&failed.id).await.unwrap();
    assert_eq!(attempts.len(), 6);
    assert!(attempts.iter().all(|a| a.phase == GenerationPhase::ProfileAnalysis));
    assert_eq!(attempts[2].status, AttemptStatus::Timeout);
    assert_eq!(attempts[3].model, "gpt-4o-mini");

    let summary = harness.generator.get_sequence_result(&failed.id).await.unwrap();
    assert_eq!(summary.usage.attempt_count, 6);
    assert_eq!(summary.usage.models, vec!["gpt-4o", "gpt-4o-mini"]);
}

#[tokio::test]
async fn retry_recovers_within_a_phase() {
    let provider = MockProvider::new();
    provider.push_error(CadenceError::provider("503")).await;
    provider.push_response(fixtures::analysis_response()).await;
    provider.push_response(fixtures::sequence_response(2)).await;
    let harness = TestHarness::builder()
        .with_provider(provider)
        .with_executor_config(ExecutorConfig {
            fallback_model: None,
            backoff_base: Duration::from_millis(1),
            ..ExecutorConfig::default()
        })
        .build()
        .await
        .unwrap();

    let result = harness
        .generate(&fixtures::request("jane-doe", 2))
        .await
        .unwrap();
    assert_eq!(result.sequence.status, SequenceStatus::Completed);
    assert_eq!(result.usage.attempt_count, 3);
}

#[tokio::test]
async fn cancelled_generation_marks_sequence_failed() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(2),
    ])
    .await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = harness
        .generator
        .generate(&fixtures::request("jane-doe", 2), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::Cancelled));

    let sequences = harness.storage.list_sequences(None).await.unwrap();
    assert_eq!(sequences[0].status, SequenceStatus::Failed);
    assert_eq!(sequences[0].error_message.as_deref(), Some("generation cancelled"));
}

#[tokio::test]
async fn same_subject_reuses_cached_profile() {
    let harness = scripted(vec![
        fixtures::analysis_response(),
        fixtures::sequence_response(1),
        fixtures::analysis_response(),
        fixtures::sequence_response(1),
    ])
    .await;

    let a = harness
        .generate(&fixtures::request("https://linkedin.com/in/Known-Demo-Id/", 1))
        .await
        .unwrap();
    let b = harness
        .generate(&fixtures::request("known-demo-id", 1))
        .await
        .unwrap();
    assert_eq!(a.sequence.profile_id, b.sequence.profile_id);
    assert_ne!(a.sequence.id, b.sequence.id);
}

#[tokio::test]
async fn unknown_sequence_is_not_found() {
    let harness = scripted(vec![]).await;
    let err = harness
        .generator
        .get_sequence_result("does-not-exist")
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::NotFound { entity: "sequence", .. }));
}
