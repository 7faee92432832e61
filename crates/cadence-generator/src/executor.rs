// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model call executor: timeout, retry, exponential backoff, and model
//! fallback around a single [`ModelProvider`] invocation.
//!
//! Every attempt, successful or not, is appended to the [`AttemptLedger`]
//! before the executor retries or returns. A ledger write failure aborts
//! the call.
//!
//! Attempt `n` (1-based) under a model is followed by a sleep of
//! `backoff_base * 2^n` when it fails and is not the last attempt for that
//! model. The last attempt is recorded as `timeout` because retries are
//! exhausted under that model; the executor then restarts at `n = 1` under
//! the fallback model, if a distinct one is configured.

use std::sync::Arc;
use std::time::Duration;

use cadence_config::CadenceConfig;
use cadence_core::domain::now_timestamp;
use cadence_core::types::render_prompt;
use cadence_core::{
    AttemptLedger, AttemptStatus, CadenceError, CompletionRequest, CompletionResponse,
    GenerationAttempt, GenerationPhase, ModelProvider, PromptMessage, TokenUsage,
};
use cadence_cost::PricingTable;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retry and request parameters for [`ModelCallExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub primary_model: String,
    /// Used once the primary model exhausts its retries. Ignored when equal
    /// to the primary.
    pub fallback_model: Option<String>,
    /// Attempts per model.
    pub max_retries: u32,
    /// Backoff unit. Attempt `n` sleeps `backoff_base * 2^n` after failing.
    pub backoff_base: Duration,
    /// Per-attempt deadline.
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub json_mode: bool,
    /// Record a cost estimate on successful attempts.
    pub track_costs: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            primary_model: "gpt-4o".to_string(),
            fallback_model: Some("gpt-4o-mini".to_string()),
            max_retries: 3,
            backoff_base: Duration::from_millis(1000),
            timeout: Duration::from_secs(120),
            max_tokens: Some(4096),
            temperature: Some(0.7),
            json_mode: true,
            track_costs: true,
        }
    }
}

impl ExecutorConfig {
    pub fn from_config(config: &CadenceConfig) -> Self {
        Self {
            primary_model: config.provider.model.clone(),
            fallback_model: config.provider.fallback_model.clone(),
            max_retries: config.retry.max_retries,
            backoff_base: Duration::from_millis(config.retry.backoff_base_ms),
            timeout: Duration::from_secs(config.provider.timeout_secs),
            max_tokens: Some(config.provider.max_tokens),
            temperature: config.provider.temperature,
            json_mode: config.provider.json_mode,
            track_costs: config.cost.track_costs,
        }
    }

    /// Models in the order they are tried.
    pub fn model_chain(&self) -> Vec<&str> {
        let mut chain = vec![self.primary_model.as_str()];
        if let Some(fallback) = self
            .fallback_model
            .as_deref()
            .filter(|f| !f.is_empty() && *f != self.primary_model)
        {
            chain.push(fallback);
        }
        chain
    }

    /// Sleep after failed attempt `n` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Successful outcome of [`ModelCallExecutor::execute`].
#[derive(Debug, Clone)]
pub struct AttemptResult {
    /// Raw model text.
    pub content: String,
    /// Model that produced the text.
    pub model: String,
    pub usage: TokenUsage,
    pub latency: Duration,
    /// Attempts made across all models, including the successful one.
    pub attempts: u32,
}

/// Executes model calls for one pipeline.
pub struct ModelCallExecutor {
    provider: Arc<dyn ModelProvider>,
    ledger: Arc<dyn AttemptLedger>,
    pricing: PricingTable,
    config: ExecutorConfig,
}

enum CallOutcome {
    Completed(Result<CompletionResponse, CadenceError>),
    Cancelled,
}

impl ModelCallExecutor {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        ledger: Arc<dyn AttemptLedger>,
        pricing: PricingTable,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            ledger,
            pricing,
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs one model call to completion under the retry/fallback policy.
    ///
    /// Transient errors (provider failures and timeouts) are retried. Any
    /// other provider error is recorded and returned immediately. When
    /// every model is exhausted the result is
    /// [`CadenceError::FallbackExhausted`].
    pub async fn execute(
        &self,
        messages: &[PromptMessage],
        phase: GenerationPhase,
        sequence_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AttemptResult, CadenceError> {
        let prompt = render_prompt(messages);
        let chain = self.config.model_chain();
        let max_retries = self.config.max_retries.max(1);
        let mut total_attempts = 0u32;
        let mut last_error = String::new();

        for (model_index, model) in chain.iter().enumerate() {
            if model_index > 0 {
                warn!(
                    phase = %phase,
                    sequence_id,
                    from = chain[model_index - 1],
                    to = *model,
                    "retries exhausted, switching to fallback model"
                );
            }

            for n in 1..=max_retries {
                if cancel.is_cancelled() {
                    return Err(CadenceError::Cancelled);
                }
                total_attempts += 1;

                let request = CompletionRequest {
                    model: (*model).to_string(),
                    messages: messages.to_vec(),
                    max_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                    json_mode: self.config.json_mode,
                    timeout: self.config.timeout,
                };

                let started = Instant::now();
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => CallOutcome::Cancelled,
                    result = tokio::time::timeout(self.config.timeout, self.provider.complete(request)) => {
                        CallOutcome::Completed(result.unwrap_or(Err(CadenceError::Timeout {
                            duration: self.config.timeout,
                        })))
                    }
                };
                let latency = started.elapsed();

                let error = match outcome {
                    CallOutcome::Completed(Ok(response)) => {
                        // Cost and ledger both use the model that actually answered.
                        let cost = self
                            .config
                            .track_costs
                            .then(|| self.pricing.estimate(&response.model, &response.usage));
                        let usage = response.usage;
                        self.ledger
                            .record(&GenerationAttempt {
                                id: uuid::Uuid::new_v4().to_string(),
                                sequence_id: sequence_id.to_string(),
                                phase,
                                model: response.model.clone(),
                                prompt_tokens: Some(usage.prompt_tokens),
                                completion_tokens: Some(usage.completion_tokens),
                                total_tokens: Some(usage.total()),
                                estimated_cost_usd: cost,
                                latency_ms: latency.as_millis() as u64,
                                prompt: prompt.clone(),
                                raw_response: Some(response.content.clone()),
                                status: AttemptStatus::Success,
                                error_message: None,
                                created_at: now_timestamp(),
                            })
                            .await?;
                        info!(
                            phase = %phase,
                            sequence_id,
                            model = *model,
                            served_model = %response.model,
                            attempt = n,
                            status = %AttemptStatus::Success,
                            latency_ms = latency.as_millis() as u64,
                            tokens = usage.total(),
                            "model call succeeded"
                        );
                        return Ok(AttemptResult {
                            content: response.content,
                            model: response.model,
                            usage,
                            latency,
                            attempts: total_attempts,
                        });
                    }
                    CallOutcome::Completed(Err(e)) => e,
                    CallOutcome::Cancelled => {
                        self.record_failure(
                            sequence_id,
                            phase,
                            model,
                            &prompt,
                            latency,
                            AttemptStatus::Error,
                            &CadenceError::Cancelled,
                        )
                        .await?;
                        return Err(CadenceError::Cancelled);
                    }
                };

                let exhausted = n == max_retries;
                let status = if exhausted || matches!(error, CadenceError::Timeout { .. }) {
                    AttemptStatus::Timeout
                } else {
                    AttemptStatus::Error
                };
                self.record_failure(sequence_id, phase, model, &prompt, latency, status, &error)
                    .await?;
                last_error = error.to_string();

                if !error.is_transient() {
                    warn!(
                        phase = %phase,
                        sequence_id,
                        model = *model,
                        attempt = n,
                        error = %error,
                        "model call failed with a non-retryable error"
                    );
                    return Err(error);
                }

                if exhausted {
                    warn!(
                        phase = %phase,
                        sequence_id,
                        model = *model,
                        attempt = n,
                        status = %status,
                        error = %error,
                        "model call failed, retries exhausted"
                    );
                    continue;
                }

                let delay = self.config.backoff(n);
                warn!(
                    phase = %phase,
                    sequence_id,
                    model = *model,
                    attempt = n,
                    status = %status,
                    latency_ms = latency.as_millis() as u64,
                    backoff_ms = delay.as_millis() as u64,
                    error = %error,
                    "model call failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(sequence_id, "cancelled during backoff");
                        return Err(CadenceError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        Err(CadenceError::FallbackExhausted {
            attempts: total_attempts,
            last_error,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_failure(
        &self,
        sequence_id: &str,
        phase: GenerationPhase,
        model: &str,
        prompt: &str,
        latency: Duration,
        status: AttemptStatus,
        error: &CadenceError,
    ) -> Result<(), CadenceError> {
        self.ledger
            .record(&GenerationAttempt {
                id: uuid::Uuid::new_v4().to_string(),
                sequence_id: sequence_id.to_string(),
                phase,
                model: model.to_string(),
                prompt_tokens: None,
                completion_tokens: None,
                total_tokens: None,
                estimated_cost_usd: None,
                latency_ms: latency.as_millis() as u64,
                prompt: prompt.to_string(),
                raw_response: None,
                status,
                error_message: Some(error.to_string()),
                created_at: now_timestamp(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_test_utils::{MemoryLedger, MockProvider};

    fn config() -> ExecutorConfig {
        ExecutorConfig {
            primary_model: "gpt-4o".into(),
            fallback_model: Some("gpt-4o-mini".into()),
            max_retries: 3,
            backoff_base: Duration::from_millis(1000),
            timeout: Duration::from_secs(120),
            max_tokens: Some(512),
            temperature: None,
            json_mode: true,
            track_costs: true,
        }
    }

    fn executor(
        provider: Arc<MockProvider>,
        ledger: Arc<MemoryLedger>,
        config: ExecutorConfig,
    ) -> ModelCallExecutor {
        ModelCallExecutor::new(provider, ledger, PricingTable::hosted(), config)
    }

    fn prompt() -> Vec<PromptMessage> {
        vec![PromptMessage::system("sys"), PromptMessage::user("go")]
    }

    #[test]
    fn identical_fallback_is_ignored() {
        let mut cfg = config();
        cfg.fallback_model = Some("gpt-4o".into());
        assert_eq!(cfg.model_chain(), vec!["gpt-4o"]);
        cfg.fallback_model = None;
        assert_eq!(cfg.model_chain(), vec!["gpt-4o"]);
        assert_eq!(config().model_chain(), vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[test]
    fn backoff_doubles_from_two_units() {
        let cfg = config();
        assert_eq!(cfg.backoff(1), Duration::from_secs(2));
        assert_eq!(cfg.backoff(2), Duration::from_secs(4));
        assert_eq!(cfg.backoff(3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_records_one_attempt() {
        let provider = Arc::new(MockProvider::with_responses(vec!["{\"ok\":true}".into()]));
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let result = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.content, "{\"ok\":true}");
        assert_eq!(result.attempts, 1);
        let attempts = ledger.attempts().await;
        assert_eq!(attempts.len(), 1);
        let a = &attempts[0];
        assert_eq!(a.status, AttemptStatus::Success);
        assert_eq!(a.phase, GenerationPhase::ProfileAnalysis);
        assert_eq!(a.total_tokens, Some(a.prompt_tokens.unwrap() + a.completion_tokens.unwrap()));
        assert!(a.estimated_cost_usd.unwrap() > 0.0);
        assert_eq!(a.raw_response.as_deref(), Some("{\"ok\":true}"));
        assert!(a.prompt.contains("[system]\nsys"));
    }

    #[tokio::test(start_paused = true)]
    async fn success_records_the_model_that_answered() {
        let provider = Arc::new(
            MockProvider::with_responses(vec!["{}".into()]).with_served_model("gpt-4o-2024-08-06"),
        );
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let result = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(provider.models_called().await, vec!["gpt-4o"]);
        assert_eq!(result.model, "gpt-4o-2024-08-06");
        let attempts = ledger.attempts().await;
        assert_eq!(attempts[0].model, "gpt-4o-2024-08-06");
        assert_eq!(
            attempts[0].estimated_cost_usd,
            Some(PricingTable::hosted().estimate("gpt-4o-2024-08-06", &result.usage))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fail_fail_succeed_sleeps_six_seconds_without_fallback() {
        let provider = Arc::new(MockProvider::new());
        provider.push_error(CadenceError::provider("502 bad gateway")).await;
        provider.push_error(CadenceError::provider("503 unavailable")).await;
        provider.push_response("{\"ok\":true}").await;
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let started = Instant::now();
        let result = exec
            .execute(
                &prompt(),
                GenerationPhase::SequenceGeneration,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let slept = started.elapsed();
        assert!(
            slept >= Duration::from_secs(6) && slept < Duration::from_secs(7),
            "expected 2 s + 4 s of backoff, got {slept:?}"
        );
        assert_eq!(result.attempts, 3);
        let statuses: Vec<_> = ledger.attempts().await.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![AttemptStatus::Error, AttemptStatus::Error, AttemptStatus::Success]
        );
        assert_eq!(provider.models_called().await, vec!["gpt-4o"; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_primary_falls_back_after_timeout_attempt() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..3 {
            provider.push_error(CadenceError::provider("down")).await;
        }
        provider.push_response("{}").await;
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let result = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.attempts, 4);
        let attempts = ledger.attempts().await;
        let statuses: Vec<_> = attempts.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![
                AttemptStatus::Error,
                AttemptStatus::Error,
                AttemptStatus::Timeout,
                AttemptStatus::Success
            ]
        );
        assert_eq!(attempts[3].model, "gpt-4o-mini");
        assert_eq!(
            provider.models_called().await,
            vec!["gpt-4o", "gpt-4o", "gpt-4o", "gpt-4o-mini"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_fallback_reports_six_attempts() {
        let provider = Arc::new(MockProvider::new());
        for i in 0..6 {
            provider
                .push_error(CadenceError::provider(format!("failure {i}")))
                .await;
        }
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let err = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            CadenceError::FallbackExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 6);
                assert!(last_error.contains("failure 5"));
            }
            other => panic!("expected FallbackExhausted, got {other:?}"),
        }
        let attempts = ledger.attempts().await;
        assert_eq!(attempts.len(), 6);
        assert_eq!(attempts[2].status, AttemptStatus::Timeout);
        assert_eq!(attempts[5].status, AttemptStatus::Timeout);
        assert!(attempts.iter().all(|a| a.total_tokens.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn no_fallback_exhausts_after_primary() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..3 {
            provider.push_error(CadenceError::provider("down")).await;
        }
        let ledger = Arc::new(MemoryLedger::new());
        let mut cfg = config();
        cfg.fallback_model = Some("gpt-4o".into());
        let exec = executor(provider.clone(), ledger.clone(), cfg);

        let err = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::FallbackExhausted { attempts: 3, .. }));
        assert_eq!(ledger.attempts().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_is_recorded_as_timeout() {
        let provider = Arc::new(MockProvider::new().with_delay(Duration::from_secs(300)));
        provider.push_response("{}").await;
        let ledger = Arc::new(MemoryLedger::new());
        let mut cfg = config();
        cfg.max_retries = 1;
        cfg.fallback_model = None;
        let exec = executor(provider, ledger.clone(), cfg);

        let err = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::FallbackExhausted { attempts: 1, .. }));
        let attempts = ledger.attempts().await;
        assert_eq!(attempts[0].status, AttemptStatus::Timeout);
        assert!(attempts[0].error_message.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_is_not_retried() {
        let provider = Arc::new(MockProvider::new());
        provider
            .push_error(CadenceError::Config("missing API key".into()))
            .await;
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());

        let err = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::Config(_)));
        assert_eq!(ledger.attempts().await.len(), 1);
        assert_eq!(provider.models_called().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_stops_retrying() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..3 {
            provider.push_error(CadenceError::provider("down")).await;
        }
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider.clone(), ledger.clone(), config());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = exec
            .execute(&prompt(), GenerationPhase::ProfileAnalysis, "seq-1", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::Cancelled));
        assert_eq!(provider.models_called().await.len(), 1);
        assert_eq!(ledger.attempts().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_call_records_attempt() {
        let provider = Arc::new(MockProvider::new().with_delay(Duration::from_secs(30)));
        provider.push_response("{}").await;
        let ledger = Arc::new(MemoryLedger::new());
        let exec = executor(provider, ledger.clone(), config());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let err = exec
            .execute(&prompt(), GenerationPhase::ProfileAnalysis, "seq-1", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::Cancelled));
        let attempts = ledger.attempts().await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, AttemptStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn ledger_failure_aborts_the_call() {
        let provider = Arc::new(MockProvider::with_responses(vec!["{}".into()]));
        let ledger = Arc::new(MemoryLedger::new());
        ledger.fail_writes(true);
        let exec = executor(provider, ledger.clone(), config());

        let err = exec
            .execute(
                &prompt(),
                GenerationPhase::ProfileAnalysis,
                "seq-1",
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::Storage { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn untracked_costs_are_left_empty() {
        let provider = Arc::new(MockProvider::with_responses(vec!["{}".into()]));
        let ledger = Arc::new(MemoryLedger::new());
        let mut cfg = config();
        cfg.track_costs = false;
        let exec = executor(provider, ledger.clone(), cfg);

        exec.execute(
            &prompt(),
            GenerationPhase::ProfileAnalysis,
            "seq-1",
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(ledger.attempts().await[0].estimated_cost_usd.is_none());
    }
}
