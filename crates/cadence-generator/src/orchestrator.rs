// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-pass sequence generation.
//!
//! Pass 1 analyzes the prospect profile; pass 2 writes the message sequence
//! conditioned on the translated tone and the pass-1 analysis. The sequence
//! row exists before the first model call, and every status change is
//! committed before the next phase begins.

use std::sync::Arc;

use cadence_config::model::GenerationConfig;
use cadence_core::domain::now_timestamp;
use cadence_core::{
    AttemptLedger, CadenceError, GenerationAttempt, GenerationPhase, GenerationRequest, Profile,
    ProfileResolver, Sequence, SequenceResult, SequenceStatus, StorageAdapter, ToneAxes,
    ToneConfig,
};
use cadence_recovery::{cap, recover_detailed};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::analysis::normalize_analysis;
use crate::executor::ModelCallExecutor;
use crate::messages::parse_sequence;
use crate::prompts::{analysis_prompt, profile_summary, sequence_prompt};
use crate::vocabulary::step_plan;

/// Pipeline limits for [`SequenceGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Largest accepted step count.
    pub max_steps: u32,
    /// Characters of raw model output kept in parse errors.
    pub raw_text_cap: usize,
    pub max_experiences: usize,
    pub max_education: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl GeneratorConfig {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            raw_text_cap: config.raw_text_cap,
            max_experiences: config.max_experiences,
            max_education: config.max_education,
        }
    }
}

/// The two-pass orchestrator and its read-side helpers.
pub struct SequenceGenerator {
    storage: Arc<dyn StorageAdapter>,
    ledger: Arc<dyn AttemptLedger>,
    profiles: Arc<dyn ProfileResolver>,
    executor: ModelCallExecutor,
    config: GeneratorConfig,
}

impl SequenceGenerator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        ledger: Arc<dyn AttemptLedger>,
        profiles: Arc<dyn ProfileResolver>,
        executor: ModelCallExecutor,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            storage,
            ledger,
            profiles,
            executor,
            config,
        }
    }

    /// Generates a sequence for `request`.
    ///
    /// Validation failures and unknown tone configurations are returned
    /// before any sequence row exists. Once the sequence is created, any
    /// failure marks it `failed` with the error message and is re-raised;
    /// a pass-1 analysis already stored is kept.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<SequenceResult, CadenceError> {
        request.validate(self.config.max_steps)?;
        let tone = self.resolve_tone(request).await?;
        let profile = self.profiles.resolve(&request.subject).await?;
        if request.tone_config_id.is_none() {
            self.storage.create_tone_config(&tone).await?;
        }

        let now = now_timestamp();
        let sequence = Sequence {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id: profile.id.clone(),
            tone_config_id: tone.id.clone(),
            context: request.context.clone(),
            step_count: request.steps,
            status: SequenceStatus::Pending,
            prospect_analysis: None,
            overall_confidence: None,
            error_message: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.create_sequence(&sequence).await?;
        info!(
            sequence_id = %sequence.id,
            profile_id = %profile.id,
            tone_config_id = %tone.id,
            steps = request.steps,
            "sequence created"
        );

        self.storage
            .update_sequence_status(&sequence.id, SequenceStatus::Generating, None)
            .await?;

        match self.run_passes(&sequence, &profile, &tone.axes, cancel).await {
            Ok(confidence) => {
                self.storage.complete_sequence(&sequence.id, confidence).await?;
                let result = self.get_sequence_result(&sequence.id).await?;
                info!(
                    sequence_id = %sequence.id,
                    messages = result.messages.len(),
                    attempts = result.usage.attempt_count,
                    total_tokens = result.usage.total_tokens,
                    cost_usd = result.usage.total_cost_usd,
                    "sequence completed"
                );
                Ok(result)
            }
            Err(e) => {
                error!(sequence_id = %sequence.id, error = %e, "sequence generation failed");
                if let Err(mark_err) = self
                    .storage
                    .update_sequence_status(&sequence.id, SequenceStatus::Failed, Some(&e.to_string()))
                    .await
                {
                    warn!(
                        sequence_id = %sequence.id,
                        error = %mark_err,
                        "failed to mark sequence as failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn resolve_tone(&self, request: &GenerationRequest) -> Result<ToneConfig, CadenceError> {
        match &request.tone_config_id {
            Some(id) => self
                .storage
                .get_tone_config(id)
                .await?
                .ok_or_else(|| CadenceError::NotFound {
                    entity: "tone configuration",
                    id: id.clone(),
                }),
            None => {
                let now = now_timestamp();
                Ok(ToneConfig {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: format!("ad-hoc: {}", request.subject.trim()),
                    axes: request.tone.clone(),
                    created_at: now.clone(),
                    updated_at: now,
                })
            }
        }
    }

    /// Runs both passes and persists their output. Returns the overall
    /// confidence reported by pass 2.
    async fn run_passes(
        &self,
        sequence: &Sequence,
        profile: &Profile,
        axes: &ToneAxes,
        cancel: &CancellationToken,
    ) -> Result<Option<f64>, CadenceError> {
        let raw_cap = self.config.raw_text_cap;

        // Pass 1: profile analysis.
        let summary = profile_summary(
            profile,
            self.config.max_experiences,
            self.config.max_education,
        );
        let prompt = analysis_prompt(&summary, &sequence.context);
        let result = self
            .executor
            .execute(&prompt, GenerationPhase::ProfileAnalysis, &sequence.id, cancel)
            .await?;
        let recovered = recover_detailed(&result.content, raw_cap)?;
        let analysis = normalize_analysis(recovered.value, &cap(&result.content, raw_cap))?;
        self.storage
            .update_sequence_analysis(&sequence.id, &analysis)
            .await?;
        info!(
            sequence_id = %sequence.id,
            phase = %GenerationPhase::ProfileAnalysis,
            stage = %recovered.stage,
            "profile analysis stored"
        );

        // Pass 2: sequence generation.
        let tone_instructions = cadence_tone::translate(axes);
        let plan = step_plan(sequence.step_count);
        let prompt = sequence_prompt(&tone_instructions, &sequence.context, &analysis, &plan);
        let result = self
            .executor
            .execute(&prompt, GenerationPhase::SequenceGeneration, &sequence.id, cancel)
            .await?;
        let recovered = recover_detailed(&result.content, raw_cap)?;
        let parsed = parse_sequence(
            &recovered.value,
            &cap(&result.content, raw_cap),
            &sequence.id,
            &plan,
        )?;
        self.storage.insert_messages(&parsed.messages).await?;
        info!(
            sequence_id = %sequence.id,
            phase = %GenerationPhase::SequenceGeneration,
            stage = %recovered.stage,
            messages = parsed.messages.len(),
            "sequence messages stored"
        );

        Ok(parsed.overall_confidence)
    }

    /// Hydrates a sequence with its messages and attempt aggregates.
    pub async fn get_sequence_result(&self, id: &str) -> Result<SequenceResult, CadenceError> {
        let sequence = self
            .storage
            .get_sequence(id)
            .await?
            .ok_or_else(|| CadenceError::NotFound {
                entity: "sequence",
                id: id.to_string(),
            })?;
        let messages = self.storage.get_messages(id).await?;
        let usage = self.ledger.summary_for_sequence(id).await?;
        Ok(SequenceResult {
            sequence,
            messages,
            usage,
        })
    }

    pub async fn list_sequences(
        &self,
        status: Option<SequenceStatus>,
    ) -> Result<Vec<Sequence>, CadenceError> {
        self.storage.list_sequences(status).await
    }

    /// Every model-call attempt recorded for a sequence, oldest first.
    pub async fn attempts(&self, sequence_id: &str) -> Result<Vec<GenerationAttempt>, CadenceError> {
        self.ledger.attempts_for_sequence(sequence_id).await
    }

    /// Validates and stores a named tone configuration.
    pub async fn save_tone_config(
        &self,
        name: &str,
        axes: ToneAxes,
    ) -> Result<ToneConfig, CadenceError> {
        if name.trim().is_empty() {
            return Err(CadenceError::Validation(
                "tone configuration name must not be empty".into(),
            ));
        }
        axes.validate()?;
        let now = now_timestamp();
        let config = ToneConfig {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            axes,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.create_tone_config(&config).await?;
        info!(tone_config_id = %config.id, name = %config.name, "tone configuration saved");
        Ok(config)
    }

    pub async fn tone_configs(&self) -> Result<Vec<ToneConfig>, CadenceError> {
        self.storage.list_tone_configs().await
    }
}
