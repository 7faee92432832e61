// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities persisted by the storage layer and produced by the
//! generation pipeline.
//!
//! Timestamps are ISO 8601 strings (`%Y-%m-%dT%H:%M:%S%.3fZ`), matching the
//! SQLite `strftime` defaults used by the schema.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CadenceError;

/// Default humor axis when a caller omits it.
pub const DEFAULT_HUMOR: f64 = 0.3;

/// Default enthusiasm axis when a caller omits it.
pub const DEFAULT_ENTHUSIASM: f64 = 0.5;

/// Inclusive bounds for the requested number of steps.
pub const MIN_STEPS: u32 = 1;
pub const MAX_STEPS: u32 = 10;

/// Lifecycle status of a sequence.
///
/// Moves only forward: `Pending -> Generating -> {Completed | Failed}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl SequenceStatus {
    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: SequenceStatus) -> bool {
        use SequenceStatus::*;
        match (self, next) {
            (Pending, Generating) => true,
            // A pre-flight failure may fail a sequence that never started.
            (Pending, Failed) => true,
            (Generating, Completed) | (Generating, Failed) => true,
            (Pending, _) | (Generating, _) => false,
            (Completed, _) | (Failed, _) => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SequenceStatus::Completed | SequenceStatus::Failed)
    }
}

/// Which pass of the pipeline a model call belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    ProfileAnalysis,
    SequenceGeneration,
}

/// Outcome of a single model-call attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Error,
    Timeout,
}

/// Purpose of one message in an outreach sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    ConnectionRequest,
    FollowUpValue,
    CaseStudy,
    SocialProof,
    DirectAsk,
    Breakup,
}

impl MessageType {
    /// Canonical order used for sequences longer than three steps.
    pub const CANONICAL: [MessageType; 6] = [
        MessageType::ConnectionRequest,
        MessageType::FollowUpValue,
        MessageType::CaseStudy,
        MessageType::SocialProof,
        MessageType::DirectAsk,
        MessageType::Breakup,
    ];
}

/// The five tone axes plus optional free-text instructions.
///
/// Formality, warmth, and directness are mandatory. Humor and enthusiasm
/// only condition the prompt when supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAxes {
    pub formality: f64,
    pub warmth: f64,
    pub directness: f64,
    #[serde(default)]
    pub humor: Option<f64>,
    #[serde(default)]
    pub enthusiasm: Option<f64>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

impl ToneAxes {
    pub fn new(formality: f64, warmth: f64, directness: f64) -> Self {
        Self {
            formality,
            warmth,
            directness,
            humor: None,
            enthusiasm: None,
            custom_instructions: None,
        }
    }

    pub fn humor_or_default(&self) -> f64 {
        self.humor.unwrap_or(DEFAULT_HUMOR)
    }

    pub fn enthusiasm_or_default(&self) -> f64 {
        self.enthusiasm.unwrap_or(DEFAULT_ENTHUSIASM)
    }

    /// Check every supplied axis lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), CadenceError> {
        let axes = [
            ("formality", Some(self.formality)),
            ("warmth", Some(self.warmth)),
            ("directness", Some(self.directness)),
            ("humor", self.humor),
            ("enthusiasm", self.enthusiasm),
        ];
        for (name, value) in axes {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) || v.is_nan() {
                    return Err(CadenceError::Validation(format!(
                        "{name} must be between 0.0 and 1.0, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A saved, reusable tone configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneConfig {
    pub id: String,
    pub name: String,
    pub axes: ToneAxes,
    pub created_at: String,
    pub updated_at: String,
}

/// A subject profile, either cached from a data source or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    /// Normalized identifier; unique per profile.
    pub identifier: String,
    pub name: String,
    pub headline: String,
    pub role: String,
    pub company: String,
    pub location: String,
    pub industry: String,
    pub summary: String,
    /// Structured blob with `experience` and `education` arrays.
    pub data: serde_json::Value,
    /// Where the profile came from ("synthetic", "import", ...).
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A generated outreach sequence and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub profile_id: String,
    pub tone_config_id: String,
    pub context: String,
    pub step_count: u32,
    pub status: SequenceStatus,
    /// Normalized output of the profile-analysis pass.
    pub prospect_analysis: Option<serde_json::Value>,
    pub overall_confidence: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A personalization hook the model used in a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalizationPoint {
    #[serde(default)]
    pub point: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub reasoning: String,
}

/// One step of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMessage {
    pub id: String,
    pub sequence_id: String,
    /// 1-based, contiguous within a sequence.
    pub step_number: u32,
    pub message_type: MessageType,
    pub subject: Option<String>,
    pub body: String,
    pub thinking_process: String,
    pub confidence: f64,
    pub personalization_points: Vec<PersonalizationPoint>,
    pub created_at: String,
}

/// Append-only audit record of one model-call attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub id: String,
    pub sequence_id: String,
    pub phase: GenerationPhase,
    pub model: String,
    /// Token counts are `None` until a response is received.
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    pub estimated_cost_usd: Option<f64>,
    pub latency_ms: u64,
    pub prompt: String,
    pub raw_response: Option<String>,
    pub status: AttemptStatus,
    pub error_message: Option<String>,
    pub created_at: String,
}

/// Aggregated attempt metadata for one sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempt_count: u32,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    /// Distinct models used, in first-use order.
    pub models: Vec<String>,
}

/// Input to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Subject identifier (profile URL, handle, or id).
    pub subject: String,
    pub tone: ToneAxes,
    /// Saved tone configuration to use instead of `tone`.
    #[serde(default)]
    pub tone_config_id: Option<String>,
    #[serde(default)]
    pub context: String,
    pub steps: u32,
}

impl GenerationRequest {
    /// Pre-flight validation. `max_steps` is the configured ceiling, itself
    /// bounded by [`MAX_STEPS`].
    pub fn validate(&self, max_steps: u32) -> Result<(), CadenceError> {
        if self.subject.trim().is_empty() {
            return Err(CadenceError::Validation(
                "subject identifier must not be empty".into(),
            ));
        }
        let ceiling = max_steps.min(MAX_STEPS);
        if self.steps < MIN_STEPS || self.steps > ceiling {
            return Err(CadenceError::Validation(format!(
                "steps must be between {MIN_STEPS} and {ceiling}, got {}",
                self.steps
            )));
        }
        self.tone.validate()
    }
}

/// A terminal sequence hydrated with its messages and attempt metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResult {
    pub sequence: Sequence,
    pub messages: Vec<SequenceMessage>,
    pub usage: AttemptSummary,
}

/// Current UTC time in the storage timestamp format.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
