// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Cadence.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! loudly at startup instead of silently falling back to a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level Cadence configuration.
///
/// Every section is optional and defaults to values suitable for a local
/// OpenAI-backed install.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model endpoint settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Retry and backoff policy for model calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cost estimation settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Sequence generation limits.
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl CadenceConfig {
    /// Effective configuration as TOML with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.provider.api_key.is_some() {
            shown.provider.api_key = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown)
    }
}

const REDACTED: &str = "********";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "cadence".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which family of endpoint serves completions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Hosted OpenAI API.
    #[default]
    Openai,
    /// Any OpenAI-compatible server (vLLM, llama.cpp, Ollama). Costs are zero.
    SelfHosted,
}

/// Model endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// Endpoint root, e.g. `https://api.openai.com/v1`. Required for
    /// `self_hosted`; hosted OpenAI falls back to the public URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token. `None` reads `OPENAI_API_KEY` at startup.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Primary model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used after the primary exhausts its retries. Ignored when equal
    /// to `model`.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: Option<String>,

    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,

    /// Request a `json_object` response format.
    #[serde(default = "default_json_mode")]
    pub json_mode: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            api_key: None,
            model: default_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            json_mode: default_json_mode(),
        }
    }
}

/// Public OpenAI endpoint used when `kind = "openai"` and no base URL is set.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

impl ProviderConfig {
    /// The endpoint root to use for this provider.
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_BASE_URL)
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_fallback_model() -> Option<String> {
    Some("gpt-4o-mini".to_string())
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> Option<f32> {
    Some(0.7)
}

fn default_json_mode() -> bool {
    true
}

/// Retry policy for a single model call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts per model before falling back.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sleep after failed attempt `n` is `backoff_base_ms * 2^n`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cadence").join("cadence.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cadence.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Per-million-token USD rates for one model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateConfig {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// Cost estimation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Record an estimated cost on every attempt.
    #[serde(default = "default_track_costs")]
    pub track_costs: bool,

    /// Rates that override or extend the built-in table, keyed by model.
    #[serde(default)]
    pub rates: BTreeMap<String, RateConfig>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            track_costs: default_track_costs(),
            rates: BTreeMap::new(),
        }
    }
}

fn default_track_costs() -> bool {
    true
}

/// Limits and prompt-shaping knobs for sequence generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Largest step count a request may ask for (at most 10).
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Step count used by the CLI when `--steps` is omitted.
    #[serde(default = "default_steps")]
    pub default_steps: u32,

    /// Characters of raw model output kept on parse errors.
    #[serde(default = "default_raw_text_cap")]
    pub raw_text_cap: usize,

    /// Experience entries embedded in the analysis prompt.
    #[serde(default = "default_max_experiences")]
    pub max_experiences: usize,

    /// Education entries embedded in the analysis prompt.
    #[serde(default = "default_max_education")]
    pub max_education: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            default_steps: default_steps(),
            raw_text_cap: default_raw_text_cap(),
            max_experiences: default_max_experiences(),
            max_education: default_max_education(),
        }
    }
}

fn default_max_steps() -> u32 {
    cadence_core::domain::MAX_STEPS
}

fn default_steps() -> u32 {
    3
}

fn default_raw_text_cap() -> usize {
    2000
}

fn default_max_experiences() -> usize {
    5
}

fn default_max_education() -> usize {
    3
}
