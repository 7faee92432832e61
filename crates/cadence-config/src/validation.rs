// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! All problems are collected before returning so a user fixes their file
//! in one pass.

use cadence_core::domain::{MAX_STEPS, MIN_STEPS};

use crate::diagnostic::ConfigError;
use crate::model::{CadenceConfig, ProviderKind};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
pub fn validate_config(config: &CadenceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        )));
    }

    let provider = &config.provider;
    if provider.model.trim().is_empty() {
        errors.push(ConfigError::validation("provider.model must not be empty"));
    }
    if let Some(fallback) = &provider.fallback_model {
        if fallback.trim().is_empty() {
            errors.push(ConfigError::validation(
                "provider.fallback_model must not be empty when set",
            ));
        }
    }
    if provider.kind == ProviderKind::SelfHosted
        && provider.base_url.as_deref().is_none_or(|u| u.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "provider.base_url is required when provider.kind = \"self_hosted\"",
        ));
    }
    if let Some(url) = &provider.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "provider.base_url must start with http:// or https://, got `{url}`"
            )));
        }
    }
    if provider.timeout_secs == 0 {
        errors.push(ConfigError::validation("provider.timeout_secs must be at least 1"));
    }
    if provider.max_tokens == 0 {
        errors.push(ConfigError::validation("provider.max_tokens must be at least 1"));
    }
    if let Some(t) = provider.temperature {
        if !(0.0..=2.0).contains(&t) {
            errors.push(ConfigError::validation(format!(
                "provider.temperature must be between 0.0 and 2.0, got {t}"
            )));
        }
    }

    if config.retry.max_retries == 0 {
        errors.push(ConfigError::validation("retry.max_retries must be at least 1"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    for (model, rate) in &config.cost.rates {
        if rate.input_per_mtok < 0.0 || rate.output_per_mtok < 0.0 {
            errors.push(ConfigError::validation(format!(
                "cost.rates.{model} must be non-negative"
            )));
        }
    }

    let generation = &config.generation;
    if !(MIN_STEPS..=MAX_STEPS).contains(&generation.max_steps) {
        errors.push(ConfigError::validation(format!(
            "generation.max_steps must be between {MIN_STEPS} and {MAX_STEPS}, got {}",
            generation.max_steps
        )));
    }
    if generation.default_steps < MIN_STEPS || generation.default_steps > generation.max_steps {
        errors.push(ConfigError::validation(format!(
            "generation.default_steps must be between {MIN_STEPS} and generation.max_steps ({}), got {}",
            generation.max_steps, generation.default_steps
        )));
    }
    if generation.raw_text_cap == 0 {
        errors.push(ConfigError::validation(
            "generation.raw_text_cap must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
