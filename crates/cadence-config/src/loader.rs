// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/cadence/cadence.toml`,
//! `~/.config/cadence/cadence.toml`, `./cadence.toml`, then `CADENCE_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CadenceConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/cadence/cadence.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cadence.toml";

/// Top-level sections, used to turn `CADENCE_PROVIDER_BASE_URL` into
/// `provider.base_url`.
const SECTIONS: &[&str] = &[
    "agent",
    "provider",
    "retry",
    "storage",
    "cost",
    "generation",
];

/// Per-user config file under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cadence").join(LOCAL_CONFIG_FILE))
}

/// Build the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CadenceConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<CadenceConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an explicit file with env var overrides.
///
/// Skips the XDG lookup; used by `--config`.
pub fn load_config_from_path(path: &Path) -> Result<CadenceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadenceConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string over the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<CadenceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadenceConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Map a lowercased, prefix-stripped env key onto its dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `provider_fallback_model` maps to `provider.fallback_model` rather than
/// `provider.fallback.model`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("CADENCE_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_after_section() {
        assert_eq!(map_env_key("provider_fallback_model"), "provider.fallback_model");
        assert_eq!(map_env_key("retry_backoff_base_ms"), "retry.backoff_base_ms");
        assert_eq!(map_env_key("generation_max_steps"), "generation.max_steps");
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }

    #[test]
    fn missing_file_is_skipped() {
        let config: CadenceConfig = Figment::new()
            .merge(Serialized::defaults(CadenceConfig::default()))
            .merge(Toml::file("/nonexistent/cadence/cadence.toml"))
            .extract()
            .expect("missing file should be skipped");
        assert_eq!(config.agent.name, "cadence");
    }
}
