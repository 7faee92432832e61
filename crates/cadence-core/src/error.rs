// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cadence sequence generator.

use thiserror::Error;

use crate::domain::SequenceStatus;

/// The primary error type used across all Cadence adapter traits and the
/// generation pipeline.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed generation request. Never retried, never logged as an attempt.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity (tone configuration, sequence, profile) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model provider errors (HTTP failure, bad status, unreadable body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A model call exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Every permitted attempt under the primary and fallback models failed.
    #[error("model call failed after {attempts} attempts: {last_error}")]
    FallbackExhausted { attempts: u32, last_error: String },

    /// Model output could not be recovered into the expected structure.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        /// Raw model output, capped for diagnostics.
        raw: String,
    },

    /// A sequence status change that does not move forward along the lifecycle.
    #[error("illegal sequence transition from {from} to {to}")]
    InvalidTransition {
        from: SequenceStatus,
        to: SequenceStatus,
    },

    /// The caller cancelled the generation.
    #[error("generation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Returns true for errors the model call executor absorbs with a retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CadenceError::Provider { .. } | CadenceError::Timeout { .. }
        )
    }

    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        CadenceError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a storage error wrapping any boxed error.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CadenceError::Storage {
            source: source.into(),
        }
    }
}
