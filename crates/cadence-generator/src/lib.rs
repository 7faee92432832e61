// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outreach sequence generation pipeline for Cadence.
//!
//! The [`SequenceGenerator`] is the central coordinator that:
//! - Resolves the subject profile and tone configuration
//! - Runs the profile-analysis and sequence-generation passes through the
//!   [`ModelCallExecutor`]
//! - Recovers structured output from raw model text
//! - Persists the sequence lifecycle, analysis, and messages

pub mod analysis;
pub mod executor;
pub mod messages;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod vocabulary;

pub use executor::{AttemptResult, ExecutorConfig, ModelCallExecutor};
pub use orchestrator::{GeneratorConfig, SequenceGenerator};
pub use profile::{CachedProfileResolver, normalize_identifier, synthesize_profile};
