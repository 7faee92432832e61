// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cadence outreach sequence generator.
//!
//! This crate provides the error type, the domain entities shared by storage
//! and the generation pipeline, and the adapter traits the pipeline is
//! parameterized over.

pub mod domain;
pub mod error;
pub mod traits;
pub mod types;

pub use domain::{
    AttemptStatus, AttemptSummary, GenerationAttempt, GenerationPhase, GenerationRequest,
    MessageType, PersonalizationPoint, Profile, Sequence, SequenceMessage, SequenceResult,
    SequenceStatus, ToneAxes, ToneConfig,
};
pub use error::CadenceError;
pub use types::{CompletionRequest, CompletionResponse, MessageRole, PromptMessage, TokenUsage};

pub use traits::{AttemptLedger, ModelProvider, ProfileResolver, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_traits_are_exported() {
        fn _assert_model_provider<T: ModelProvider>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_attempt_ledger<T: AttemptLedger>() {}
        fn _assert_profile_resolver<T: ProfileResolver>() {}
    }
}
