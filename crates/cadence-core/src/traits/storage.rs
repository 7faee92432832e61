// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::domain::{Profile, Sequence, SequenceMessage, SequenceStatus, ToneConfig};
use crate::error::CadenceError;

/// Adapter for storage and persistence backends.
///
/// Every write is committed before the call returns; the orchestrator never
/// proceeds to the next phase on an uncommitted transition.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CadenceError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CadenceError>;

    // --- Profile operations ---

    async fn get_profile_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Profile>, CadenceError>;

    /// Inserts a profile. If another writer cached the same identifier first,
    /// the existing row wins and is returned.
    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, CadenceError>;

    // --- Tone configuration operations ---

    async fn create_tone_config(&self, config: &ToneConfig) -> Result<(), CadenceError>;

    async fn get_tone_config(&self, id: &str) -> Result<Option<ToneConfig>, CadenceError>;

    async fn list_tone_configs(&self) -> Result<Vec<ToneConfig>, CadenceError>;

    // --- Sequence operations ---

    async fn create_sequence(&self, sequence: &Sequence) -> Result<(), CadenceError>;

    async fn get_sequence(&self, id: &str) -> Result<Option<Sequence>, CadenceError>;

    async fn list_sequences(
        &self,
        status: Option<SequenceStatus>,
    ) -> Result<Vec<Sequence>, CadenceError>;

    /// Moves a sequence along its lifecycle, rejecting backward or terminal
    /// transitions. `error_message` is stored when moving to `Failed`.
    async fn update_sequence_status(
        &self,
        id: &str,
        status: SequenceStatus,
        error_message: Option<&str>,
    ) -> Result<(), CadenceError>;

    /// Stores the normalized profile analysis on a generating sequence.
    async fn update_sequence_analysis(
        &self,
        id: &str,
        analysis: &serde_json::Value,
    ) -> Result<(), CadenceError>;

    /// Marks a sequence completed with its overall confidence.
    async fn complete_sequence(
        &self,
        id: &str,
        overall_confidence: Option<f64>,
    ) -> Result<(), CadenceError>;

    // --- Message operations ---

    /// Inserts all messages of a sequence in one transaction, in order.
    async fn insert_messages(&self, messages: &[SequenceMessage]) -> Result<(), CadenceError>;

    /// Messages of a sequence ordered by step number.
    async fn get_messages(&self, sequence_id: &str)
        -> Result<Vec<SequenceMessage>, CadenceError>;
}
