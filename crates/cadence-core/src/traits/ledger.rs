// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only sink for model-call attempts.

use async_trait::async_trait;

use crate::domain::{AttemptSummary, GenerationAttempt};
use crate::error::CadenceError;

/// Records every model-call attempt and answers aggregate queries over them.
///
/// `record` must be durable when it returns `Ok`: the executor relies on it
/// before retrying or returning.
#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Append one attempt.
    async fn record(&self, attempt: &GenerationAttempt) -> Result<(), CadenceError>;

    /// All attempts for a sequence in insertion order.
    async fn attempts_for_sequence(
        &self,
        sequence_id: &str,
    ) -> Result<Vec<GenerationAttempt>, CadenceError>;

    /// Token, cost, and model aggregates for a sequence.
    async fn summary_for_sequence(&self, sequence_id: &str)
        -> Result<AttemptSummary, CadenceError>;
}
