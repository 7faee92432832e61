// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory attempt ledger for executor tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadence_core::{AttemptLedger, AttemptSummary, CadenceError, GenerationAttempt};

/// An [`AttemptLedger`] that keeps attempts in a vector.
///
/// `fail_writes(true)` makes every subsequent `record` fail with a storage
/// error, for exercising the abort-on-ledger-failure path.
#[derive(Default)]
pub struct MemoryLedger {
    attempts: Mutex<Vec<GenerationAttempt>>,
    fail_writes: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every recorded attempt, oldest first.
    pub async fn attempts(&self) -> Vec<GenerationAttempt> {
        self.attempts.lock().await.clone()
    }
}

#[async_trait]
impl AttemptLedger for MemoryLedger {
    async fn record(&self, attempt: &GenerationAttempt) -> Result<(), CadenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CadenceError::storage("ledger writes disabled"));
        }
        self.attempts.lock().await.push(attempt.clone());
        Ok(())
    }

    async fn attempts_for_sequence(
        &self,
        sequence_id: &str,
    ) -> Result<Vec<GenerationAttempt>, CadenceError> {
        Ok(self
            .attempts
            .lock()
            .await
            .iter()
            .filter(|a| a.sequence_id == sequence_id)
            .cloned()
            .collect())
    }

    async fn summary_for_sequence(
        &self,
        sequence_id: &str,
    ) -> Result<AttemptSummary, CadenceError> {
        let attempts = self.attempts_for_sequence(sequence_id).await?;
        let mut summary = AttemptSummary {
            attempt_count: attempts.len() as u32,
            ..AttemptSummary::default()
        };
        for attempt in &attempts {
            summary.total_tokens += u64::from(attempt.total_tokens.unwrap_or(0));
            summary.total_cost_usd += attempt.estimated_cost_usd.unwrap_or(0.0);
            if !summary.models.contains(&attempt.model) {
                summary.models.push(attempt.model.clone());
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{AttemptStatus, GenerationPhase};

    fn attempt(sequence_id: &str, model: &str, tokens: Option<u32>) -> GenerationAttempt {
        GenerationAttempt {
            id: format!("{sequence_id}-{model}"),
            sequence_id: sequence_id.into(),
            phase: GenerationPhase::ProfileAnalysis,
            model: model.into(),
            prompt_tokens: tokens,
            completion_tokens: tokens.map(|_| 0),
            total_tokens: tokens,
            estimated_cost_usd: tokens.map(|_| 0.01),
            latency_ms: 5,
            prompt: "p".into(),
            raw_response: None,
            status: AttemptStatus::Success,
            error_message: None,
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn summary_aggregates_per_sequence() {
        let ledger = MemoryLedger::new();
        ledger.record(&attempt("s1", "gpt-4o", None)).await.unwrap();
        ledger.record(&attempt("s1", "gpt-4o-mini", Some(100))).await.unwrap();
        ledger.record(&attempt("s1", "gpt-4o", Some(50))).await.unwrap();
        ledger.record(&attempt("s2", "gpt-4o", Some(999))).await.unwrap();

        let summary = ledger.summary_for_sequence("s1").await.unwrap();
        assert_eq!(summary.attempt_count, 3);
        assert_eq!(summary.total_tokens, 150);
        assert!((summary.total_cost_usd - 0.02).abs() < 1e-9);
        assert_eq!(summary.models, vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[tokio::test]
    async fn failing_writes_surface_storage_error() {
        let ledger = MemoryLedger::new();
        ledger.fail_writes(true);
        let err = ledger.record(&attempt("s1", "m", None)).await.unwrap_err();
        assert!(matches!(err, CadenceError::Storage { .. }));
        assert!(ledger.attempts().await.is_empty());
    }
}
