// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end generation tests.
//!
//! `TestHarness` assembles a complete generation stack with a mock
//! provider, a temp SQLite database, the generation ledger, and the cached
//! profile resolver. `generate()` drives the full two-pass pipeline.

use std::sync::Arc;
use std::time::Duration;

use cadence_config::model::{GenerationConfig, StorageConfig};
use cadence_core::{
    CadenceError, GenerationRequest, ModelProvider, ProfileResolver, SequenceResult,
    StorageAdapter,
};
use cadence_cost::{GenerationLedger, PricingTable};
use cadence_generator::{
    CachedProfileResolver, ExecutorConfig, GeneratorConfig, ModelCallExecutor, SequenceGenerator,
};
use cadence_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;

use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider: MockProvider,
    executor: ExecutorConfig,
    generator: GeneratorConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            provider: MockProvider::new(),
            executor: ExecutorConfig {
                // Keep retry paths fast on a real clock.
                backoff_base: Duration::from_millis(1),
                timeout: Duration::from_secs(5),
                ..ExecutorConfig::default()
            },
            generator: GeneratorConfig::from_config(&GenerationConfig::default()),
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.provider = MockProvider::with_responses(responses);
        self
    }

    /// Use a pre-scripted mock provider.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Override executor settings (models, retries, backoff).
    pub fn with_executor_config(mut self, config: ExecutorConfig) -> Self {
        self.executor = config;
        self
    }

    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.generator = config;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, CadenceError> {
        let temp_dir = tempfile::TempDir::new().map_err(CadenceError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let ledger = Arc::new(GenerationLedger::from_database(storage.database()?));
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let mock_provider = Arc::new(self.provider);
        let profiles: Arc<dyn ProfileResolver> =
            Arc::new(CachedProfileResolver::new(storage.clone()));
        let executor = ModelCallExecutor::new(
            mock_provider.clone() as Arc<dyn ModelProvider>,
            ledger.clone(),
            PricingTable::hosted(),
            self.executor,
        );
        let generator = SequenceGenerator::new(
            storage.clone(),
            ledger.clone(),
            profiles,
            executor,
            self.generator,
        );

        Ok(TestHarness {
            mock_provider,
            storage,
            ledger,
            generator,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    /// The mock model provider.
    pub mock_provider: Arc<MockProvider>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// Attempt ledger sharing the storage connection.
    pub ledger: Arc<GenerationLedger>,
    /// The orchestrator under test.
    pub generator: SequenceGenerator,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one generation with a fresh cancellation token.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<SequenceResult, CadenceError> {
        self.generator
            .generate(request, &CancellationToken::new())
            .await
    }

    /// Add a response to the mock provider's queue.
    pub async fn add_provider_response(&self, text: impl Into<String>) {
        self.mock_provider.push_response(text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use cadence_core::SequenceStatus;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let sequences = harness.storage.list_sequences(None).await.unwrap();
        assert!(sequences.is_empty());
    }

    #[tokio::test]
    async fn generate_uses_scripted_responses() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec![
                fixtures::analysis_response(),
                fixtures::sequence_response(2),
            ])
            .build()
            .await
            .unwrap();

        let result = harness
            .generate(&fixtures::request("jane-doe", 2))
            .await
            .unwrap();
        assert_eq!(result.sequence.status, SequenceStatus::Completed);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(harness.mock_provider.pending().await, 0);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder()
            .with_mock_responses(vec![
                fixtures::analysis_response(),
                fixtures::sequence_response(1),
            ])
            .build()
            .await
            .unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.generate(&fixtures::request("jane-doe", 1)).await.unwrap();
        assert_eq!(h1.storage.list_sequences(None).await.unwrap().len(), 1);
        assert!(h2.storage.list_sequences(None).await.unwrap().is_empty());
    }
}
