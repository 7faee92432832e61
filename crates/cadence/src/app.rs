// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into the storage, ledger, provider, and generator.

use std::sync::Arc;

use cadence_config::CadenceConfig;
use cadence_core::{CadenceError, ModelProvider, ProfileResolver, StorageAdapter};
use cadence_cost::{GenerationLedger, PricingTable};
use cadence_generator::{
    CachedProfileResolver, ExecutorConfig, GeneratorConfig, ModelCallExecutor, SequenceGenerator,
};
use cadence_openai::OpenAiCompatProvider;
use cadence_openai::client::OpenAiClient;
use cadence_storage::SqliteStorage;
use tracing::{debug, warn};

/// Whether the command will call the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    ReadOnly,
}

/// An opened Cadence stack for one CLI invocation.
pub struct App {
    pub storage: Arc<dyn StorageAdapter>,
    pub ledger: Arc<GenerationLedger>,
    pub generator: SequenceGenerator,
}

impl App {
    /// Opens the database, runs migrations, and builds the generator.
    ///
    /// Read-only commands get a provider without credentials so that
    /// listing and inspecting sequences works without an API key.
    pub async fn open(config: CadenceConfig, mode: Mode) -> Result<Self, CadenceError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let ledger = Arc::new(GenerationLedger::from_database(storage.database()?));
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider: Arc<dyn ModelProvider> = match mode {
            Mode::Generate => Arc::new(OpenAiCompatProvider::new(&config.provider)?),
            Mode::ReadOnly => Arc::new(OpenAiCompatProvider::with_client(
                OpenAiClient::new(config.provider.effective_base_url(), None)?,
                config.provider.kind,
            )),
        };

        let executor = ModelCallExecutor::new(
            provider,
            ledger.clone(),
            PricingTable::from_config(&config.cost, config.provider.kind),
            ExecutorConfig::from_config(&config),
        );
        let profiles: Arc<dyn ProfileResolver> =
            Arc::new(CachedProfileResolver::new(storage.clone()));
        let generator = SequenceGenerator::new(
            storage.clone(),
            ledger.clone(),
            profiles,
            executor,
            GeneratorConfig::from_config(&config.generation),
        );

        debug!(
            database = %config.storage.database_path,
            ?mode,
            "cadence stack opened"
        );
        Ok(Self {
            storage,
            ledger,
            generator,
        })
    }

    /// Checkpoints the WAL. Failures are logged, never fatal.
    pub async fn close(&self) {
        if let Err(e) = self.storage.close().await {
            warn!(error = %e, "failed to checkpoint database on exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_config::load_and_validate_str;

    fn config_in(dir: &tempfile::TempDir) -> CadenceConfig {
        let path = dir.path().join("cadence.db");
        load_and_validate_str(&format!(
            "[storage]\ndatabase_path = \"{}\"\n",
            path.display()
        ))
        .expect("config should validate")
    }

    #[tokio::test]
    async fn read_only_open_needs_no_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.provider.api_key = None;

        let app = App::open(config, Mode::ReadOnly).await.unwrap();
        assert!(app.generator.list_sequences(None).await.unwrap().is_empty());
        app.close().await;
    }

    #[tokio::test]
    async fn generate_open_uses_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.provider.api_key = Some("sk-test".into());

        let app = App::open(config, Mode::Generate).await.unwrap();
        assert!(app.generator.tone_configs().await.unwrap().is_empty());
        app.close().await;
    }
}
