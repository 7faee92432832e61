// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use cadence_config::model::StorageConfig;
use cadence_core::{
    CadenceError, Profile, Sequence, SequenceMessage, SequenceStatus, StorageAdapter, ToneConfig,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`]; every
/// other call fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database, e.g. an in-memory one in tests.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// The open database, for components that share its writer connection
    /// (the generation ledger).
    pub fn database(&self) -> Result<&Database, CadenceError> {
        self.db.get().ok_or_else(|| {
            CadenceError::storage("storage not initialized -- call initialize() first")
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), CadenceError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CadenceError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| CadenceError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CadenceError> {
        Self::checkpoint(self.database()?).await
    }

    async fn get_profile_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Profile>, CadenceError> {
        queries::profiles::get_profile_by_identifier(self.database()?, identifier).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, CadenceError> {
        queries::profiles::insert_profile(self.database()?, profile).await
    }

    async fn create_tone_config(&self, config: &ToneConfig) -> Result<(), CadenceError> {
        queries::tone_configs::create_tone_config(self.database()?, config).await
    }

    async fn get_tone_config(&self, id: &str) -> Result<Option<ToneConfig>, CadenceError> {
        queries::tone_configs::get_tone_config(self.database()?, id).await
    }

    async fn list_tone_configs(&self) -> Result<Vec<ToneConfig>, CadenceError> {
        queries::tone_configs::list_tone_configs(self.database()?).await
    }

    async fn create_sequence(&self, sequence: &Sequence) -> Result<(), CadenceError> {
        queries::sequences::create_sequence(self.database()?, sequence).await
    }

    async fn get_sequence(&self, id: &str) -> Result<Option<Sequence>, CadenceError> {
        queries::sequences::get_sequence(self.database()?, id).await
    }

    async fn list_sequences(
        &self,
        status: Option<SequenceStatus>,
    ) -> Result<Vec<Sequence>, CadenceError> {
        queries::sequences::list_sequences(self.database()?, status).await
    }

    async fn update_sequence_status(
        &self,
        id: &str,
        status: SequenceStatus,
        error_message: Option<&str>,
    ) -> Result<(), CadenceError> {
        queries::sequences::update_sequence_status(self.database()?, id, status, error_message)
            .await
    }

    async fn update_sequence_analysis(
        &self,
        id: &str,
        analysis: &serde_json::Value,
    ) -> Result<(), CadenceError> {
        queries::sequences::update_sequence_analysis(self.database()?, id, analysis).await
    }

    async fn complete_sequence(
        &self,
        id: &str,
        overall_confidence: Option<f64>,
    ) -> Result<(), CadenceError> {
        queries::sequences::complete_sequence(self.database()?, id, overall_confidence).await
    }

    async fn insert_messages(&self, messages: &[SequenceMessage]) -> Result<(), CadenceError> {
        queries::messages::insert_messages(self.database()?, messages).await
    }

    async fn get_messages(&self, sequence_id: &str) -> Result<Vec<SequenceMessage>, CadenceError> {
        queries::messages::get_messages(self.database()?, sequence_id).await
    }
}
