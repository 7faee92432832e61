// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tone configuration CRUD.

use cadence_core::CadenceError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{ToneAxes, ToneConfig};

const COLUMNS: &str = "id, name, formality, warmth, directness, humor, enthusiasm, \
                       custom_instructions, created_at, updated_at";

fn row_to_tone_config(row: &Row<'_>) -> rusqlite::Result<ToneConfig> {
    Ok(ToneConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        axes: ToneAxes {
            formality: row.get(2)?,
            warmth: row.get(3)?,
            directness: row.get(4)?,
            humor: row.get(5)?,
            enthusiasm: row.get(6)?,
            custom_instructions: row.get(7)?,
        },
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Persist a tone configuration.
pub async fn create_tone_config(db: &Database, config: &ToneConfig) -> Result<(), CadenceError> {
    let config = config.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tone_configs (id, name, formality, warmth, directness, humor,
                     enthusiasm, custom_instructions, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    config.id,
                    config.name,
                    config.axes.formality,
                    config.axes.warmth,
                    config.axes.directness,
                    config.axes.humor,
                    config.axes.enthusiasm,
                    config.axes.custom_instructions,
                    config.created_at,
                    config.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a tone configuration by ID.
pub async fn get_tone_config(db: &Database, id: &str) -> Result<Option<ToneConfig>, CadenceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM tone_configs WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_tone_config) {
                Ok(config) => Ok(Some(config)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All tone configurations, newest first.
pub async fn list_tone_configs(db: &Database) -> Result<Vec<ToneConfig>, CadenceError> {
    db.connection()
        .call(|conn| {
            let sql =
                format!("SELECT {COLUMNS} FROM tone_configs ORDER BY created_at DESC, rowid DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_tone_config)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
