// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequence CRUD and guarded lifecycle updates.
//!
//! Status changes check the current row and write in the same closure, so
//! they are atomic with respect to every other write on the connection.

use cadence_core::CadenceError;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::{Sequence, SequenceStatus, enum_column, json_column, to_json};

const COLUMNS: &str = "id, profile_id, tone_config_id, context, step_count, status, \
                       prospect_analysis, overall_confidence, error_message, created_at, updated_at";

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

fn row_to_sequence(row: &Row<'_>) -> rusqlite::Result<Sequence> {
    let analysis: Option<String> = row.get(6)?;
    Ok(Sequence {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        tone_config_id: row.get(2)?,
        context: row.get(3)?,
        step_count: row.get(4)?,
        status: enum_column(5, row.get(5)?)?,
        prospect_analysis: analysis.as_deref().map(|a| json_column(6, a)).transpose()?,
        overall_confidence: row.get(7)?,
        error_message: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Result of a guarded update, decided inside the writer closure.
pub(crate) enum Guarded {
    Applied,
    Missing,
    Rejected(SequenceStatus),
}

impl Guarded {
    pub(crate) fn into_result(self, id: &str, to: SequenceStatus) -> Result<(), CadenceError> {
        match self {
            Guarded::Applied => Ok(()),
            Guarded::Missing => Err(CadenceError::NotFound {
                entity: "sequence",
                id: id.to_string(),
            }),
            Guarded::Rejected(from) => Err(CadenceError::InvalidTransition { from, to }),
        }
    }
}

pub(crate) fn current_status(
    conn: &Connection,
    id: &str,
) -> rusqlite::Result<Option<SequenceStatus>> {
    conn.query_row(
        "SELECT status FROM sequences WHERE id = ?1",
        params![id],
        |row| enum_column(0, row.get(0)?),
    )
    .optional()
}

/// Insert a new sequence row.
pub async fn create_sequence(db: &Database, sequence: &Sequence) -> Result<(), CadenceError> {
    let sequence = sequence.clone();
    db.connection()
        .call(move |conn| {
            let analysis = sequence
                .prospect_analysis
                .as_ref()
                .map(to_json)
                .transpose()?;
            conn.execute(
                "INSERT INTO sequences (id, profile_id, tone_config_id, context, step_count,
                     status, prospect_analysis, overall_confidence, error_message,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    sequence.id,
                    sequence.profile_id,
                    sequence.tone_config_id,
                    sequence.context,
                    sequence.step_count,
                    sequence.status.to_string(),
                    analysis,
                    sequence.overall_confidence,
                    sequence.error_message,
                    sequence.created_at,
                    sequence.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a sequence by ID.
pub async fn get_sequence(db: &Database, id: &str) -> Result<Option<Sequence>, CadenceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM sequences WHERE id = ?1");
            conn.query_row(&sql, params![id], row_to_sequence).optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List sequences newest first, optionally filtered by status.
pub async fn list_sequences(
    db: &Database,
    status: Option<SequenceStatus>,
) -> Result<Vec<Sequence>, CadenceError> {
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM sequences
                 WHERE (?1 IS NULL OR status = ?1)
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![status], row_to_sequence)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a sequence to `status` if the lifecycle allows it.
///
/// `error_message` is written only when given, so a failure message is never
/// cleared by a later call.
pub async fn update_sequence_status(
    db: &Database,
    id: &str,
    status: SequenceStatus,
    error_message: Option<&str>,
) -> Result<(), CadenceError> {
    let key = id.to_string();
    let error_message = error_message.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let Some(current) = current_status(conn, &key)? else {
                return Ok(Guarded::Missing);
            };
            if !current.can_transition_to(status) {
                return Ok(Guarded::Rejected(current));
            }
            conn.execute(
                &format!(
                    "UPDATE sequences
                     SET status = ?1, error_message = COALESCE(?2, error_message), updated_at = {NOW}
                     WHERE id = ?3"
                ),
                params![status.to_string(), error_message, key],
            )?;
            Ok(Guarded::Applied)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .into_result(id, status)
}

/// Store the normalized profile analysis. Only a generating sequence accepts it.
pub async fn update_sequence_analysis(
    db: &Database,
    id: &str,
    analysis: &serde_json::Value,
) -> Result<(), CadenceError> {
    let key = id.to_string();
    let analysis = analysis.clone();
    db.connection()
        .call(move |conn| {
            let Some(current) = current_status(conn, &key)? else {
                return Ok(Guarded::Missing);
            };
            if current != SequenceStatus::Generating {
                return Ok(Guarded::Rejected(current));
            }
            conn.execute(
                &format!(
                    "UPDATE sequences SET prospect_analysis = ?1, updated_at = {NOW} WHERE id = ?2"
                ),
                params![to_json(&analysis)?, key],
            )?;
            Ok(Guarded::Applied)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .into_result(id, SequenceStatus::Generating)
}

/// Mark a generating sequence completed with its overall confidence.
pub async fn complete_sequence(
    db: &Database,
    id: &str,
    overall_confidence: Option<f64>,
) -> Result<(), CadenceError> {
    let key = id.to_string();
    db.connection()
        .call(move |conn| {
            let Some(current) = current_status(conn, &key)? else {
                return Ok(Guarded::Missing);
            };
            if !current.can_transition_to(SequenceStatus::Completed) {
                return Ok(Guarded::Rejected(current));
            }
            conn.execute(
                &format!(
                    "UPDATE sequences
                     SET status = 'completed', overall_confidence = ?1, updated_at = {NOW}
                     WHERE id = ?2"
                ),
                params![overall_confidence, key],
            )?;
            Ok(Guarded::Applied)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .into_result(id, SequenceStatus::Completed)
}
