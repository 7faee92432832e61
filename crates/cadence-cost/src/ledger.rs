// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation ledger: the append-only audit log of model-call attempts.
//!
//! Every attempt the executor makes, successful or not, lands in the
//! `generation_attempts` table with its full prompt, raw response, token
//! counts, estimated cost, and latency. Writes share the storage crate's
//! single writer connection.

use async_trait::async_trait;
use cadence_core::{AttemptLedger, AttemptSummary, CadenceError, GenerationAttempt};
use cadence_storage::models::enum_column;
use cadence_storage::{Database, map_tr_err};
use rusqlite::{Connection, Row, params};
use tracing::debug;

const COLUMNS: &str = "id, sequence_id, phase, model, prompt_tokens, completion_tokens, \
                       total_tokens, estimated_cost_usd, latency_ms, prompt, raw_response, \
                       status, error_message, created_at";

fn row_to_attempt(row: &Row<'_>) -> rusqlite::Result<GenerationAttempt> {
    let latency: i64 = row.get(8)?;
    Ok(GenerationAttempt {
        id: row.get(0)?,
        sequence_id: row.get(1)?,
        phase: enum_column(2, row.get(2)?)?,
        model: row.get(3)?,
        prompt_tokens: row.get(4)?,
        completion_tokens: row.get(5)?,
        total_tokens: row.get(6)?,
        estimated_cost_usd: row.get(7)?,
        latency_ms: u64::try_from(latency).unwrap_or(0),
        prompt: row.get(9)?,
        raw_response: row.get(10)?,
        status: enum_column(11, row.get(11)?)?,
        error_message: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Aggregate attempts matching `filter` (a SQL predicate over one `?1`).
fn summarize(conn: &Connection, filter: &str, arg: &str) -> rusqlite::Result<AttemptSummary> {
    let (count, tokens, cost): (i64, i64, f64) = conn.query_row(
        &format!(
            "SELECT COUNT(*), COALESCE(SUM(total_tokens), 0), COALESCE(SUM(estimated_cost_usd), 0.0)
             FROM generation_attempts WHERE {filter}"
        ),
        params![arg],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT model FROM generation_attempts WHERE {filter}
         GROUP BY model ORDER BY MIN(rowid)"
    ))?;
    let models = stmt
        .query_map(params![arg], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(AttemptSummary {
        attempt_count: u32::try_from(count).unwrap_or(u32::MAX),
        total_tokens: u64::try_from(tokens).unwrap_or(0),
        total_cost_usd: cost,
        models,
    })
}

/// Persistent attempt ledger backed by SQLite.
#[derive(Clone)]
pub struct GenerationLedger {
    conn: tokio_rusqlite::Connection,
}

impl GenerationLedger {
    /// Create a ledger over an existing connection whose schema includes
    /// `generation_attempts`.
    pub fn new(conn: tokio_rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Share the storage layer's writer connection.
    pub fn from_database(db: &Database) -> Self {
        Self::new(db.connection().clone())
    }

    /// Totals for one UTC day (`YYYY-MM-DD`).
    pub async fn daily_summary(&self, date: &str) -> Result<AttemptSummary, CadenceError> {
        let date = date.to_string();
        self.conn
            .call(move |conn| {
                summarize(
                    conn,
                    "created_at >= ?1 AND created_at < date(?1, '+1 day')",
                    &date,
                )
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl AttemptLedger for GenerationLedger {
    async fn record(&self, attempt: &GenerationAttempt) -> Result<(), CadenceError> {
        let a = attempt.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO generation_attempts (id, sequence_id, phase, model,
                         prompt_tokens, completion_tokens, total_tokens, estimated_cost_usd,
                         latency_ms, prompt, raw_response, status, error_message, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    params![
                        a.id,
                        a.sequence_id,
                        a.phase.to_string(),
                        a.model,
                        a.prompt_tokens,
                        a.completion_tokens,
                        a.total_tokens,
                        a.estimated_cost_usd,
                        i64::try_from(a.latency_ms).unwrap_or(i64::MAX),
                        a.prompt,
                        a.raw_response,
                        a.status.to_string(),
                        a.error_message,
                        a.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(
            sequence_id = %attempt.sequence_id,
            phase = %attempt.phase,
            model = %attempt.model,
            status = %attempt.status,
            total_tokens = attempt.total_tokens,
            cost_usd = attempt.estimated_cost_usd,
            "attempt recorded"
        );
        Ok(())
    }

    async fn attempts_for_sequence(
        &self,
        sequence_id: &str,
    ) -> Result<Vec<GenerationAttempt>, CadenceError> {
        let sequence_id = sequence_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM generation_attempts
                     WHERE sequence_id = ?1 ORDER BY created_at ASC, rowid ASC"
                ))?;
                let rows = stmt.query_map(params![sequence_id], row_to_attempt)?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn summary_for_sequence(
        &self,
        sequence_id: &str,
    ) -> Result<AttemptSummary, CadenceError> {
        let sequence_id = sequence_id.to_string();
        self.conn
            .call(move |conn| summarize(conn, "sequence_id = ?1", &sequence_id))
            .await
            .map_err(map_tr_err)
    }
}
