// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequence message persistence.

use cadence_core::CadenceError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{SequenceMessage, SequenceStatus, enum_column, json_column, to_json};
use crate::queries::sequences::{Guarded, current_status};

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<SequenceMessage> {
    let points: String = row.get(8)?;
    Ok(SequenceMessage {
        id: row.get(0)?,
        sequence_id: row.get(1)?,
        step_number: row.get(2)?,
        message_type: enum_column(3, row.get(3)?)?,
        subject: row.get(4)?,
        body: row.get(5)?,
        thinking_process: row.get(6)?,
        confidence: row.get(7)?,
        personalization_points: json_column(8, &points)?,
        created_at: row.get(9)?,
    })
}

/// Insert every message in one transaction. Either all rows land or none do.
///
/// Messages may only be added to a sequence that is still generating.
pub async fn insert_messages(
    db: &Database,
    messages: &[SequenceMessage],
) -> Result<(), CadenceError> {
    let messages = messages.to_vec();
    let (sequence_id, guarded) = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut owners: Vec<&str> = messages.iter().map(|m| m.sequence_id.as_str()).collect();
            owners.sort_unstable();
            owners.dedup();
            for owner in owners {
                let verdict = match current_status(&tx, owner)? {
                    None => Guarded::Missing,
                    Some(SequenceStatus::Generating) => continue,
                    Some(current) => Guarded::Rejected(current),
                };
                return Ok((owner.to_string(), verdict));
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO messages (id, sequence_id, step_number, message_type, subject,
                         body, thinking_process, confidence, personalization_points, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )?;
                for m in &messages {
                    stmt.execute(params![
                        m.id,
                        m.sequence_id,
                        m.step_number,
                        m.message_type.to_string(),
                        m.subject,
                        m.body,
                        m.thinking_process,
                        m.confidence,
                        to_json(&m.personalization_points)?,
                        m.created_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok((String::new(), Guarded::Applied))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    guarded.into_result(&sequence_id, SequenceStatus::Generating)
}

/// Messages for a sequence in step order.
pub async fn get_messages(
    db: &Database,
    sequence_id: &str,
) -> Result<Vec<SequenceMessage>, CadenceError> {
    let sequence_id = sequence_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sequence_id, step_number, message_type, subject, body,
                        thinking_process, confidence, personalization_points, created_at
                 FROM messages WHERE sequence_id = ?1 ORDER BY step_number ASC",
            )?;
            let rows = stmt.query_map(params![sequence_id], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{sample_sequence, seeded_db};
    use crate::queries::sequences::{complete_sequence, create_sequence, update_sequence_status};
    use cadence_core::domain::{MessageType, PersonalizationPoint};

    async fn generating_db() -> Database {
        let db = seeded_db().await;
        update_sequence_status(&db, "s1", SequenceStatus::Generating, None)
            .await
            .unwrap();
        db
    }

    fn message(id: &str, step: u32, message_type: MessageType) -> SequenceMessage {
        SequenceMessage {
            id: id.to_string(),
            sequence_id: "s1".to_string(),
            step_number: step,
            message_type,
            subject: (step > 1).then(|| format!("Step {step}")),
            body: format!("Body {step}"),
            thinking_process: "Lead with their migration work.".to_string(),
            confidence: 0.7,
            personalization_points: vec![PersonalizationPoint {
                point: "Kubernetes migration".to_string(),
                source: "experience".to_string(),
                reasoning: "Recent and public".to_string(),
            }],
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn inserted_messages_come_back_in_step_order() {
        let db = generating_db().await;

        insert_messages(
            &db,
            &[
                message("m3", 3, MessageType::DirectAsk),
                message("m1", 1, MessageType::ConnectionRequest),
                message("m2", 2, MessageType::FollowUpValue),
            ],
        )
        .await
        .unwrap();

        let stored = get_messages(&db, "s1").await.unwrap();
        let steps: Vec<u32> = stored.iter().map(|m| m.step_number).collect();
        assert_eq!(steps, vec![1, 2, 3]);
        assert_eq!(stored[0].message_type, MessageType::ConnectionRequest);
        assert_eq!(stored[0].subject, None);
        assert_eq!(stored[2].personalization_points[0].point, "Kubernetes migration");
    }

    #[tokio::test]
    async fn duplicate_step_rolls_back_the_batch() {
        let db = generating_db().await;

        let result = insert_messages(
            &db,
            &[
                message("m1", 1, MessageType::ConnectionRequest),
                message("m2", 1, MessageType::FollowUpValue),
            ],
        )
        .await;
        assert!(result.is_err());
        assert!(get_messages(&db, "s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn completed_sequence_rejects_new_messages() {
        let db = generating_db().await;
        complete_sequence(&db, "s1", Some(0.9)).await.unwrap();

        let result = insert_messages(&db, &[message("m7", 7, MessageType::Breakup)]).await;
        assert!(matches!(
            result,
            Err(CadenceError::InvalidTransition {
                from: SequenceStatus::Completed,
                to: SequenceStatus::Generating,
            })
        ));
        assert!(get_messages(&db, "s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_sequence_rejects_messages() {
        let db = seeded_db().await;
        create_sequence(&db, &sample_sequence("s1")).await.unwrap();

        let result =
            insert_messages(&db, &[message("m1", 1, MessageType::ConnectionRequest)]).await;
        assert!(matches!(result, Err(CadenceError::InvalidTransition { .. })));
        assert!(get_messages(&db, "s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn messages_for_unknown_sequence_are_not_found() {
        let db = seeded_db().await;
        let mut orphan = message("m1", 1, MessageType::ConnectionRequest);
        orphan.sequence_id = "missing".to_string();

        match insert_messages(&db, &[orphan]).await {
            Err(CadenceError::NotFound { entity, id }) => {
                assert_eq!(entity, "sequence");
                assert_eq!(id, "missing");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
