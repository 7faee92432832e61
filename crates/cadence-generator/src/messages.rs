// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of the recovered pass-2 payload into sequence messages.

use std::str::FromStr;

use cadence_core::domain::now_timestamp;
use cadence_core::{CadenceError, MessageType, PersonalizationPoint, SequenceMessage};
use serde_json::Value;
use tracing::warn;

/// Confidence assigned to a message the model did not score.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Messages ready to persist plus the sequence-level confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSequence {
    pub messages: Vec<SequenceMessage>,
    pub overall_confidence: Option<f64>,
}

/// Builds one [`SequenceMessage`] per element of `value.messages`.
///
/// The payload must carry a `messages` array with at least `plan.len()`
/// entries; surplus entries are dropped. Messages are ordered by the
/// model's `step_number` (index + 1 when absent) and then renumbered
/// contiguously from 1. A `message_type` outside the vocabulary is replaced
/// by the planned type for that step. Confidences are clamped to `[0, 1]`.
/// When `overall_confidence` is absent it is the mean of message
/// confidences.
pub fn parse_sequence(
    value: &Value,
    raw: &str,
    sequence_id: &str,
    plan: &[MessageType],
) -> Result<ParsedSequence, CadenceError> {
    let parse_error = |message: String| CadenceError::Parse {
        message,
        raw: raw.to_string(),
    };

    let items = value
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| parse_error("sequence output has no messages array".into()))?;

    if items.len() < plan.len() {
        return Err(parse_error(format!(
            "expected {} messages, model returned {}",
            plan.len(),
            items.len()
        )));
    }
    if items.len() > plan.len() {
        warn!(
            expected = plan.len(),
            returned = items.len(),
            "model returned extra messages, truncating"
        );
    }

    let mut keyed = Vec::with_capacity(plan.len());
    for (index, item) in items.iter().take(plan.len()).enumerate() {
        let body = str_field(item, "body");
        if body.is_empty() {
            return Err(parse_error(format!("message {} has no body", index + 1)));
        }
        let step_key = item
            .get("step_number")
            .and_then(Value::as_u64)
            .unwrap_or(index as u64 + 1);
        keyed.push((step_key, index, item, body));
    }
    keyed.sort_by_key(|(step, index, ..)| (*step, *index));

    let created_at = now_timestamp();
    let messages: Vec<SequenceMessage> = keyed
        .into_iter()
        .enumerate()
        .map(|(position, (_, _, item, body))| {
            let planned = plan[position];
            let message_type = item
                .get("message_type")
                .and_then(Value::as_str)
                .and_then(|s| MessageType::from_str(s.trim()).ok())
                .unwrap_or(planned);
            let subject = Some(str_field(item, "subject")).filter(|s| !s.is_empty());
            SequenceMessage {
                id: uuid::Uuid::new_v4().to_string(),
                sequence_id: sequence_id.to_string(),
                step_number: position as u32 + 1,
                message_type,
                subject,
                body,
                thinking_process: str_field(item, "thinking_process"),
                confidence: item
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .map(clamp_unit)
                    .unwrap_or(DEFAULT_CONFIDENCE),
                personalization_points: personalization_points(item),
                created_at: created_at.clone(),
            }
        })
        .collect();

    let overall_confidence = value
        .get("overall_confidence")
        .and_then(Value::as_f64)
        .map(clamp_unit)
        .or_else(|| {
            (!messages.is_empty()).then(|| {
                messages.iter().map(|m| m.confidence).sum::<f64>() / messages.len() as f64
            })
        });

    Ok(ParsedSequence {
        messages,
        overall_confidence,
    })
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { DEFAULT_CONFIDENCE } else { v.clamp(0.0, 1.0) }
}

/// Accepts objects with `point`/`source`/`reasoning` or bare strings.
fn personalization_points(item: &Value) -> Vec<PersonalizationPoint> {
    let Some(points) = item.get("personalization_points").and_then(Value::as_array) else {
        return Vec::new();
    };
    points
        .iter()
        .filter_map(|p| match p {
            Value::String(s) if !s.trim().is_empty() => Some(PersonalizationPoint {
                point: s.trim().to_string(),
                source: String::new(),
                reasoning: String::new(),
            }),
            Value::Object(_) => {
                let point = str_field(p, "point");
                (!point.is_empty()).then(|| PersonalizationPoint {
                    point,
                    source: str_field(p, "source"),
                    reasoning: str_field(p, "reasoning"),
                })
            }
            _ => None,
        })
        .collect()
}
