// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of the profile-analysis payload.
//!
//! Models routinely omit keys or return the wrong JSON type for them. The
//! normalized analysis always carries every documented key with the
//! documented type, so the sequence prompt and downstream readers never
//! need to special-case a missing field. Extra keys are preserved.

use cadence_core::CadenceError;
use serde_json::{Map, Value};

/// Keys that must hold a string.
pub const STRING_FIELDS: &[&str] = &["summary", "communication_style"];

/// Keys that must hold an array.
pub const ARRAY_FIELDS: &[&str] = &[
    "pain_points",
    "interests",
    "talking_points",
    "personalization_hooks",
];

/// Accepted seniority values. Anything else becomes `"unknown"`.
pub const SENIORITY_LEVELS: &[&str] = &[
    "entry",
    "mid",
    "senior",
    "executive",
    "founder",
    "unknown",
];

/// Normalizes a recovered analysis value.
///
/// Missing or non-array array fields become `[]`, missing or non-string
/// string fields become `""`, and an unrecognized seniority becomes
/// `"unknown"`. A top-level value that is not an object is a parse error.
pub fn normalize_analysis(value: Value, raw: &str) -> Result<Value, CadenceError> {
    let Value::Object(mut map) = value else {
        return Err(CadenceError::Parse {
            message: "profile analysis is not a JSON object".into(),
            raw: raw.to_string(),
        });
    };

    for key in STRING_FIELDS {
        ensure(&mut map, key, Value::is_string, || Value::String(String::new()));
    }
    for key in ARRAY_FIELDS {
        ensure(&mut map, key, Value::is_array, || Value::Array(Vec::new()));
    }

    let seniority = map
        .get("seniority")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| SENIORITY_LEVELS.contains(&s.as_str()))
        .unwrap_or_else(|| "unknown".to_string());
    map.insert("seniority".into(), Value::String(seniority));

    Ok(Value::Object(map))
}

fn ensure(
    map: &mut Map<String, Value>,
    key: &str,
    valid: fn(&Value) -> bool,
    default: impl FnOnce() -> Value,
) {
    if !map.get(key).is_some_and(valid) {
        map.insert(key.to_string(), default());
    }
}
