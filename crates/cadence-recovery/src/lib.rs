// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output recovery for model responses that are nominally JSON.
//!
//! Models wrap JSON in markdown fences, add prose preambles, leave trailing
//! commas, use single quotes, or stop mid-object when they hit a token limit.
//! [`recover`] runs a cascade of increasingly invasive stages and returns the
//! first value that parses:
//!
//! 1. direct parse
//! 2. contents of the first markdown fence
//! 3. substring from the first `{` to the last `}`
//! 4. syntax repairs on that substring, or on the text from the first
//!    opener when there is no object
//! 5. truncation closing: unmatched brackets and braces are closed
//!
//! Stage 5 is best-effort. It can only restore shape, never missing content.

pub mod repair;

use std::sync::LazyLock;

use cadence_core::CadenceError;
use regex::Regex;
use serde_json::Value;
use strum::Display;
use tracing::debug;

/// Characters of raw output kept in a parse error by default.
pub const DEFAULT_RAW_CAP: usize = 2000;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("valid fence regex")
});

/// The cascade stage that produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Direct,
    Fenced,
    Extracted,
    Repaired,
    Truncated,
}

/// A recovered value and the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub value: Value,
    pub stage: Stage,
}

/// Recover a JSON value from raw model text.
pub fn recover(raw: &str) -> Result<Value, CadenceError> {
    recover_detailed(raw, DEFAULT_RAW_CAP).map(|r| r.value)
}

/// Recover a JSON value, reporting the stage used. On failure the error
/// carries at most `raw_cap` characters of the input.
pub fn recover_detailed(raw: &str, raw_cap: usize) -> Result<Recovered, CadenceError> {
    let result = run_cascade(raw);
    match &result {
        Some(r) if r.stage != Stage::Direct => {
            debug!(stage = %r.stage, raw_len = raw.len(), "model output recovered");
        }
        _ => {}
    }
    result.ok_or_else(|| CadenceError::Parse {
        message: format!(
            "could not recover JSON from model output ({} chars)",
            raw.chars().count()
        ),
        raw: cap(raw, raw_cap),
    })
}

fn run_cascade(raw: &str) -> Option<Recovered> {
    let found = |value: Value, stage: Stage| Some(Recovered { value, stage });

    if let Ok(value) = serde_json::from_str(raw) {
        return found(value, Stage::Direct);
    }

    // Later stages work inside the fence when there is one.
    let fenced = FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim());
    if let Some(inner) = fenced {
        if let Ok(value) = serde_json::from_str(inner) {
            return found(value, Stage::Fenced);
        }
    }
    let base = fenced.unwrap_or(raw);

    let extracted = base.find('{').and_then(|start| {
        base.rfind('}')
            .filter(|&end| end > start)
            .map(|end| &base[start..=end])
    });
    if let Some(candidate) = extracted {
        if let Ok(value) = serde_json::from_str(candidate) {
            return found(value, Stage::Extracted);
        }
    }

    // Without an extracted object, repairs run from the first opener so a
    // bare top-level array still gets through.
    let tail = base.find(['{', '[']).map_or(base, |start| &base[start..]);
    let repaired = repair::repair(extracted.unwrap_or(tail));
    if let Ok(value) = serde_json::from_str(&repaired) {
        return found(value, Stage::Repaired);
    }

    // A truncated response ends mid-structure, so close from the first
    // opener to the end of the text before falling back to the extracted
    // substring.
    let tails = [Some(tail), extracted];
    for tail in tails.into_iter().flatten() {
        let closed = repair::close_truncated(&repair::repair(tail));
        if let Ok(value) = serde_json::from_str(&closed) {
            return found(value, Stage::Truncated);
        }
    }

    None
}

/// Keep at most `limit` characters, on a char boundary.
pub fn cap(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
