// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping helpers.
//!
//! The entity types live in `cadence-core::domain`; they are re-exported here
//! for convenience within the storage crate.

use std::str::FromStr;

use rusqlite::types::Type;
use serde::de::DeserializeOwned;

pub use cadence_core::domain::{
    Profile, Sequence, SequenceMessage, SequenceStatus, ToneAxes, ToneConfig,
};

/// Parse a TEXT column holding a strum-encoded enum.
pub fn enum_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a TEXT column holding JSON.
pub fn json_column<T: DeserializeOwned>(idx: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Serialize a value for a JSON TEXT column.
pub fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
