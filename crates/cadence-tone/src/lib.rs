// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tone translator: turns numeric tone axes into writing instructions that
//! condition the sequence-generation prompt.

pub mod translator;

pub use translator::{Axis, Tier, classify_axes, translate};
