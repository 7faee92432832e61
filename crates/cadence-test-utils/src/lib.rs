// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cadence integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock model provider with scripted replies
//! - [`MemoryLedger`] - In-memory attempt ledger
//! - [`TestHarness`] - Full generation stack over a temp database
//! - [`fixtures`] - Well-formed model outputs and requests

pub mod fixtures;
pub mod harness;
pub mod memory_ledger;
pub mod mock_provider;

pub use harness::TestHarness;
pub use memory_ledger::MemoryLedger;
pub use mock_provider::MockProvider;
