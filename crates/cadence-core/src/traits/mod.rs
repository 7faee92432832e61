// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod ledger;
pub mod profile;
pub mod provider;
pub mod storage;

pub use ledger::AttemptLedger;
pub use profile::ProfileResolver;
pub use provider::ModelProvider;
pub use storage::StorageAdapter;
