// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation and the attempt ledger for Cadence.

pub mod ledger;
pub mod pricing;

pub use ledger::GenerationLedger;
pub use pricing::{ModelPricing, PricingTable, calculate_cost, get_pricing};
