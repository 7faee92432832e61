// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Built-in OpenAI list prices, USD per million tokens:
//!
//! gpt-4o:        input=$2.50,  output=$10.00
//! gpt-4o-mini:   input=$0.15,  output=$0.60
//! gpt-4-turbo:   input=$10.00, output=$30.00
//! gpt-3.5-turbo: input=$0.50,  output=$1.50

use std::collections::BTreeMap;

use cadence_config::model::{CostConfig, ProviderKind};
use cadence_core::TokenUsage;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl ModelPricing {
    /// Rate used for self-hosted models.
    pub const ZERO: ModelPricing = ModelPricing {
        input_per_mtok: 0.0,
        output_per_mtok: 0.0,
    };

    const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }
}

/// Ordered so that more specific names match first (`gpt-4o-mini` before
/// `gpt-4o`).
const BUILTIN: &[(&str, ModelPricing)] = &[
    ("gpt-4o-mini", ModelPricing::new(0.15, 0.60)),
    ("gpt-4o", ModelPricing::new(2.50, 10.0)),
    ("gpt-4-turbo", ModelPricing::new(10.0, 30.0)),
    ("gpt-3.5-turbo", ModelPricing::new(0.50, 1.50)),
];

/// The cheapest built-in entry, charged for models the table does not know.
fn cheapest() -> ModelPricing {
    BUILTIN
        .iter()
        .map(|(_, p)| *p)
        .min_by(|a, b| {
            (a.input_per_mtok + a.output_per_mtok).total_cmp(&(b.input_per_mtok + b.output_per_mtok))
        })
        .unwrap_or(ModelPricing::ZERO)
}

/// Look up built-in pricing by substring match on the model identifier.
///
/// Unknown models are charged the cheapest known rate so estimates never
/// silently disappear.
pub fn get_pricing(model: &str) -> ModelPricing {
    let lower = model.to_lowercase();
    BUILTIN
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, p)| *p)
        .unwrap_or_else(cheapest)
}

/// Cost in USD: `(prompt * in + completion * out) / 1_000_000`.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    (usage.prompt_tokens as f64 * pricing.input_per_mtok
        + usage.completion_tokens as f64 * pricing.output_per_mtok)
        / 1_000_000.0
}

/// Resolved pricing for one provider: configured overrides first, then either
/// the built-in table or a flat zero rate for self-hosted endpoints.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    overrides: BTreeMap<String, ModelPricing>,
    zero_rated: bool,
}

impl PricingTable {
    /// Built-in hosted prices with no overrides.
    pub fn hosted() -> Self {
        Self::default()
    }

    /// Every model costs zero unless explicitly overridden.
    pub fn self_hosted() -> Self {
        Self {
            overrides: BTreeMap::new(),
            zero_rated: true,
        }
    }

    pub fn from_config(cost: &CostConfig, kind: ProviderKind) -> Self {
        let mut table = match kind {
            ProviderKind::Openai => Self::hosted(),
            ProviderKind::SelfHosted => Self::self_hosted(),
        };
        for (model, rate) in &cost.rates {
            table = table.with_rate(model, ModelPricing::new(rate.input_per_mtok, rate.output_per_mtok));
        }
        table
    }

    /// Add or replace the rate for an exact model name.
    pub fn with_rate(mut self, model: &str, pricing: ModelPricing) -> Self {
        self.overrides.insert(model.to_string(), pricing);
        self
    }

    pub fn pricing_for(&self, model: &str) -> ModelPricing {
        if let Some(p) = self.overrides.get(model) {
            return *p;
        }
        if self.zero_rated {
            ModelPricing::ZERO
        } else {
            get_pricing(model)
        }
    }

    /// Estimated USD cost of one call.
    pub fn estimate(&self, model: &str, usage: &TokenUsage) -> f64 {
        calculate_cost(usage, &self.pricing_for(model))
    }
}
