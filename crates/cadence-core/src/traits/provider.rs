// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model provider trait: the single capability the generation pipeline needs
//! from a language model endpoint.

use async_trait::async_trait;

use crate::error::CadenceError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for a text-generation endpoint.
///
/// Implementations perform exactly one call per invocation. Retry, backoff,
/// and model fallback belong to the caller.
#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CadenceError>;
}
