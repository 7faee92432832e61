// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible model provider for Cadence.
//!
//! This crate implements [`ModelProvider`] on top of the Chat Completions
//! API. The same adapter serves the hosted OpenAI API and self-hosted
//! OpenAI-compatible servers (vLLM, llama.cpp, Ollama); only the base URL
//! and the authentication requirement differ.

pub mod client;
pub mod types;

use async_trait::async_trait;
use cadence_config::model::{ProviderConfig, ProviderKind};
use cadence_core::error::CadenceError;
use cadence_core::traits::ModelProvider;
use cadence_core::types::{CompletionRequest, CompletionResponse, TokenUsage};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest, ResponseFormat};

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat Completions provider implementing [`ModelProvider`].
pub struct OpenAiCompatProvider {
    client: OpenAiClient,
    kind: ProviderKind,
}

impl OpenAiCompatProvider {
    /// Creates a provider from the `[provider]` config section.
    ///
    /// # API Key Resolution
    /// 1. `provider.api_key` if set and non-empty
    /// 2. `OPENAI_API_KEY` environment variable
    /// 3. Hosted OpenAI returns an error; self-hosted proceeds without auth
    pub fn new(config: &ProviderConfig) -> Result<Self, CadenceError> {
        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            config.kind,
            std::env::var(API_KEY_ENV).ok(),
        )?;
        let client = OpenAiClient::new(config.effective_base_url(), api_key.as_deref())?;

        info!(
            kind = %config.kind,
            endpoint = client.endpoint(),
            model = config.model,
            "model provider initialized"
        );

        Ok(Self {
            client,
            kind: config.kind,
        })
    }

    /// Creates a provider with an existing client (for testing).
    pub fn with_client(client: OpenAiClient, kind: ProviderKind) -> Self {
        Self { client, kind }
    }

    fn to_chat_request(request: &CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_mode.then(ResponseFormat::json_object),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CadenceError> {
        let chat_request = Self::to_chat_request(&request);
        let response = self.client.complete(&chat_request, request.timeout).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CadenceError::provider("response contained no choices"))?;
        let usage = response.usage.unwrap_or_default();
        debug!(
            kind = %self.kind,
            model = %response.model,
            finish_reason = ?choice.finish_reason,
            completion_tokens = usage.completion_tokens,
            "chat completion received"
        );

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: if response.model.is_empty() {
                request.model
            } else {
                response.model
            },
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
            finish_reason: choice.finish_reason,
        })
    }
}

/// Picks the API key from config, then the environment.
fn resolve_api_key(
    config_key: Option<&str>,
    kind: ProviderKind,
    env_key: Option<String>,
) -> Result<Option<String>, CadenceError> {
    if let Some(key) = config_key.filter(|k| !k.is_empty()) {
        return Ok(Some(key.to_string()));
    }
    if let Some(key) = env_key.filter(|k| !k.is_empty()) {
        return Ok(Some(key));
    }
    match kind {
        ProviderKind::SelfHosted => Ok(None),
        ProviderKind::Openai => Err(CadenceError::Config(format!(
            "OpenAI API key not found. Set provider.api_key in config or the {API_KEY_ENV} environment variable."
        ))),
    }
}
