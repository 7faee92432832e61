// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-facing types shared across adapter traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Speaker of a prompt message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One entry of the ordered prompt sent to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Renders a prompt the way it is stored in the attempt log.
pub fn render_prompt(messages: &[PromptMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("[{}]\n{}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A single completion request to a model provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier to invoke.
    pub model: String,
    /// Ordered prompt messages.
    pub messages: Vec<PromptMessage>,
    /// Maximum tokens to generate. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
    /// Sampling temperature. `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Ask the provider for a `json_object` response format.
    pub json_mode: bool,
    /// Per-request deadline the provider should honor.
    pub timeout: Duration,
}

/// Token counts reported by a provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// The full (non-streamed) result of a completion request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Raw generated text.
    pub content: String,
    /// Model that actually served the request.
    pub model: String,
    pub usage: TokenUsage,
    /// Provider finish reason ("stop", "length", ...), if reported.
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn message_role_round_trips_lowercase() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::from_str("user").unwrap(), MessageRole::User);
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn render_prompt_tags_each_role() {
        let rendered = render_prompt(&[
            PromptMessage::system("be terse"),
            PromptMessage::user("analyze"),
        ]);
        assert_eq!(rendered, "[system]\nbe terse\n\n[user]\nanalyze");
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 1200,
            completion_tokens: 340,
        };
        assert_eq!(usage.total(), 1540);
        assert_eq!(TokenUsage::default().total(), 0);
    }
}
