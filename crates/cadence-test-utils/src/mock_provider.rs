// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model provider for deterministic testing.
//!
//! `MockProvider` implements `ModelProvider` with a scripted queue of
//! replies, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadence_core::traits::ModelProvider;
use cadence_core::types::{CompletionRequest, CompletionResponse, TokenUsage};
use cadence_core::CadenceError;

/// Text returned once the scripted queue is empty.
pub const DEFAULT_RESPONSE: &str = "mock response";

/// Usage reported for every successful reply.
pub const MOCK_USAGE: TokenUsage = TokenUsage {
    prompt_tokens: 10,
    completion_tokens: 20,
};

/// A mock model provider that replays scripted replies.
///
/// Replies (text or error) are popped from a FIFO queue. When the queue is
/// empty, [`DEFAULT_RESPONSE`] is returned. Every request is logged so
/// tests can assert which models were called.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Result<String, CadenceError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
    served_model: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            served_model: None,
        }
    }

    /// Create a mock provider pre-loaded with successful replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            ..Self::new()
        }
    }

    /// Sleep this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report this model in every response instead of echoing the
    /// requested one, the way hosted APIs answer with a dated snapshot.
    pub fn with_served_model(mut self, model: impl Into<String>) -> Self {
        self.served_model = Some(model.into());
        self
    }

    /// Queue a successful reply.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a failed reply.
    pub async fn push_error(&self, error: CadenceError) {
        self.replies.lock().await.push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Model named by each request, oldest first.
    pub async fn models_called(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }

    /// Scripted replies not yet consumed.
    pub async fn pending(&self) -> usize {
        self.replies.lock().await.len()
    }

    async fn next_reply(&self) -> Result<String, CadenceError> {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_RESPONSE.to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CadenceError> {
        let model = self
            .served_model
            .clone()
            .unwrap_or_else(|| request.model.clone());
        self.requests.lock().await.push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let content = self.next_reply().await?;
        Ok(CompletionResponse {
            content,
            model,
            usage: MOCK_USAGE,
            finish_reason: Some("stop".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::PromptMessage;

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.into(),
            messages: vec![PromptMessage::user("hi")],
            max_tokens: None,
            temperature: None,
            json_mode: true,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request("gpt-4o")).await.unwrap();
        assert_eq!(resp.content, DEFAULT_RESPONSE);
        assert_eq!(resp.usage, MOCK_USAGE);
    }

    #[tokio::test]
    async fn scripted_replies_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into()]);
        provider.push_error(CadenceError::provider("boom")).await;
        provider.push_response("third").await;

        assert_eq!(provider.complete(request("a")).await.unwrap().content, "first");
        assert!(provider.complete(request("b")).await.is_err());
        assert_eq!(provider.complete(request("c")).await.unwrap().content, "third");
        assert_eq!(provider.pending().await, 0);
        assert_eq!(provider.models_called().await, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_before_reply() {
        let provider = MockProvider::new().with_delay(Duration::from_secs(10));
        let started = tokio::time::Instant::now();
        provider.complete(request("gpt-4o")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(10));
    }
}
