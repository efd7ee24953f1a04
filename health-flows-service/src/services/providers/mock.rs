//! Scripted mock provider for tests and local development.

use super::{FinishReason, ModelRequest, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted provider outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Reply with this text as the candidate.
    Text(String),
    /// Reply successfully but with no text part.
    Empty,
    /// Fail the call.
    Fail(MockFailure),
}

impl MockReply {
    /// Reply with a JSON document.
    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    RateLimited,
    ContentFiltered,
    Network,
    Api,
}

impl From<MockFailure> for ProviderError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::RateLimited => ProviderError::RateLimited,
            MockFailure::ContentFiltered => ProviderError::ContentFiltered,
            MockFailure::Network => ProviderError::NetworkError("mock connection reset".to_string()),
            MockFailure::Api => ProviderError::ApiError("mock upstream failure".to_string()),
        }
    }
}

/// Mock text provider.
///
/// Replies are served first-in first-out; once the script runs dry every
/// call gets an empty JSON object, which each flow's sanitizer turns into
/// its defaults.
pub struct MockTextProvider {
    enabled: bool,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Enabled provider that answers with `replies` in order.
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let provider = Self::new(true);
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    pub fn push_reply(&self, reply: MockReply) {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(reply);
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|r| r.to_vec())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| MockReply::Text("{}".to_string()));

        let text = match reply {
            MockReply::Text(text) => Some(text),
            MockReply::Empty => None,
            MockReply::Fail(failure) => return Err(failure.into()),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map(|t| t.len() as i32 / 4).unwrap_or(0),
            text,
            input_tokens: request.prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::GenerationParams;

    fn request(prompt: &str) -> ModelRequest {
        ModelRequest {
            prompt: prompt.to_string(),
            media: vec![],
            params: GenerationParams::default(),
        }
    }

    #[tokio::test]
    async fn serves_script_in_order_then_empty_object() {
        let provider = MockTextProvider::with_replies([
            MockReply::Text("first".to_string()),
            MockReply::Empty,
        ]);

        let first = provider.generate(&request("a")).await.unwrap();
        assert_eq!(first.text.as_deref(), Some("first"));

        let second = provider.generate(&request("b")).await.unwrap();
        assert!(second.text.is_none());

        let third = provider.generate(&request("c")).await.unwrap();
        assert_eq!(third.text.as_deref(), Some("{}"));

        let prompts: Vec<String> = provider.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_provider_errors() {
        let provider = MockTextProvider::with_replies([MockReply::Fail(MockFailure::RateLimited)]);
        let err = provider.generate(&request("a")).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn disabled_provider_is_not_configured() {
        let provider = MockTextProvider::new(false);
        assert!(provider.health_check().await.is_err());
        assert!(matches!(
            provider.generate(&request("a")).await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
