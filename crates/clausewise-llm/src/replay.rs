//! Client that answers every request with a fixed, pre-recorded response.
//!
//! Used for offline runs (`clausewise analyze --response saved.json`) and tests.

use async_trait::async_trait;
use tracing::debug;

use crate::{LlmClient, LlmError, LlmRequest, LlmResponse};

#[derive(Debug, Clone)]
pub struct ReplayClient {
    content: String,
    model: String,
}

impl ReplayClient {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: "replay".to_string(),
        }
    }

    /// Model name reported in responses instead of `replay`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LlmClient for ReplayClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        debug!(
            requested_model = %request.model,
            prompt_chars = request.user_prompt.chars().count(),
            "replaying recorded response"
        );
        Ok(LlmResponse {
            content: self.content.clone(),
            model: self.model.clone(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_recorded_content() {
        let client = ReplayClient::new("{\"items\": []}").with_model("gpt-4o-mini");
        let resp = client
            .complete(&LlmRequest::new("s", "d", "u"))
            .await
            .unwrap();
        assert_eq!(resp.content, "{\"items\": []}");
        assert_eq!(resp.model, "gpt-4o-mini");
        assert!(resp.total_tokens.is_none());
    }
}
