//! The LLM collaborator: request/response types, the client trait, prompt
//! construction, and transports.
//!
//! Timeouts live in the HTTP transport;
//! retries and circuit breaking are left to the caller.

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod prompt;
pub mod replay;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::LlmError;
#[cfg(feature = "http")]
pub use http::HttpLlmClient;
pub use prompt::{PromptBuilder, weight_band};
pub use replay::ReplayClient;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// One completion request: three prompt parts plus sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub developer_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl LlmRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        developer_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            developer_prompt: developer_prompt.into(),
            user_prompt: user_prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Developer and user prompts as a single user message, for APIs that
    /// only accept system + user roles.
    pub fn combined_user_message(&self) -> String {
        format!("{}\n\n{}", self.developer_prompt, self.user_prompt)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Anything that can turn an [`LlmRequest`] into raw model text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_and_builders() {
        let req = LlmRequest::new("sys", "dev", "user");
        assert_eq!(req.model, DEFAULT_MODEL);
        assert_eq!(req.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);

        let req = req.with_model("local-model").with_temperature(0.0).with_max_tokens(512);
        assert_eq!(req.model, "local-model");
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.max_tokens, 512);
    }

    #[test]
    fn combined_user_message_joins_with_blank_line() {
        let req = LlmRequest::new("sys", "dev", "user");
        assert_eq!(req.combined_user_message(), "dev\n\nuser");
    }
}
