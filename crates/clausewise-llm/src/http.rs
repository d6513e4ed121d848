//! OpenAI-compatible chat-completions transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{LlmClient, LlmError, LlmRequest, LlmResponse};

/// HTTP client for `POST {base_url}/v1/chat/completions`.
pub struct HttpLlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

impl HttpLlmClient {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `https://api.openai.com` (a trailing slash is
    /// dropped). `timeout` bounds the whole request.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

fn chat_request(request: &LlmRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: &request.model,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        messages: vec![
            ChatMessage {
                role: "system",
                content: request.system_prompt.clone(),
            },
            ChatMessage {
                role: "user",
                content: request.combined_user_message(),
            },
        ],
    }
}

fn into_response(chat: ChatResponse, requested_model: &str) -> Result<LlmResponse, LlmError> {
    let content = chat
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::MissingContent)?;

    let (prompt_tokens, completion_tokens, total_tokens) = match chat.usage {
        Some(u) => (u.prompt_tokens, u.completion_tokens, u.total_tokens),
        None => (None, None, None),
    };

    Ok(LlmResponse {
        content,
        model: chat.model.unwrap_or_else(|| requested_model.to_string()),
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = self.endpoint();
        info!(url = %url, model = %request.model, "calling LLM");

        let mut builder = self.client.post(&url).json(&chat_request(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body)?;
        let response = into_response(chat, &request.model)?;
        info!(
            model = %response.model,
            total_tokens = response.total_tokens.unwrap_or(0),
            "LLM call complete"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpLlmClient {
        HttpLlmClient::new(base.into(), Some("k".into()), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn trims_trailing_slash() {
        let c = client("http://localhost:8080/");
        assert_eq!(c.base_url, "http://localhost:8080");
        assert_eq!(c.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn empty_api_key_is_none() {
        let c = HttpLlmClient::new("http://x".into(), Some(String::new()), Duration::from_secs(1))
            .unwrap();
        assert!(c.api_key.is_none());
    }

    #[test]
    fn request_body_shape() {
        let req = LlmRequest::new("sys", "dev", "user").with_model("m");
        let body = serde_json::to_value(chat_request(&req)).unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "dev\n\nuser");
    }

    #[test]
    fn parses_completion() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"a\":1}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let chat: ChatResponse = serde_json::from_str(json).unwrap();
        let resp = into_response(chat, "gpt-4o-mini").unwrap();
        assert_eq!(resp.content, "{\"a\":1}");
        assert_eq!(resp.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(resp.total_tokens, Some(15));
    }

    #[test]
    fn missing_content() {
        for json in [
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"content": null}}]}"#,
            r#"{"choices": [{"message": {"content": "  "}}]}"#,
        ] {
            let chat: ChatResponse = serde_json::from_str(json).unwrap();
            assert!(matches!(
                into_response(chat, "m").unwrap_err(),
                LlmError::MissingContent
            ));
        }
    }

    #[test]
    fn model_falls_back_to_requested() {
        let chat: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "x"}}]}"#).unwrap();
        assert_eq!(into_response(chat, "requested").unwrap().model, "requested");
    }
}
