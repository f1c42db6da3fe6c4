use crate::config::AppConfig;
use crate::error::GenerateError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// System instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str =
    "You are a creative TikTok content strategist. Return numbered ideas only.";

/// One message in the chat-completions payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

/// The slice of the upstream envelope the orchestrator cares about. The
/// relay itself passes the envelope through verbatim.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: MessageBody,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub content: String,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

/// Builds the two-message prompt for an idea generation call. The requested
/// count is only a hint to the model; the parser never enforces it.
pub fn idea_prompt(niche: &str, style: &str, count: u32) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Generate {count} TikTok ideas for {niche} in {style} style"
        )),
    ]
}

/// Client for the upstream OpenAI-compatible completions API. Holds the
/// credential; everything else in the crate only ever sees its output.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
    model: Arc<str>,
    temperature: f64,
    max_tokens: u32,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Builds a client from the app configuration, or `None` when no
    /// credential is configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config.api_key.as_deref().map(|key| Self {
            http: reqwest::Client::new(),
            api_key: key.into(),
            base_url: config.base_url.as_str().into(),
            model: config.model.as_str().into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one completion request and returns the raw response envelope.
    ///
    /// Non-success upstream statuses become [`GenerateError::UpstreamStatus`];
    /// the response body is logged here and never surfaced to callers.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> Result<serde_json::Value, GenerateError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %snippet(&body, 200),
                "upstream completion request failed"
            );
            return Err(GenerateError::UpstreamStatus {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<serde_json::Value>().await?)
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_interpolates_count_niche_and_style() {
        let messages = idea_prompt("home cooking", "funny", 5);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
        assert_eq!(
            messages[1].content,
            "Generate 5 TikTok ideas for home cooking in funny style"
        );
    }

    #[test]
    fn request_serializes_the_wire_shape() {
        let messages = idea_prompt("fitness", "educational", 10);
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
            temperature: 0.8,
            max_tokens: 2000,
        };
        let value = serde_json::to_value(&request).expect("serializable request");
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["temperature"], 0.8);
        assert_eq!(value["max_tokens"], 2000);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
    }

    #[test]
    fn decodes_a_completion_envelope() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "llama-3.3-70b-versatile",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "1. Do a Q&A" },
                    "finish_reason": "stop"
                }
            ],
            "usage": { "prompt_tokens": 30, "completion_tokens": 12, "total_tokens": 42 }
        }"#;
        let envelope: ChatResponse = serde_json::from_str(body).expect("decodable envelope");
        assert_eq!(envelope.first_text(), Some("1. Do a Q&A"));
    }

    #[test]
    fn empty_or_missing_choices_yield_no_text() {
        let envelope: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).expect("decodable");
        assert!(envelope.first_text().is_none());
        let envelope: ChatResponse = serde_json::from_str(r#"{}"#).expect("decodable");
        assert!(envelope.first_text().is_none());
    }

    #[test]
    fn client_requires_a_credential() {
        let config = AppConfig::default();
        assert!(ProviderClient::from_config(&config).is_none());

        let config = AppConfig {
            api_key: Some("gsk_test".to_string()),
            ..AppConfig::default()
        };
        let client = ProviderClient::from_config(&config).expect("client with credential");
        assert_eq!(client.base_url(), "https://api.groq.com/openai/v1");
        assert_eq!(client.model(), "llama-3.3-70b-versatile");
        assert!(!format!("{client:?}").contains("gsk_test"));
    }
}
