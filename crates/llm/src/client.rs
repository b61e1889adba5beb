use async_trait::async_trait;
use matchmate_common::{MatchmateError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

/// A chat-completion backend.
///
/// Implementations make exactly one upstream call per `complete` and never retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;
    fn model_name(&self) -> &str;
}

/// Fail the call when a provider that needs a credential has none configured.
pub(crate) fn require_api_key<'a>(provider: &str, api_key: Option<&'a str>) -> Result<&'a str> {
    match api_key {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(MatchmateError::Collaborator(format!(
            "no API key configured for provider {provider}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_helper() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn llm_request_defaults_are_empty() {
        let request = LlmRequest::default();
        assert!(request.system_prompt.is_none());
        assert!(request.messages.is_empty());
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn require_api_key_rejects_missing_and_empty() {
        assert!(require_api_key("gemini", None).is_err());
        assert!(require_api_key("gemini", Some("")).is_err());
        assert_eq!(require_api_key("gemini", Some("k")).unwrap(), "k");

        let err = require_api_key("gemini", None).unwrap_err();
        assert_eq!(err.to_string(), "no API key configured for provider gemini");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
