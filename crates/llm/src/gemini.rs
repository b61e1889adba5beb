//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use matchmate_common::{MatchmateError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{require_api_key, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::Assistant => "model",
            Role::System | Role::User => "user",
        }
    }

    fn build_request_body(&self, request: &LlmRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .filter(|msg| msg.role != Role::System)
            .map(|msg| GeminiContent {
                role: Some(Self::role_to_string(&msg.role).to_string()),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system_prompt.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system.clone(),
            }],
        });

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Pull the human-readable message out of a Gemini error body, if it has one.
    fn error_message(body_text: &str) -> String {
        serde_json::from_str::<GeminiErrorBody>(body_text)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body_text.to_string())
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_key = require_api_key("gemini", self.api_key.as_deref())?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = self.build_request_body(&request);

        debug!(model = %self.model, "Sending Gemini generateContent");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MatchmateError::Collaborator(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(MatchmateError::Collaborator(format!(
                "Gemini API error {status}: {}",
                Self::error_message(&body_text)
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            MatchmateError::Collaborator(format!("Failed to parse Gemini response: {e}"))
        })?;

        let candidate = gemini_response.candidates.into_iter().next().ok_or_else(|| {
            MatchmateError::Collaborator("No candidates in Gemini response".to_string())
        })?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            content,
            model: gemini_response
                .model_version
                .unwrap_or_else(|| self.model.clone()),
            usage: gemini_response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            }),
            finish_reason: candidate.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    #[test]
    fn request_body_uses_system_instruction_and_camel_case() {
        let client = GeminiClient::new(None, "gemini-2.5-flash".to_string(), Some("k".into()));
        let request = LlmRequest {
            system_prompt: Some("You are Student Matcher.".to_string()),
            messages: vec![ChatMessage::user("Pair these students")],
            temperature: Some(0.1),
            max_tokens: Some(2048),
        };

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are Student Matcher."
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Pair these students");
        let temp = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 0.001);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn generation_config_omitted_without_sampling_options() {
        let client = GeminiClient::new(None, "gemini-2.5-flash".to_string(), None);
        let request = LlmRequest {
            messages: vec![ChatMessage::user("Hello")],
            ..Default::default()
        };

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn error_message_prefers_structured_message() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(GeminiClient::error_message(body), "quota exceeded");
        assert_eq!(GeminiClient::error_message("upstream down"), "upstream down");
    }
}
