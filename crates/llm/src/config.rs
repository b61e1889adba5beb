use std::sync::Arc;

use matchmate_common::{MatchmateError, Result};
use serde::{Deserialize, Serialize};

use crate::client::LlmClient;
use crate::gemini::GeminiClient;

/// Backend selection and sampling settings for the text-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type. Only "gemini" is supported.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// API key. When unset, read from the provider's environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's default base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    /// Environment variables consulted for the provider's key, in priority order.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self.provider.as_str() {
            "gemini" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            _ => &[],
        }
    }

    /// Resolve the API key from config or the process environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key using `lookup` for environment access.
    ///
    /// Priority:
    /// 1. Explicit, non-empty `api_key` in config
    /// 2. The provider's environment variables, first non-empty wins
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        self.api_key_env_vars()
            .iter()
            .filter_map(|&name| lookup(name))
            .find(|key| !key.is_empty())
    }
}

/// Build the configured backend.
///
/// A missing key is not an error here; the backend reports it on every call.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let api_key = config.resolve_api_key();
    build_llm_client_with_key(config, api_key)
}

pub fn build_llm_client_with_key(
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match config.provider.as_str() {
        "gemini" => Arc::new(GeminiClient::new(
            config.api_url.clone(),
            config.model.clone(),
            api_key,
        )),
        other => {
            return Err(MatchmateError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_config_defaults() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert!(config.api_key.is_none());
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn deserialize_config_from_toml() {
        let toml_str = r#"
model = "gemini-2.5-pro"
api_url = "http://localhost:8089"
temperature = 0.4
max_tokens = 1024
"#;
        let config: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8089"));
        assert_eq!(config.max_tokens, Some(1024));
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let config = LlmConfig {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|_| Some("from-env".into()));
        assert_eq!(key.as_deref(), Some("from-config"));
    }

    #[test]
    fn gemini_key_falls_back_to_google_api_key() {
        let config = LlmConfig::default();
        let key = config.resolve_api_key_with(|name| match name {
            "GOOGLE_API_KEY" => Some("google".into()),
            "GEMINI_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("google"));
    }

    #[test]
    fn unknown_provider_has_no_key_source() {
        let config = LlmConfig {
            provider: "mystery".into(),
            ..Default::default()
        };
        assert!(config.resolve_api_key_with(|_| Some("x".into())).is_none());
    }

    #[test]
    fn build_gemini_without_key() {
        let config = LlmConfig {
            model: "gemini-2.5-pro".into(),
            ..Default::default()
        };
        let client = build_llm_client_with_key(&config, None).unwrap();
        assert_eq!(client.model_name(), "gemini-2.5-pro");
    }

    #[test]
    fn build_other_providers_fails() {
        for provider in ["openai", "anthropic", "cohere"] {
            let config = LlmConfig {
                provider: provider.into(),
                ..Default::default()
            };
            let err = build_llm_client_with_key(&config, Some("k".into()))
                .err()
                .unwrap();
            assert!(matches!(err, MatchmateError::Config(_)));
            assert_eq!(
                err.to_string(),
                format!("Configuration error: Unknown LLM provider: {provider}")
            );
        }
    }
}
