//! Server configuration.
//!
//! Loaded from an optional TOML file; CLI flags and environment variables
//! are applied on top by the binary.

use matchmate_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CSV roster read on every `POST /run`.
    #[serde(default = "default_roster_path")]
    pub roster_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

fn default_roster_path() -> PathBuf {
    PathBuf::from("data/students.csv")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            roster_path: default_roster_path(),
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Warns when the file carries an API key; environment variables are preferred.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config = Self::from_toml(&content)?;

        if config.llm.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. Prefer environment variables \
                 (GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY).",
                path.display()
            );
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.bind, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.roster_path, PathBuf::from("data/students.csv"));
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn toml_overrides_nested_llm_section() {
        let config = ServerConfig::from_toml(
            r#"
bind = "0.0.0.0"
port = 9000
roster_path = "data/roster.csv"

[llm]
model = "gemini-2.5-pro"
temperature = 0.3
"#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.roster_path, PathBuf::from("data/roster.csv"));
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(ServerConfig::from_toml("port = \"eighty\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ServerConfig::from_file("/no/such/matchmate.toml").is_err());
    }
}
