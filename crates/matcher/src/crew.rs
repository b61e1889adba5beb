//! The text-generation collaborator seam.
//!
//! The pipeline hands a [`CrewRequest`] to a [`Collaborator`] and gets back
//! free text. [`LlmCollaborator`] is the production implementation over any
//! [`LlmClient`]; tests substitute deterministic stand-ins.

use std::sync::Arc;

use async_trait::async_trait;
use matchmate_common::{MatchmateError, Result};
use matchmate_llm::{build_llm_client, ChatMessage, LlmClient, LlmConfig, LlmRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::prompt::MatcherPersona;

/// Everything the collaborator needs for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewRequest {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub task: String,
    pub expected_output: String,
}

impl CrewRequest {
    pub fn new(persona: &MatcherPersona, task: impl Into<String>) -> Self {
        Self {
            role: persona.role.clone(),
            goal: persona.goal.clone(),
            backstory: persona.backstory.clone(),
            task: task.into(),
            expected_output: persona.expected_output.clone(),
        }
    }
}

/// External, non-deterministic text generator.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Produce text for `request`. Called at most once per pipeline run.
    async fn generate(&self, request: &CrewRequest) -> Result<String>;

    /// Model identifier, for diagnostics.
    fn model_name(&self) -> &str;
}

/// Collaborator backed by a chat-completion client.
pub struct LlmCollaborator {
    client: Arc<dyn LlmClient>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmCollaborator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build the configured backend and carry over its sampling settings.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = build_llm_client(config)?;
        Ok(Self::new(client)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn system_prompt(request: &CrewRequest) -> String {
        format!(
            "You are {}. {}\n\nYour personal goal is: {}",
            request.role, request.backstory, request.goal
        )
    }

    fn user_prompt(request: &CrewRequest) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}",
            request.task, request.expected_output
        )
    }

    fn build_llm_request(&self, request: &CrewRequest) -> LlmRequest {
        LlmRequest {
            system_prompt: Some(Self::system_prompt(request)),
            messages: vec![ChatMessage::user(Self::user_prompt(request))],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Collaborator for LlmCollaborator {
    async fn generate(&self, request: &CrewRequest) -> Result<String> {
        let llm_request = self.build_llm_request(request);
        let response = self.client.complete(llm_request).await?;

        debug!(
            model = %response.model,
            finish_reason = ?response.finish_reason,
            completion_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            "LLM completed"
        );

        if response.content.trim().is_empty() {
            warn!(model = %self.client.model_name(), "LLM returned an empty response");
            return Err(MatchmateError::Collaborator(
                "LLM returned an empty response".to_string(),
            ));
        }

        Ok(response.content)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
