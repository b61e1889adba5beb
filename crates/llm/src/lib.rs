//! LLM backends for the matching pipeline.
//!
//! The only backend is Gemini. It implements [`LlmClient`] and performs a
//! single HTTP round trip per call. Model and credentials come from
//! [`LlmConfig`].

pub mod client;
pub mod config;
pub mod gemini;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{build_llm_client, build_llm_client_with_key, LlmConfig};
pub use gemini::GeminiClient;
