//! LLM Provider Abstraction Layer
//!
//! The advisor talks to the remote completion service through the
//! `LLMProvider` trait. `OpenAICompatibleProvider` speaks the
//! `/chat/completions` protocol (Groq, OpenAI and compatible gateways), and
//! `RetryingProvider` wraps any provider with a per-attempt timeout and a
//! bounded number of retries.

use crate::config::LLMConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use sdk::errors::AdvisorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub mod openai;
pub mod retry;

pub use openai::OpenAICompatibleProvider;
pub use retry::RetryingProvider;

/// Sampling temperature used for every completion
pub const SAMPLING_TEMPERATURE: f32 = 0.2;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LLMError {
    /// Transient failures worth another attempt.
    ///
    /// Credential and request errors never are: repeating them gives the
    /// same answer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_)
                | Self::RateLimitExceeded
                | Self::NetworkError(_)
                | Self::Timeout
        )
    }
}

impl From<LLMError> for AdvisorError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::AuthenticationFailed(msg) => AdvisorError::Authentication(msg),
            LLMError::Timeout => AdvisorError::RemoteTimeout,
            other => AdvisorError::RemoteService(other.to_string()),
        }
    }
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// Everything needed to reach the completion service.
///
/// Built once at startup from the `[llm]` config section and the resolved
/// credential, then handed to the provider.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl CompletionSettings {
    pub fn from_config(config: &LLMConfig, api_key: SecretString) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
        }
    }
}

/// Build the provider the advisor uses: an OpenAI-compatible client
/// wrapped with per-attempt timeouts and retries.
pub fn build_provider(settings: &CompletionSettings) -> Result<Arc<dyn LLMProvider>> {
    let provider = OpenAICompatibleProvider::new(settings)?;
    Ok(Arc::new(RetryingProvider::new(
        provider,
        settings.timeout,
        settings.max_retries,
    )))
}

/// A chat completion request, serialized as the request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

impl CompletionRequest {
    /// A request carrying `prompt` as its only user message
    pub fn single_user_message(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(prompt)],
            temperature: SAMPLING_TEMPERATURE,
        }
    }
}

/// The text of the first choice of a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            finish_reason: None,
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "groq", "openai")
    fn name(&self) -> &str;

    /// Send one completion request.
    ///
    /// # Returns
    /// * `Ok(Completion)` - The first choice's message content
    /// * `Err(LLMError)` - If the request fails
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Check if the provider is currently healthy and available
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}
