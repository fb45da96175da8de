use super::{Completion, CompletionRequest, CompletionSettings, LLMError, LLMProvider};
use crate::secrets::{self, SecretString};
use async_trait::async_trait;
use serde::Deserialize;

/// Provider for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAICompatibleProvider {
    name: String,
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAICompatibleProvider {
    /// Build a provider from the startup settings.
    ///
    /// The HTTP client's own timeout matches the configured request timeout;
    /// `RetryingProvider` enforces the same bound around each attempt.
    pub fn new(settings: &CompletionSettings) -> super::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LLMError::ProviderUnavailable(e.to_string()))?;

        Ok(Self::with_client(
            &settings.base_url,
            settings.api_key.clone(),
            client,
        ))
    }

    pub fn with_client(base_url: &str, api_key: SecretString, client: reqwest::Client) -> Self {
        Self {
            name: provider_name(base_url),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// "groq" for api.groq.com, the host name otherwise
fn provider_name(base_url: &str) -> String {
    let host = base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();

    if host.ends_with("groq.com") {
        "groq".to_string()
    } else if host.ends_with("openai.com") {
        "openai".to_string()
    } else {
        host.to_string()
    }
}

fn map_status(status: reqwest::StatusCode, body: &str) -> LLMError {
    let body = secrets::scrub(body);
    match status.as_u16() {
        401 | 403 => LLMError::AuthenticationFailed(body),
        429 => LLMError::RateLimitExceeded,
        s if s >= 500 => LLMError::ProviderUnavailable(format!("HTTP {}: {}", s, body)),
        _ => LLMError::InvalidRequest(body),
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Lists the models with the configured key; any 2xx counts as healthy
    async fn check_health(&self) -> bool {
        if self.api_key.is_empty() {
            return false;
        }

        match self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", self.api_key.bearer())
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    tracing::debug!(
                        "Health check for {} returned {}",
                        self.name,
                        response.status()
                    );
                }
                healthy
            }
            Err(e) => {
                tracing::debug!(
                    "Health check for {} failed: {}",
                    self.name,
                    secrets::scrub(&e.to_string())
                );
                false
            }
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> super::Result<Completion> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", self.api_key.bearer())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(secrets::scrub(&e.to_string()))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(map_status(status, &text));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))?;

        Ok(Completion {
            text,
            model: data.model,
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name_from_base_url() {
        assert_eq!(provider_name("https://api.groq.com/openai/v1"), "groq");
        assert_eq!(provider_name("https://api.openai.com/v1"), "openai");
        assert_eq!(provider_name("http://127.0.0.1:8080/v1"), "127.0.0.1");
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;

        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "bad key"),
            LLMError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, ""),
            LLMError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, ""),
            LLMError::RateLimitExceeded
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, ""),
            LLMError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, "model not found"),
            LLMError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_error_bodies_are_scrubbed() {
        let body = "invalid key gsk_abcdefghijklmnopqrstuvwxyz0123";
        match map_status(reqwest::StatusCode::UNAUTHORIZED, body) {
            LLMError::AuthenticationFailed(msg) => {
                assert!(!msg.contains("gsk_abcdefghijklmnopqrstuvwxyz0123"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAICompatibleProvider::with_client(
            "https://api.groq.com/openai/v1/",
            SecretString::new("key"),
            reqwest::Client::new(),
        );
        assert_eq!(
            provider.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(provider.name(), "groq");
    }
}
