//! Timeout and retry wrapper
//!
//! Each attempt runs under its own timeout. Retryable failures are attempted
//! again up to `max_retries` more times; anything else is returned at once.
//! A successful first attempt issues exactly one request.

use super::{Completion, CompletionRequest, LLMError, LLMProvider};
use async_trait::async_trait;
use std::time::Duration;

pub struct RetryingProvider<P> {
    inner: P,
    timeout: Duration,
    max_retries: u32,
}

impl<P: LLMProvider> RetryingProvider<P> {
    pub fn new(inner: P, timeout: Duration, max_retries: u32) -> Self {
        Self {
            inner,
            timeout,
            max_retries,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn attempt(&self, request: &CompletionRequest) -> super::Result<Completion> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout),
        }
    }
}

#[async_trait]
impl<P: LLMProvider> LLMProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn check_health(&self) -> bool {
        self.inner.check_health().await
    }

    async fn complete(&self, request: &CompletionRequest) -> super::Result<Completion> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            tracing::debug!(
                provider = self.inner.name(),
                attempt,
                timeout_secs = self.timeout.as_secs(),
                "Requesting completion"
            );

            match self.attempt(request).await {
                Ok(completion) => {
                    tracing::info!(provider = self.inner.name(), attempt, "Completion succeeded");
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        provider = self.inner.name(),
                        attempt,
                        "Completion failed, retrying: {}",
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        provider = self.inner.name(),
                        attempt,
                        "Completion failed: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}
