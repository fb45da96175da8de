//! Advisor handle
//!
//! Transports (the web form, the CLI) never see the engine's internals. They
//! receive an `AdvisorHandle` and can only submit requests through it.

use crate::errors::AdvisorError;
use crate::types::{Advice, AdvisoryRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Handle for advisor operations
///
/// Cheap to clone; all clones share the same implementation.
#[derive(Clone)]
pub struct AdvisorHandle {
    inner: Arc<dyn AdvisorHandleImpl>,
}

impl AdvisorHandle {
    /// Create a new AdvisorHandle with the given implementation
    pub fn new(inner: Arc<dyn AdvisorHandleImpl>) -> Self {
        Self { inner }
    }

    /// Answer a request. Implementations validate the request themselves.
    pub async fn advise(&self, request: AdvisoryRequest) -> Result<Advice, AdvisorError> {
        self.inner.advise(request).await
    }
}

/// Trait for advisor handle implementation (implemented by the engine)
#[async_trait]
pub trait AdvisorHandleImpl: Send + Sync {
    /// Answer a single request
    async fn advise(&self, request: AdvisoryRequest) -> Result<Advice, AdvisorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl AdvisorHandleImpl for Echo {
        async fn advise(&self, request: AdvisoryRequest) -> Result<Advice, AdvisorError> {
            request.validate()?;
            Ok(Advice::new(request.question, vec![]))
        }
    }

    #[tokio::test]
    async fn test_handle_delegates_to_impl() {
        let handle = AdvisorHandle::new(Arc::new(Echo));
        let advice = handle
            .advise(AdvisoryRequest::new("blight"))
            .await
            .unwrap();
        assert_eq!(advice.answer, "blight");

        let err = handle.advise(AdvisoryRequest::new("")).await.unwrap_err();
        assert!(matches!(err, AdvisorError::EmptyQuestion));
    }
}
