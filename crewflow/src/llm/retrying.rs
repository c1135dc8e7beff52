//! Retry decorator for any [`LlmClient`].

use super::client::{LlmClient, LlmRequest, LlmResponse};
use crate::errors::LlmError;
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Retries transient failures of the wrapped client.
///
/// Rate limits, 5xx, transport errors and timeouts are retried. Other
/// errors are returned at once.
#[derive(Clone)]
pub struct RetryingClient {
    inner: Arc<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingClient {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The retry policy.
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("model", &self.inner.model_name())
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl LlmClient for RetryingClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        with_retry(
            &self.config,
            self.inner.model_name(),
            LlmError::is_retryable,
            || self.inner.complete(request.clone()),
        )
        .await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
