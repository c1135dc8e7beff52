//! In-process clients for tests and dry runs.

use super::client::{LlmClient, LlmRequest, LlmResponse};
use crate::errors::LlmError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays queued responses in order and records every request.
///
/// Once the queue is drained each call fails with
/// [`LlmError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedLlm {
    model: String,
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    /// Creates an empty script.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Appends a response.
    #[must_use]
    pub fn with_response(self, response: LlmResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Appends a plain text response.
    #[must_use]
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_response(LlmResponse::text(content))
    }

    /// Appends an error.
    #[must_use]
    pub fn with_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    /// Appends a result after construction.
    pub fn push(&self, result: Result<LlmResponse, LlmError>) {
        self.responses.lock().push_back(result);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    /// Number of queued results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().push(request);
        let next = self.responses.lock().pop_front();
        next.unwrap_or(Err(LlmError::EmptyResponse))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Answers every request with its last user message. Never calls tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoLlm;

#[async_trait]
impl LlmClient for EchoLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let content = request.last_user_message().unwrap_or_default().to_string();
        Ok(LlmResponse {
            model: "echo".to_string(),
            ..LlmResponse::text(content)
        })
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[tokio::test]
    async fn test_scripted_replays_in_order_then_runs_dry() {
        let llm = ScriptedLlm::new("scripted")
            .with_text("one")
            .with_error(LlmError::Timeout("slow".to_string()));

        let first = llm.complete(LlmRequest::default()).await.unwrap();
        assert_eq!(first.content, "one");
        assert!(matches!(
            llm.complete(LlmRequest::default()).await,
            Err(LlmError::Timeout(_))
        ));
        assert!(matches!(
            llm.complete(LlmRequest::default()).await,
            Err(LlmError::EmptyResponse)
        ));
        assert_eq!(llm.requests().len(), 3);
        assert_eq!(llm.remaining(), 0);
        assert_eq!(llm.model_name(), "scripted");
    }

    #[tokio::test]
    async fn test_echo_returns_last_user_message() {
        let request = LlmRequest::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("topic: rust"),
        ]);
        let response = EchoLlm.complete(request).await.unwrap();
        assert_eq!(response.content, "topic: rust");
        assert_eq!(response.model, "echo");
    }
}
