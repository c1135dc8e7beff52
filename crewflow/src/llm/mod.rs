//! Model access.
//!
//! All agents talk to a model through the [`LlmClient`] trait. The only
//! network implementation speaks the OpenAI chat-completions protocol, which
//! both OpenAI and Ollama's `/v1` endpoint understand.

mod client;
mod mock;
mod openai;
mod retrying;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use mock::{EchoLlm, ScriptedLlm};
pub use openai::{OpenAiCompatibleClient, DEFAULT_LLM_TIMEOUT};
pub use retrying::RetryingClient;

use crate::config::{CrewConfig, ModelProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the client described by `config`, wrapped in its retry policy.
#[must_use]
pub fn build_llm_client(config: &CrewConfig) -> Arc<dyn LlmClient> {
    if config.provider == ModelProvider::OpenAi && config.api_key().is_none() {
        warn!("OPENAI_API_KEY is not set; requests will be sent without credentials");
    }

    info!(
        provider = %config.provider,
        model = config.model(),
        base_url = config.base_url(),
        "Using model"
    );

    let inner: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::new(
        config.base_url(),
        config.model(),
        config.api_key().map(str::to_string),
    ));

    if config.llm_retry.max_retries == 0 {
        inner
    } else {
        Arc::new(RetryingClient::new(inner, config.llm_retry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_uses_provider_model() {
        let config = CrewConfig::default().with_provider(ModelProvider::Ollama);
        assert_eq!(build_llm_client(&config).model_name(), "llama3.1:8b");

        let config = CrewConfig::default().with_model("gpt-4.1");
        assert_eq!(build_llm_client(&config).model_name(), "gpt-4.1");
    }
}
