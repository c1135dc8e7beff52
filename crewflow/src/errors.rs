//! Error types for the crewflow pipeline.
//!
//! Tool failures are absorbed close to where they happen (the fetch tool
//! returns a sentinel string, the search tool an empty list, the agent loop
//! reports tool errors back to the model as text). Everything that reaches
//! [`CrewflowError`] aborts the run and is reported verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for crewflow operations.
#[derive(Debug, Error)]
pub enum CrewflowError {
    /// The caller supplied unusable input (e.g. an empty topic).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed or validated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A stage failed; the run is aborted.
    #[error("Stage '{stage}' failed: {message}")]
    StageExecution {
        /// The failing stage.
        stage: String,
        /// The failure detail.
        message: String,
    },

    /// A model call failed.
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// The run was cancelled before a stage started.
    #[error("Pipeline cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrewflowError {
    /// Creates a stage execution error.
    #[must_use]
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageExecution {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CrewflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The model provider is not one of the supported values.
    #[error("Unknown model provider '{0}' (expected 'openai' or 'ollama')")]
    UnknownProvider(String),

    /// A value could not be parsed or is out of range.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Metadata about a validation error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-DUPLICATE-STAGE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Errors raised by model clients.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The provider answered with a non-success status.
    #[error("LLM API error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The request never produced a response.
    #[error("LLM request failed: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("LLM request timed out: {0}")]
    Timeout(String),

    /// The response body could not be decoded.
    #[error("Failed to decode LLM response: {0}")]
    Decode(String),

    /// The response had no usable choice.
    #[error("LLM returned no choices")]
    EmptyResponse,
}

impl LlmError {
    /// Whether a retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Decode(_) | Self::EmptyResponse => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors related to tool execution.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Tool was not found in the registry.
    #[error("Tool not found: {name}")]
    NotFound {
        /// The tool name.
        name: String,
    },

    /// The arguments did not match the tool's parameters.
    #[error("Invalid arguments for tool {name}: {reason}")]
    InvalidArguments {
        /// The tool name.
        name: String,
        /// What was wrong.
        reason: String,
    },

    /// Tool execution failed.
    #[error("Tool execution failed: {name} - {reason}")]
    ExecutionFailed {
        /// The tool name.
        name: String,
        /// The reason for failure.
        reason: String,
    },
}

impl ToolError {
    /// Creates a tool not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an execution failed error.
    #[must_use]
    pub fn execution_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_message() {
        let err = CrewflowError::stage("writing", "model returned an empty answer");
        assert_eq!(
            err.to_string(),
            "Stage 'writing' failed: model returned an empty answer"
        );
    }

    #[test]
    fn test_pipeline_validation_error_code() {
        let err = PipelineValidationError::new("Pipeline has no stages")
            .with_stages(vec!["a".to_string()])
            .with_error_info(ContractErrorInfo::new("PIPELINE-EMPTY", "empty"));

        assert_eq!(err.code(), Some("PIPELINE-EMPTY"));
        assert_eq!(err.stages, vec!["a".to_string()]);
    }

    #[test]
    fn test_llm_error_retryable() {
        assert!(LlmError::Http { status: 429, body: String::new() }.is_retryable());
        assert!(LlmError::Http { status: 503, body: String::new() }.is_retryable());
        assert!(!LlmError::Http { status: 401, body: String::new() }.is_retryable());
        assert!(LlmError::Timeout("slow".to_string()).is_retryable());
        assert!(!LlmError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("TEMPERATURE", "hot", "not a number");
        assert_eq!(err.to_string(), "Invalid value for TEMPERATURE: 'hot' (not a number)");
    }
}
