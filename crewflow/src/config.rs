//! Run configuration.
//!
//! Everything a run needs is carried in an explicit [`CrewConfig`]. It can be
//! read from the process environment once ([`CrewConfig::from_env`]) or built
//! from any key lookup ([`CrewConfig::from_lookup`]); nothing downstream reads
//! environment variables.

use crate::core::DEFAULT_OUTPUT_DIR;
use crate::errors::ConfigError;
use crate::retry::RetryConfig;
use crate::websearch::{FetchConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default OpenAI API base.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Ollama OpenAI-compatible API base.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
/// Default bound on model calls per agent turn.
pub const DEFAULT_MAX_AGENT_ITERATIONS: usize = 8;
/// Highest accepted temperature.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Environment variable names.
pub mod env {
    /// `openai` or `ollama`.
    pub const MODEL_PROVIDER: &str = "MODEL_PROVIDER";
    /// Model used with OpenAI.
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    /// Model used with Ollama.
    pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
    /// Completion token budget.
    pub const MAX_TOKENS: &str = "MAX_TOKENS";
    /// Sampling temperature.
    pub const TEMPERATURE: &str = "TEMPERATURE";
    /// OpenAI API key.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// OpenAI API base override.
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Ollama API base override.
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
    /// Artifact root directory.
    pub const OUTPUT_DIR: &str = "CREWFLOW_OUTPUT_DIR";
}

/// Which model backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI's hosted API.
    #[default]
    OpenAi,
    /// A local Ollama server through its OpenAI-compatible endpoint.
    Ollama,
}

impl ModelProvider {
    /// The identifier used in config and forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    /// Model backend.
    pub provider: ModelProvider,
    /// Model used with OpenAI.
    pub openai_model: String,
    /// Model used with Ollama.
    pub ollama_model: String,
    /// Completion token budget per model call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// OpenAI API key.
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    /// OpenAI API base.
    pub openai_base_url: String,
    /// Ollama API base.
    pub ollama_base_url: String,
    /// Artifact root directory.
    pub output_dir: PathBuf,
    /// Bound on model calls per agent turn.
    pub max_agent_iterations: usize,
    /// Retry policy for model calls.
    pub llm_retry: RetryConfig,
    /// Page fetch settings.
    pub fetch: FetchConfig,
    /// Search settings.
    pub search: SearchConfig,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_agent_iterations: DEFAULT_MAX_AGENT_ITERATIONS,
            llm_retry: RetryConfig::default(),
            fetch: FetchConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl CrewConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unknown providers or unusable numbers.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from a key lookup. Missing or blank keys keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unknown providers or unusable numbers.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(provider) = get(env::MODEL_PROVIDER) {
            config.provider = provider.parse()?;
        }
        if let Some(model) = get(env::OPENAI_MODEL) {
            config.openai_model = model;
        }
        if let Some(model) = get(env::OLLAMA_MODEL) {
            config.ollama_model = model;
        }
        if let Some(raw) = get(env::MAX_TOKENS) {
            config.max_tokens = raw
                .parse()
                .map_err(|_| ConfigError::invalid(env::MAX_TOKENS, &raw, "not a positive integer"))?;
        }
        if let Some(raw) = get(env::TEMPERATURE) {
            config.temperature = raw
                .parse()
                .map_err(|_| ConfigError::invalid(env::TEMPERATURE, &raw, "not a number"))?;
        }
        config.openai_api_key = get(env::OPENAI_API_KEY);
        if let Some(url) = get(env::OPENAI_BASE_URL) {
            config.openai_base_url = url;
        }
        if let Some(url) = get(env::OLLAMA_BASE_URL) {
            config.ollama_base_url = url;
        }
        if let Some(dir) = get(env::OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid(env::MAX_TOKENS, "0", "must be at least 1"));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                env::TEMPERATURE,
                self.temperature.to_string(),
                "must be between 0.0 and 2.0",
            ));
        }
        if self.max_agent_iterations == 0 {
            return Err(ConfigError::invalid(
                "max_agent_iterations",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// The model name for the selected provider.
    #[must_use]
    pub fn model(&self) -> &str {
        match self.provider {
            ModelProvider::OpenAi => &self.openai_model,
            ModelProvider::Ollama => &self.ollama_model,
        }
    }

    /// The API base for the selected provider, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        let url = match self.provider {
            ModelProvider::OpenAi => &self.openai_base_url,
            ModelProvider::Ollama => &self.ollama_base_url,
        };
        url.trim_end_matches('/')
    }

    /// The API key to send, if any. Ollama needs none.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            ModelProvider::OpenAi => self.openai_api_key.as_deref(),
            ModelProvider::Ollama => None,
        }
    }

    /// Sets the provider.
    #[must_use]
    pub const fn with_provider(mut self, provider: ModelProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the model of the selected provider.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        match self.provider {
            ModelProvider::OpenAi => self.openai_model = model.into(),
            ModelProvider::Ollama => self.ollama_model = model.into(),
        }
        self
    }

    /// Sets the artifact root directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
