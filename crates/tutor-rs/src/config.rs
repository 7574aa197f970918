//! Service configuration read from the environment.
//!
//! [`TutorConfig`] is built once at startup and handed to
//! [`Tutor::from_config`](crate::Tutor::from_config); nothing reads the
//! environment after that. Parsing goes through [`TutorConfig::from_lookup`]
//! so tests can feed variables without touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use crate::agent::session::DEFAULT_HISTORY_TURNS;
use crate::api::retry::RetryConfig;
use crate::api::router::ModelChain;
use crate::context::chunker::DEFAULT_CHUNK_SIZE;
use crate::context::summarizer::{DEFAULT_CHUNK_DELAY, SummarizerConfig};
use crate::error::ConfigError;

pub const ENV_API_KEY: &str = "TUTOR_API_KEY";
/// Accepted when [`ENV_API_KEY`] is unset.
pub const ENV_API_KEY_FALLBACK: &str = "OPENROUTER_KEY";
pub const ENV_MODELS: &str = "TUTOR_MODELS";
pub const ENV_MAX_RETRIES: &str = "TUTOR_MAX_RETRIES";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "TUTOR_RETRY_BASE_DELAY_MS";
pub const ENV_CHUNK_SIZE: &str = "TUTOR_CHUNK_SIZE";
pub const ENV_CHUNK_DELAY_MS: &str = "TUTOR_CHUNK_DELAY_MS";
pub const ENV_HISTORY_TURNS: &str = "TUTOR_HISTORY_TURNS";
pub const ENV_LANGUAGE: &str = "TUTOR_LANGUAGE";
pub const ENV_MAX_TOKENS: &str = "TUTOR_MAX_TOKENS";
pub const ENV_TEMPERATURE: &str = "TUTOR_TEMPERATURE";

/// Everything the tutor service needs to run.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// API key for the generation capability. `None` leaves the service unconfigured.
    pub api_key: Option<String>,
    /// Models in preference order.
    pub models: ModelChain,
    /// Retry policy for every generation call.
    pub retry: RetryConfig,
    /// Maximum characters per summarization chunk. Default: 80 000.
    pub chunk_size: usize,
    /// Pause between consecutive chunk calls. Default: 2s.
    pub chunk_delay: Duration,
    /// History turns sent with each chat request. Default: 10.
    pub history_turns: usize,
    /// Target language for summaries.
    pub language: Option<String>,
    /// Max tokens per response. Default: 8192.
    pub max_tokens: u32,
    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: ModelChain::default(),
            retry: RetryConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
            history_turns: DEFAULT_HISTORY_TURNS,
            language: None,
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

impl TutorConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, starting from the defaults.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));
        if let Some(models) = get(ENV_MODELS) {
            config.models = ModelChain::parse(&models);
        }
        if let Some(v) = get(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse(ENV_MAX_RETRIES, &v)?;
        }
        if let Some(v) = get(ENV_RETRY_BASE_DELAY_MS) {
            config.retry.initial_delay =
                Duration::from_millis(parse(ENV_RETRY_BASE_DELAY_MS, &v)?);
        }
        if let Some(v) = get(ENV_CHUNK_SIZE) {
            config.chunk_size = parse(ENV_CHUNK_SIZE, &v)?;
        }
        if let Some(v) = get(ENV_CHUNK_DELAY_MS) {
            config.chunk_delay = Duration::from_millis(parse(ENV_CHUNK_DELAY_MS, &v)?);
        }
        if let Some(v) = get(ENV_HISTORY_TURNS) {
            config.history_turns = parse(ENV_HISTORY_TURNS, &v)?;
        }
        if let Some(v) = get(ENV_MAX_TOKENS) {
            config.max_tokens = parse(ENV_MAX_TOKENS, &v)?;
        }
        if let Some(v) = get(ENV_TEMPERATURE) {
            config.temperature = parse(ENV_TEMPERATURE, &v)?;
        }
        config.language = get(ENV_LANGUAGE).map(|l| l.trim().to_string());

        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make every call fail, except the API key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_CHUNK_SIZE.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// The API key, or [`ConfigError::MissingApiKey`].
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Summarizer settings derived from this config.
    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig {
            chunk_size: self.chunk_size,
            chunk_delay: self.chunk_delay,
            retry: self.retry.clone(),
            language: self.language.clone(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_models(mut self, models: ModelChain) -> Self {
        self.models = models;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
