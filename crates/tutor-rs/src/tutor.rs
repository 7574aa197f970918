//! Service facade bundling the summarizer and chat session.

use std::sync::Arc;

use tracing::info;

use crate::OpenRouterClient;
use crate::agent::session::ChatSession;
use crate::api::generation::{GenerationClient, TextGenerator};
use crate::config::TutorConfig;
use crate::context::summarizer::Summarizer;
use crate::error::ConfigError;

/// A configured tutor service: one [`Summarizer`] and one [`ChatSession`]
/// sharing a [`GenerationClient`].
///
/// Both halves own no per-run state, so one `Tutor` can serve concurrent
/// summaries and chats.
#[derive(Clone)]
pub struct Tutor {
    summarizer: Summarizer,
    session: ChatSession,
    config: TutorConfig,
}

impl Tutor {
    /// Build a tutor over any [`TextGenerator`] backend.
    pub fn new(config: TutorConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let client = GenerationClient::new(generator, config.models.clone());
        let summarizer = Summarizer::new(client.clone(), config.summarizer_config());
        let session =
            ChatSession::new(client, config.retry.clone()).with_history_turns(config.history_turns);
        Self {
            summarizer,
            session,
            config,
        }
    }

    /// Validate `config` and build a tutor over the OpenRouter API.
    ///
    /// Fails with [`ConfigError::MissingApiKey`] before any network activity
    /// when no key is configured.
    pub fn from_config(config: TutorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = OpenRouterClient::new(config.require_api_key()?)?
            .with_generation_params(config.max_tokens, config.temperature);
        info!(
            "Tutor configured with {} model(s), primary {}",
            config.models.len(),
            config.models.primary().unwrap_or("(none)")
        );
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }
}
