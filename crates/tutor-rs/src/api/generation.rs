//! Generation requests and the [`TextGenerator`] seam.
//!
//! A [`GenerationRequest`] is the (content, instruction, history) tuple sent
//! to the text-generation capability. [`TextGenerator`] is the one-call
//! interface any backend implements; [`GenerationClient`] layers the ordered
//! model fallback on top of it.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::router::ModelChain;
use crate::OpenRouterClient;
use crate::error::{FailureKind, GenerationError, GenerationResult};

/// Who authored a conversation turn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of a conversation. Immutable once created.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

/// Input to a single generation call. Built fresh per call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub content: String,
    pub instruction: String,
    pub history: Vec<ConversationTurn>,
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            instruction: instruction.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}

/// A backend that turns one request into text with one model, in one round trip.
///
/// Uses a boxed future so the trait stays dyn-compatible.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, GenerationResult>;
}

impl TextGenerator for OpenRouterClient {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, GenerationResult> {
        self.complete(model, request).boxed()
    }
}

/// Sends requests through a [`TextGenerator`], falling back across models.
///
/// Models are tried in preference order. The first success wins. A
/// [`FailureKind::ContentRejected`] failure stops the walk at once, since the
/// rejection is about the input rather than the model. When every model
/// fails, the last failure is returned.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    models: ModelChain,
}

impl GenerationClient {
    pub fn new(generator: Arc<dyn TextGenerator>, models: ModelChain) -> Self {
        Self { generator, models }
    }

    pub fn models(&self) -> &ModelChain {
        &self.models
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let mut last_error = None;
        for model in self.models.iter() {
            match self.generator.generate(model, request).await {
                Ok(text) => {
                    debug!("Model {model} produced {} chars", text.chars().count());
                    return Ok(text);
                }
                Err(e) if e.kind == FailureKind::ContentRejected => {
                    warn!("Model {model} rejected the content; not trying other models: {e}");
                    return Err(e);
                }
                Err(e) => {
                    warn!("Model {model} failed: {e}");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| GenerationError::new(FailureKind::Unknown, "no models configured")))
    }
}
