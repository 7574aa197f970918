//! Study-tutor backend: persona chat and map-reduce document summaries on top
//! of an LLM chat-completions API.
//!
//! `tutor-rs` is the engine behind a personal study app. Users create AI
//! "teacher" personas, chat with them, and attach reference material that is
//! condensed into a topic index. All persistence lives on the client; this
//! crate only talks to the generation capability.
//!
//! # Getting started
//!
//! ```ignore
//! use tutor_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ConfigError> {
//!     let config = TutorConfig::from_env()?;
//!     let tutor = Tutor::from_config(config)?;
//!
//!     let docs = vec![Document::new("chapter1.pdf", "Newton's laws ...")];
//!     println!("{}", tutor.summarizer().summarize(&docs, "Physics").await);
//!
//!     let reply = tutor
//!         .session()
//!         .chat("You are a patient physics teacher.", "What is inertia?", &[])
//!         .await;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | [`TextGenerator`](api::TextGenerator) seam, model fallback, retry with backoff, test double |
//! | [`context`] | Fixed-size chunking and the map-reduce [`Summarizer`](context::Summarizer) |
//! | [`agent`] | [`ChatSession`](agent::ChatSession), [`Persona`](agent::Persona), instruction builder |
//! | [`config`] | [`TutorConfig`](config::TutorConfig) read from the environment |
//! | [`error`] | Failure taxonomy and display-ready messages |

pub mod agent;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod prelude;
pub mod tutor;

pub use error::{ConfigError, FailureKind, GenerationError, GenerationResult, SummaryError};
pub use tutor::Tutor;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use api::generation::{GenerationRequest, TurnRole};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Models tried in order when none are configured.
pub const DEFAULT_MODELS: &[&str] = &["google/gemini-2.5-flash", "google/gemini-2.0-flash-001"];

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the outgoing conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Lay out a generation request as chat messages: instruction as the system
/// message, then the history in order, then the new content as a user turn.
pub fn request_messages(request: &GenerationRequest) -> Vec<Message> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    if !request.instruction.is_empty() {
        messages.push(Message::system(&request.instruction));
    }
    messages.extend(request.history.iter().map(|turn| match turn.role {
        TurnRole::User => Message::user(&turn.text),
        TurnRole::Assistant => Message::assistant(&turn.text),
    }));
    messages.push(Message::user(&request.content));
    messages
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Turn a decoded response body into generated text or a classified failure.
fn completion_text(parsed: RawChatResponse) -> GenerationResult {
    if let Some(err) = parsed.error {
        let code = err
            .code
            .as_ref()
            .and_then(|c| c.as_u64().or_else(|| c.as_str()?.parse().ok()))
            .and_then(|c| u16::try_from(c).ok());
        return Err(match code {
            Some(status) => GenerationError::from_status(status, err.message),
            None => GenerationError::from_message(err.message),
        });
    }

    let choice = parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| GenerationError::new(FailureKind::Unknown, "response had no choices"))?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(GenerationError::new(
            FailureKind::ContentRejected,
            "response stopped by content filter",
        ));
    }

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::new(
            FailureKind::Unknown,
            "response contained no text",
        )),
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenRouter chat completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent("tutor-rs/0.1")
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: OPENROUTER_URL.to_string(),
            max_tokens: 0,
            temperature: 0.0,
        })
    }

    /// Point the client at a different chat-completions endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set generation parameters sent with every request (0 = provider default).
    pub fn with_generation_params(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Send one generation request to one model.
    pub async fn complete(&self, model: &str, request: &GenerationRequest) -> GenerationResult {
        let body = ChatRequest {
            model: model.to_string(),
            messages: request_messages(request),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        debug!(
            "LLM request: model={}, messages={}, content_chars={}",
            model,
            body.messages.len(),
            request.content.chars().count(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::from_status(status.as_u16(), text));
        }

        let parsed: RawChatResponse = serde_json::from_str(&text).map_err(|e| {
            GenerationError::new(FailureKind::Unknown, format!("failed to parse response: {e}"))
        })?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        completion_text(parsed)
    }
}

/// Timeouts and connection failures are transient; anything else is unknown.
fn transport_error(e: reqwest::Error) -> GenerationError {
    let kind = if e.is_timeout() || e.is_connect() {
        FailureKind::ServerUnavailable
    } else {
        FailureKind::Unknown
    };
    GenerationError::new(kind, format!("request failed: {e}"))
}
