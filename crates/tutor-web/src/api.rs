//! REST API endpoint handlers.
//!
//! Every failure answers `{ "error": "..." }` with a display-ready message and
//! a status derived from the failure: configuration problems 500, bad input
//! 400, upstream rate limits 429, upstream overload 503.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tutor_rs::prelude::*;

/// Shared application state passed to all handlers via axum's `State` extractor.
///
/// Holds either a ready [`Tutor`] or the configuration error that prevented
/// building one, plus the config itself for `/api/status`.
#[derive(Clone)]
pub struct AppState {
    tutor: Result<Arc<Tutor>, ConfigError>,
    config: Arc<TutorConfig>,
}

impl AppState {
    /// Serve an already-built tutor.
    pub fn new(tutor: Tutor) -> Self {
        let config = Arc::new(tutor.config().clone());
        Self {
            tutor: Ok(Arc::new(tutor)),
            config,
        }
    }

    /// Build the tutor from `config`, keeping the error if that fails.
    pub fn from_config(config: TutorConfig) -> Self {
        let tutor = Tutor::from_config(config.clone()).map(Arc::new);
        if let Err(e) = &tutor {
            warn!("Tutor unconfigured, generation endpoints will fail: {e}");
        }
        Self {
            tutor,
            config: Arc::new(config),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.tutor.is_ok()
    }

    fn tutor(&self) -> Result<&Tutor, ApiError> {
        self.tutor.as_deref().map_err(ApiError::from)
    }
}

/// A failed request: status plus a display-ready message.
#[derive(Debug, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<&ConfigError> for ApiError {
    fn from(e: &ConfigError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.user_message().to_string(),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        let status = if e.status == Some(401) {
            StatusCode::UNAUTHORIZED
        } else {
            match e.kind {
                FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                FailureKind::ContentRejected => StatusCode::BAD_REQUEST,
                FailureKind::ServerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                FailureKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            }
        };
        Self {
            status,
            message: e.user_message().to_string(),
        }
    }
}

impl From<SummaryError> for ApiError {
    fn from(e: SummaryError) -> Self {
        match e {
            SummaryError::NothingToSummarize => Self::bad_request(e.user_message()),
            SummaryError::AllPartsFailed => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: e.user_message().to_string(),
            },
            SummaryError::Generation(inner) => inner.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: rejection.body_text(),
        }
    }
}

/// Successful generation response.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TextBody {
    pub text: String,
}

/// Request body for POST /api/summary.
#[derive(Deserialize, Debug)]
pub struct SummaryBody {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub specialty: String,
}

/// POST /api/summary: Build a topic index from documents.
///
/// Returns 200 `{ text }`, 400 when no document has content, 500 when every
/// chunk failed or the service is unconfigured.
pub async fn post_summary(
    State(app): State<AppState>,
    body: Result<Json<SummaryBody>, JsonRejection>,
) -> Result<Json<TextBody>, ApiError> {
    let Json(body) = body?;
    let tutor = app.tutor()?;
    debug!(
        "Summary request: {} document(s), specialty {:?}",
        body.documents.len(),
        body.specialty
    );
    let text = tutor
        .summarizer()
        .try_summarize(&body.documents, &body.specialty)
        .await
        .inspect_err(|e| warn!("Summary failed: {e}"))?;
    Ok(Json(TextBody { text }))
}

/// Request body for POST /api/chat.
///
/// Either a raw `instruction` or a structured `persona` must be given; a
/// non-blank `instruction` wins.
#[derive(Deserialize, Debug)]
pub struct ChatBody {
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub persona: Option<Persona>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

impl ChatBody {
    fn resolve_instruction(&self) -> Option<String> {
        self.instruction
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.persona.as_ref().map(Persona::instruction))
    }
}

/// POST /api/chat: One chat turn with a persona.
///
/// Returns 200 `{ text }`, or 400 when the message is blank or no persona
/// instruction is given.
pub async fn post_chat(
    State(app): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<TextBody>, ApiError> {
    let Json(body) = body?;
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("The message must not be empty."));
    }
    let Some(instruction) = body.resolve_instruction() else {
        return Err(ApiError::bad_request(
            "Provide either an instruction or a persona.",
        ));
    };
    let tutor = app.tutor()?;
    let text = tutor
        .session()
        .try_chat(&instruction, &body.message, &body.history)
        .await
        .inspect_err(|e| warn!("Chat failed: {e}"))?;
    Ok(Json(TextBody { text }))
}

/// Response body for GET /api/status.
#[derive(Serialize, Deserialize, Debug)]
pub struct StatusBody {
    pub configured: bool,
    pub models: Vec<String>,
    pub chunk_size: usize,
    pub history_turns: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/status: Whether generation is available and with which settings.
pub async fn get_status(State(app): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        configured: app.is_configured(),
        models: app.config.models.to_vec(),
        chunk_size: app.config.chunk_size,
        history_turns: app.config.history_turns,
        error: app.tutor.as_ref().err().map(|e| e.user_message().to_string()),
    })
}
