//! Failure taxonomy for generation calls, configuration, and summarization.
//!
//! Every error type carries a `user_message()`: a short display-ready string
//! for the chat or summary panel. Raw vendor bodies stay in the `message`
//! field for logs only.

use thiserror::Error;

/// Classified reason a generation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429 or a rate/quota marker in the error message.
    RateLimited,
    /// HTTP 400/403 or a content-safety marker. Retrying the same input won't help.
    ContentRejected,
    /// HTTP 503, "unavailable", "high demand", or a transport timeout.
    ServerUnavailable,
    /// Anything else.
    Unknown,
}

impl FailureKind {
    /// Whether reattempting the same request may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::ServerUnavailable)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::RateLimited => write!(f, "rate limited"),
            FailureKind::ContentRejected => write!(f, "content rejected"),
            FailureKind::ServerUnavailable => write!(f, "server unavailable"),
            FailureKind::Unknown => write!(f, "unknown failure"),
        }
    }
}

const RATE_MARKERS: &[&str] = &[
    "rate limit",
    "rate-limit",
    "ratelimit",
    "quota",
    "resource_exhausted",
    "resource exhausted",
    "too many requests",
];

const REJECTION_MARKERS: &[&str] = &[
    "safety",
    "blocked",
    "content policy",
    "content_filter",
    "moderation",
    "prohibited",
];

const UNAVAILABLE_MARKERS: &[&str] = &["unavailable", "high demand", "overloaded"];

/// Classify a failure from its HTTP status (if any) and message text.
///
/// Rules are checked in order: rate limiting, content rejection, server
/// unavailability. The first match wins.
pub fn classify(status: Option<u16>, message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if status == Some(429) || has(RATE_MARKERS) {
        FailureKind::RateLimited
    } else if matches!(status, Some(400 | 403)) || has(REJECTION_MARKERS) {
        FailureKind::ContentRejected
    } else if status == Some(503) || has(UNAVAILABLE_MARKERS) {
        FailureKind::ServerUnavailable
    } else {
        FailureKind::Unknown
    }
}

/// A failed generation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: FailureKind,
    pub message: String,
    /// Upstream HTTP status, when the failure came from a response.
    pub status: Option<u16>,
}

impl GenerationError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Build an error from an upstream HTTP status and body, classifying it.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            kind: classify(Some(status), &body),
            message: format!("HTTP {status}: {body}"),
            status: Some(status),
        }
    }

    /// Build an error from a message with no HTTP status attached.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(None, &message),
            message,
            status: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Display-ready message for the end user.
    pub fn user_message(&self) -> &'static str {
        if self.status == Some(401) {
            return "The AI service rejected the configured API key.";
        }
        match self.kind {
            FailureKind::RateLimited => {
                "The AI service is receiving too many requests. Please wait a moment and try again."
            }
            FailureKind::ContentRejected => {
                "The AI service declined to process this content. Try rephrasing or using different material."
            }
            FailureKind::ServerUnavailable => {
                "The AI service is temporarily unavailable due to high demand. Please try again shortly."
            }
            FailureKind::Unknown => "Something went wrong while contacting the AI service.",
        }
    }
}

/// Shorthand for the outcome of one generation call.
pub type GenerationResult = Result<String, GenerationError>;

/// Invalid or missing configuration. Never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured (set TUTOR_API_KEY or OPENROUTER_KEY)")]
    MissingApiKey,
    #[error("no models configured")]
    NoModels,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::MissingApiKey => "The AI service is not configured: no API key is set.",
            _ => "The AI service is not configured correctly.",
        }
    }
}

/// Terminal outcome of a summarization run that produced no summary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no document has any content")]
    NothingToSummarize,
    #[error("every chunk failed to summarize")]
    AllPartsFailed,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl SummaryError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SummaryError::NothingToSummarize => {
                "There is nothing to summarize: none of the files contain readable text."
            }
            SummaryError::AllPartsFailed => {
                "Could not generate a summary: all parts of the material failed to process."
            }
            SummaryError::Generation(e) => e.user_message(),
        }
    }
}
