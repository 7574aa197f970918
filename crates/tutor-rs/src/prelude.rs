//! Convenience re-exports for common `tutor-rs` types.
//!
//! ```ignore
//! use tutor_rs::prelude::*;
//! ```
//!
//! Pulls in the service facade, configuration, the generation seam, and the
//! summarizer and chat types. Wire-level types (`ChatRequest`, `Message`) and
//! the chunker live in their modules.

// ── Service ─────────────────────────────────────────────────────────
pub use crate::Tutor;
pub use crate::config::TutorConfig;
pub use crate::error::{ConfigError, FailureKind, GenerationError, GenerationResult, SummaryError};

// ── Generation ──────────────────────────────────────────────────────
pub use crate::OpenRouterClient;
pub use crate::api::{
    ConversationTurn, GenerationClient, GenerationRequest, ModelChain, RetryConfig, TextGenerator,
    TurnRole, with_retry,
};

// ── Summaries and chat ──────────────────────────────────────────────
pub use crate::agent::{ChatSession, Persona};
pub use crate::context::{Document, Summarizer, SummarizerConfig};
