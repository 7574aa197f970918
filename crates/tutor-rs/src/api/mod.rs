//! Generation layer: the backend seam, model fallback, and retry.
//!
//! - [`generation`]: [`GenerationRequest`], the [`TextGenerator`] trait, and
//!   [`GenerationClient`], which walks a [`ModelChain`] until a model answers.
//! - [`router`]: [`ModelChain`], the ordered model preference list.
//! - [`retry`]: bounded exponential backoff for rate-limit and overload
//!   failures. Never retries content rejections.
//! - [`mock`]: [`ScriptedGenerator`](mock::ScriptedGenerator), a recording
//!   test double.

pub mod generation;
pub mod mock;
pub mod retry;
pub mod router;

// Re-export commonly used items at the module level.
pub use generation::{
    ConversationTurn, GenerationClient, GenerationRequest, TextGenerator, TurnRole,
};
pub use retry::{RetryConfig, with_retry};
pub use router::ModelChain;
