//! Turn-by-turn chat with a teacher persona.
//!
//! Each call sends the persona instruction, the most recent turns of the
//! caller's history, and the new user message. The caller keeps the full
//! history; only the outgoing request is truncated.

use tracing::{debug, warn};

use crate::api::generation::{ConversationTurn, GenerationClient, GenerationRequest};
use crate::api::retry::{RetryConfig, with_retry};
use crate::error::GenerationResult;

/// Default number of history turns sent with each request.
pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// Reply returned when the generation call fails for good.
pub const CHAT_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't answer right now. Please try again in a moment.";

/// The last `limit` turns of `history`, in original order.
pub fn recent_turns(history: &[ConversationTurn], limit: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(limit)..]
}

/// A chat front-end over a [`GenerationClient`].
#[derive(Clone)]
pub struct ChatSession {
    client: GenerationClient,
    retry: RetryConfig,
    history_turns: usize,
}

impl ChatSession {
    pub fn new(client: GenerationClient, retry: RetryConfig) -> Self {
        Self {
            client,
            retry,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }

    /// Set how many recent turns accompany each request.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn history_turns(&self) -> usize {
        self.history_turns
    }

    /// Reply to `message` as the persona. Never fails: a terminal error
    /// becomes [`CHAT_FAILURE_MESSAGE`].
    pub async fn chat(
        &self,
        persona_instruction: &str,
        message: &str,
        history: &[ConversationTurn],
    ) -> String {
        match self.try_chat(persona_instruction, message, history).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Chat failed: {e}");
                CHAT_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Reply to `message` as the persona, keeping the failure structured.
    pub async fn try_chat(
        &self,
        persona_instruction: &str,
        message: &str,
        history: &[ConversationTurn],
    ) -> GenerationResult {
        let recent = recent_turns(history, self.history_turns);
        debug!(
            "Chat request with {} of {} history turns",
            recent.len(),
            history.len()
        );
        let request =
            GenerationRequest::new(message, persona_instruction).with_history(recent.to_vec());
        with_retry(&self.retry, || self.client.generate(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::ScriptedGenerator;
    use crate::api::router::ModelChain;
    use crate::error::{FailureKind, GenerationError};
    use std::sync::Arc;
    use std::time::Duration;

    fn session(generator: &Arc<ScriptedGenerator>) -> ChatSession {
        ChatSession::new(
            GenerationClient::new(generator.clone(), ModelChain::single("m")),
            RetryConfig::with_retries(3).with_initial_delay(Duration::ZERO),
        )
    }

    fn history(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::user(format!("turn {i}"))
                } else {
                    ConversationTurn::assistant(format!("turn {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn recent_turns_keeps_tail() {
        let h = history(15);
        let recent = recent_turns(&h, 10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].text, "turn 5");
        assert_eq!(recent[9].text, "turn 14");
    }

    #[test]
    fn recent_turns_short_history_untouched() {
        let h = history(3);
        assert_eq!(recent_turns(&h, 10), h.as_slice());
        assert!(recent_turns(&h, 0).is_empty());
    }

    #[tokio::test]
    async fn sends_last_ten_turns_in_order() {
        let generator = Arc::new(ScriptedGenerator::replying("Inertia is..."));
        let full = history(15);

        let reply = session(&generator)
            .chat("You are a physics teacher.", "What is inertia?", &full)
            .await;

        assert_eq!(reply, "Inertia is...");
        let request = generator.last_request().unwrap();
        assert_eq!(request.history, full[5..].to_vec());
        assert_eq!(request.instruction, "You are a physics teacher.");
        assert_eq!(request.content, "What is inertia?");
        assert_eq!(full.len(), 15);
    }

    #[tokio::test]
    async fn custom_history_limit() {
        let generator = Arc::new(ScriptedGenerator::replying("ok"));
        session(&generator)
            .with_history_turns(2)
            .chat("p", "m", &history(6))
            .await;
        let request = generator.last_request().unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[1].text, "turn 5");
    }

    #[tokio::test]
    async fn terminal_failure_returns_apology() {
        let generator = Arc::new(ScriptedGenerator::new(|_, _| {
            Err(GenerationError::new(FailureKind::Unknown, "boom"))
        }));
        let reply = session(&generator).chat("p", "hello", &[]).await;
        assert_eq!(reply, CHAT_FAILURE_MESSAGE);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn overload_is_retried_before_apologizing() {
        let generator = Arc::new(ScriptedGenerator::new(|_, _| {
            Err(GenerationError::from_status(503, "high demand"))
        }));
        let result = session(&generator).try_chat("p", "hello", &[]).await;
        assert_eq!(result.unwrap_err().kind, FailureKind::ServerUnavailable);
        assert_eq!(generator.call_count(), 4);
    }
}
