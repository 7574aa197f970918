//! Conversation layer: chat sessions, teacher personas, and instruction building.
//!
//! - [`session`]: [`ChatSession`] sends a persona instruction, the last N
//!   turns of history, and the new message through the retry-wrapped client.
//! - [`persona`]: [`Persona`] renders a teacher description (specialty,
//!   style, language, reference index) into an instruction.
//! - [`prompt`]: [`InstructionBuilder`] for sectioned instructions.

pub mod persona;
pub mod prompt;
pub mod session;

pub use persona::Persona;
pub use prompt::InstructionBuilder;
pub use session::{CHAT_FAILURE_MESSAGE, ChatSession, DEFAULT_HISTORY_TURNS, recent_turns};
