//! Long-document handling: chunking and map-reduce summarization.
//!
//! 1. **[`chunker`]**: splits text into fixed-size character chunks. No
//!    word or sentence awareness; concatenating the chunks restores the input.
//!
//! 2. **[`summarizer`]**: [`Summarizer`] assembles a teacher's reference
//!    documents, extracts a topic list per chunk, and consolidates the lists
//!    into one hierarchical index.

pub mod chunker;
pub mod summarizer;

// Re-export commonly used items at the module level.
pub use chunker::{DEFAULT_CHUNK_SIZE, split};
pub use summarizer::{Document, PartialSummary, Summarizer, SummarizerConfig};
