//! Map-reduce summarization of reference documents.
//!
//! Turns a teacher's attached files into one hierarchical topic index:
//!
//! 1. **Assemble**: concatenate every document that has content, each
//!    behind a source delimiter line, in input order.
//! 2. **Chunk**: split the assembled text into fixed-size chunks.
//! 3. **Map**: one chunk goes straight to a single "index this" call. With
//!    several chunks, each gets its own concise topic-extraction call, strictly
//!    in order with a pause in between. A failed chunk is logged and left out.
//! 4. **Reduce**: the partial indexes, newline-joined, go to one final
//!    consolidation call.
//!
//! Every call is retry-wrapped. [`Summarizer::summarize`] always returns a
//! display-ready string; [`Summarizer::try_summarize`] keeps the failure
//! structured for callers that need to branch on it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::chunker::{self, DEFAULT_CHUNK_SIZE};
use crate::agent::prompt::InstructionBuilder;
use crate::api::generation::{GenerationClient, GenerationRequest};
use crate::api::retry::{RetryConfig, with_retry};
use crate::error::{GenerationResult, SummaryError};

/// Default pause between consecutive chunk calls.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(2);

/// Configuration for a summarizer.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Pause between consecutive chunk calls. Not applied after the last chunk.
    pub chunk_delay: Duration,
    /// Retry policy for every generation call.
    pub retry: RetryConfig,
    /// Target language for the summary, if any.
    pub language: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
            retry: RetryConfig::default(),
            language: None,
        }
    }
}

/// A named source document. Missing or blank content means "skip".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
        }
    }

    /// A document whose content could not be extracted.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
        }
    }

    fn usable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// One chunk's extracted topic list, tagged with the chunk it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSummary {
    pub chunk_index: usize,
    pub text: String,
}

/// The delimiter line placed before each document's content.
pub fn source_header(name: &str) -> String {
    format!("=== SOURCE: {name} ===\n")
}

/// Concatenate all documents with content, in order, each behind its
/// [`source_header`]. Returns an empty string when nothing is usable.
pub fn assemble_documents(documents: &[Document]) -> String {
    let mut assembled = String::new();
    for doc in documents {
        let Some(content) = doc.usable_content() else {
            debug!("Skipping document without content: {}", doc.name);
            continue;
        };
        if !assembled.is_empty() {
            assembled.push('\n');
        }
        assembled.push_str(&source_header(&doc.name));
        assembled.push_str(content);
        assembled.push('\n');
    }
    assembled
}

/// Orchestrates chunking, per-chunk extraction, and consolidation.
#[derive(Clone)]
pub struct Summarizer {
    client: GenerationClient,
    config: SummarizerConfig,
}

impl Summarizer {
    /// A zero `chunk_size` falls back to [`DEFAULT_CHUNK_SIZE`].
    pub fn new(client: GenerationClient, mut config: SummarizerConfig) -> Self {
        if config.chunk_size == 0 {
            warn!("Chunk size 0 is invalid, using {DEFAULT_CHUNK_SIZE}");
            config.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        Self { client, config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarize `documents` into one topic index, or a user-facing failure message.
    pub async fn summarize(&self, documents: &[Document], specialty: &str) -> String {
        match self.try_summarize(documents, specialty).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Summarization failed: {e}");
                e.user_message().to_string()
            }
        }
    }

    /// Summarize `documents`, keeping the failure structured.
    pub async fn try_summarize(
        &self,
        documents: &[Document],
        specialty: &str,
    ) -> Result<String, SummaryError> {
        let assembled = assemble_documents(documents);
        if assembled.is_empty() {
            info!("No document with content among {}", documents.len());
            return Err(SummaryError::NothingToSummarize);
        }

        let chunks = chunker::split(&assembled, self.config.chunk_size);
        info!(
            "Summarizing {} chars in {} chunk(s) for specialty {specialty:?}",
            assembled.chars().count(),
            chunks.len(),
        );

        if let [only] = chunks.as_slice() {
            let request = GenerationRequest::new(only.as_str(), self.index_instruction(specialty));
            return Ok(self.generate(&request).await?);
        }

        let partials = self.map_chunks(&chunks, specialty).await;
        if partials.is_empty() {
            return Err(SummaryError::AllPartsFailed);
        }
        info!(
            "Consolidating {} of {} partial summaries",
            partials.len(),
            chunks.len()
        );

        let joined = partials
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let request = GenerationRequest::new(joined, self.consolidate_instruction(specialty));
        Ok(self.generate(&request).await?)
    }

    /// Extract topics from each chunk in order. Failed chunks are dropped.
    async fn map_chunks(&self, chunks: &[String], specialty: &str) -> Vec<PartialSummary> {
        let total = chunks.len();
        let mut partials = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let request = GenerationRequest::new(
                chunk.as_str(),
                self.part_instruction(specialty, index + 1, total),
            );
            match self.generate(&request).await {
                Ok(text) => {
                    debug!("Chunk {}/{total} summarized", index + 1);
                    partials.push(PartialSummary {
                        chunk_index: index,
                        text,
                    });
                }
                Err(e) => warn!("Chunk {}/{total} failed and is excluded: {e}", index + 1),
            }
            if index + 1 < total && !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }
        partials
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        with_retry(&self.config.retry, || self.client.generate(request)).await
    }

    fn language(&self) -> Option<&str> {
        self.config.language.as_deref()
    }

    fn index_instruction(&self, specialty: &str) -> String {
        InstructionBuilder::new(format!(
            "You are an expert in {} organizing a student's reference material.",
            subject(specialty)
        ))
        .section(
            "Task",
            "Produce a structured, hierarchical index of the topics covered in the material. \
             Use nested bullet points: main topics first, subtopics beneath them. \
             Name the topics; do not explain them.",
        )
        .language(self.language())
        .build()
    }

    fn part_instruction(&self, specialty: &str, part: usize, total: usize) -> String {
        InstructionBuilder::new(format!(
            "You are an expert in {} reading one part of a longer document.",
            subject(specialty)
        ))
        .section(
            "Task",
            format!(
                "Extract only the main topics/index from this part ({part}/{total}). \
                 Be extremely concise: a short bulleted list, no explanations."
            ),
        )
        .language(self.language())
        .build()
    }

    fn consolidate_instruction(&self, specialty: &str) -> String {
        InstructionBuilder::new(format!(
            "You are an expert in {} building a study index.",
            subject(specialty)
        ))
        .section(
            "Task",
            "Consolidate these extracted topic lists into one deduplicated, hierarchically \
             organized index. Ignore any mentions of processing errors.",
        )
        .language(self.language())
        .build()
    }
}

fn subject(specialty: &str) -> &str {
    let trimmed = specialty.trim();
    if trimmed.is_empty() { "the subject" } else { trimmed }
}
