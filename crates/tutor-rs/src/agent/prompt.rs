//! Structured instruction builder.
//!
//! [`InstructionBuilder`] assembles multi-section instructions for the
//! generation capability: a preamble followed by `## Heading` sections and
//! raw rule lines. Empty or absent parts are skipped, so callers can pass
//! optional persona fields straight through.

/// Builder for multi-section instructions.
///
/// Sections are joined with double newlines.
///
/// # Example
///
/// ```
/// use tutor_rs::agent::prompt::InstructionBuilder;
///
/// let prompt = InstructionBuilder::new("You are a study assistant.")
///     .section("Specialty", "Organic chemistry")
///     .section_opt("Style", None::<String>)
///     .raw("Respond in Spanish.")
///     .build();
///
/// assert!(prompt.contains("## Specialty"));
/// assert!(!prompt.contains("## Style"));
/// assert!(prompt.ends_with("Respond in Spanish."));
/// ```
pub struct InstructionBuilder {
    sections: Vec<String>,
}

impl InstructionBuilder {
    /// Create a new builder with an initial preamble, included as-is.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a named section with a `##` heading. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.trim().is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    /// Append raw text without a heading. Skipped if `content` is empty.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.trim().is_empty() {
            self.sections.push(content);
        }
        self
    }

    /// Append raw text only if the content is `Some`.
    pub fn raw_opt(self, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.raw(c),
            None => self,
        }
    }

    /// Append a "Respond in <language>." directive when a language is given.
    pub fn language(self, language: Option<&str>) -> Self {
        self.raw_opt(language.map(|l| format!("Respond in {l}.")))
    }

    /// Join all sections with double newlines.
    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_only() {
        let prompt = InstructionBuilder::new("You are a tutor.").build();
        assert_eq!(prompt, "You are a tutor.");
    }

    #[test]
    fn sections_get_headings() {
        let prompt = InstructionBuilder::new("Intro")
            .section("Topic", "Algebra")
            .build();
        assert_eq!(prompt, "Intro\n\n## Topic\n\nAlgebra");
    }

    #[test]
    fn blank_sections_skipped() {
        let prompt = InstructionBuilder::new("Intro")
            .section("Empty", "   ")
            .raw("")
            .build();
        assert_eq!(prompt, "Intro");
    }

    #[test]
    fn optional_parts() {
        let prompt = InstructionBuilder::new("Intro")
            .section_opt("Present", Some("yes"))
            .section_opt("Absent", None::<String>)
            .raw_opt(Some("tail"))
            .raw_opt(None::<String>)
            .build();
        assert!(prompt.contains("## Present"));
        assert!(!prompt.contains("Absent"));
        assert!(prompt.ends_with("tail"));
    }

    #[test]
    fn language_directive() {
        let with = InstructionBuilder::new("x").language(Some("French")).build();
        assert!(with.ends_with("Respond in French."));
        let without = InstructionBuilder::new("x").language(None).build();
        assert_eq!(without, "x");
    }
}
