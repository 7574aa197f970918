//! Teacher personas.
//!
//! A [`Persona`] is the client-side description of an AI teacher. It turns
//! into the instruction string that [`ChatSession`](super::ChatSession) sends
//! with every turn, including the topic index the summarizer produced from
//! the teacher's attached files.

use serde::{Deserialize, Serialize};

use super::prompt::InstructionBuilder;

/// An AI teacher persona.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Persona {
    /// Display name, e.g. "Professor Ada".
    pub name: String,
    /// Subject the teacher specializes in.
    pub specialty: String,
    /// Free-form teaching style ("Socratic", "uses lots of examples", ...).
    #[serde(default)]
    pub personality: Option<String>,
    /// Language the teacher answers in.
    #[serde(default)]
    pub language: Option<String>,
    /// Topic index of the teacher's reference material.
    #[serde(default)]
    pub reference_summary: Option<String>,
}

impl Persona {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            ..Default::default()
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_reference_summary(mut self, summary: impl Into<String>) -> Self {
        self.reference_summary = Some(summary.into());
        self
    }

    /// Build the persona instruction sent with every chat turn.
    pub fn instruction(&self) -> String {
        let who = match self.name.trim() {
            "" => "a teacher".to_string(),
            name => format!("{name}, a teacher"),
        };
        InstructionBuilder::new(format!(
            "You are {who} specialized in {}. Help the student learn: \
             explain clearly, check understanding, and stay within your specialty.",
            self.specialty.trim()
        ))
        .section_opt("Teaching style", self.personality.as_deref())
        .section_opt(
            "Reference material",
            self.reference_summary.as_deref().map(|summary| {
                format!(
                    "The student attached material covering these topics. \
                     Ground your answers in it when relevant:\n\n{summary}"
                )
            }),
        )
        .language(self.language.as_deref())
        .build()
    }
}
