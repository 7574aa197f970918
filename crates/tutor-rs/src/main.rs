//! Summarize study material or chat with a teacher persona from the terminal.
//!
//! Reads the API key from `TUTOR_API_KEY` (or `OPENROUTER_KEY`) and the other
//! `TUTOR_*` settings from the environment.
//!
//! # Examples
//!
//! ```sh
//! # Build a topic index from reference files
//! tutor summarize --file notes.md --file chapter2.txt --specialty "Organic chemistry"
//!
//! # Pipe extracted PDF text in
//! pdftotext book.pdf - | tutor summarize --stdin --specialty History --language Spanish
//!
//! # Ask a persona a question, carrying earlier turns
//! tutor chat --persona-name Ada --specialty Mathematics \
//!   --history turns.json --message "Why does the chain rule work?"
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tutor_rs::prelude::*;

/// Study-tutor command line.
#[derive(Parser)]
#[command(name = "tutor")]
struct Cli {
    /// Model to use; repeat for a fallback order. Overrides TUTOR_MODELS.
    #[arg(long = "model", global = true)]
    models: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a hierarchical topic index from documents.
    Summarize(SummarizeArgs),
    /// Send one chat turn to a teacher persona.
    Chat(ChatArgs),
}

#[derive(Args)]
struct SummarizeArgs {
    /// Text file to include; repeat for several documents.
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// Read one more document from stdin.
    #[arg(long)]
    stdin: bool,

    /// Subject the material belongs to.
    #[arg(long, default_value = "")]
    specialty: String,

    /// Language for the summary. Overrides TUTOR_LANGUAGE.
    #[arg(long)]
    language: Option<String>,
}

#[derive(Args)]
struct ChatArgs {
    /// The student's message.
    #[arg(long)]
    message: String,

    /// Raw persona instruction.
    #[arg(long, conflicts_with = "persona_name")]
    instruction: Option<String>,

    /// Persona name (used with --specialty).
    #[arg(long)]
    persona_name: Option<String>,

    /// Persona specialty.
    #[arg(long, default_value = "")]
    specialty: String,

    /// Persona teaching style.
    #[arg(long)]
    personality: Option<String>,

    /// Persona answer language.
    #[arg(long)]
    language: Option<String>,

    /// JSON file holding earlier turns: `[{"role":"user","text":"..."}, ...]`.
    #[arg(long)]
    history: Option<PathBuf>,
}

fn load_documents(args: &SummarizeArgs) -> Result<Vec<Document>, String> {
    let mut documents = Vec::with_capacity(args.files.len() + 1);
    for path in &args.files {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        documents.push(Document::new(file_label(path), content));
    }
    if args.stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        documents.push(Document::new("stdin", buf));
    }
    if documents.is_empty() {
        return Err("pass at least one --file or --stdin".to_string());
    }
    Ok(documents)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_history(path: Option<&Path>) -> Result<Vec<ConversationTurn>, String> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read history '{}': {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| format!("failed to parse history '{}': {e}", path.display()))
}

fn persona_instruction(args: &ChatArgs) -> Result<String, String> {
    if let Some(instruction) = &args.instruction {
        return Ok(instruction.clone());
    }
    let Some(name) = &args.persona_name else {
        return Err("pass --instruction or --persona-name".to_string());
    };
    let mut persona = Persona::new(name, &args.specialty);
    persona.personality = args.personality.clone();
    persona.language = args.language.clone();
    Ok(persona.instruction())
}

async fn run(cli: Cli) -> Result<String, String> {
    let mut config = TutorConfig::from_env().map_err(|e| e.to_string())?;
    if !cli.models.is_empty() {
        config = config.with_models(ModelChain::new(cli.models));
    }

    match cli.command {
        Command::Summarize(args) => {
            if let Some(language) = &args.language {
                config = config.with_language(language);
            }
            let documents = load_documents(&args)?;
            let tutor = Tutor::from_config(config).map_err(|e| e.to_string())?;
            tutor
                .summarizer()
                .try_summarize(&documents, &args.specialty)
                .await
                .map_err(|e| format!("{} ({e})", e.user_message()))
        }
        Command::Chat(args) => {
            let instruction = persona_instruction(&args)?;
            let history = load_history(args.history.as_deref())?;
            let tutor = Tutor::from_config(config).map_err(|e| e.to_string())?;
            tutor
                .session()
                .try_chat(&instruction, &args.message, &history)
                .await
                .map_err(|e| format!("{} ({e})", e.user_message()))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
