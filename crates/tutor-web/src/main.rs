//! Tutor API server.
//!
//! Serves summary and persona-chat endpoints for a browser front-end. The API
//! key and the other `TUTOR_*` settings come from the environment.
//!
//! # Usage
//!
//! ```bash
//! TUTOR_API_KEY=sk-... cargo run -p tutor-web
//! TUTOR_API_KEY=sk-... cargo run -p tutor-web -- --port 8080
//! TUTOR_API_KEY=sk-... cargo run -p tutor-web -- --static-dir ./web/out
//! ```
//!
//! ## Requests
//!
//! `POST /api/summary`:
//! ```json
//! {"documents": [{"name": "notes.md", "content": "..."}], "specialty": "History"}
//! ```
//!
//! `POST /api/chat`:
//! ```json
//! {"persona": {"name": "Ada", "specialty": "Math"}, "message": "What is a limit?", "history": []}
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tutor_rs::prelude::*;
use tutor_web::{AppState, WebConfig, spawn_web};

/// Tutor API server.
#[derive(Parser)]
#[command(about = "HTTP server for study summaries and persona chat")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Serve a static front-end build from this directory.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Largest accepted request body, in MiB.
    #[arg(long, default_value_t = 25)]
    max_body_mb: usize,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Bad values are fatal; a missing key only disables generation.
    let config = TutorConfig::from_env().map_err(|e| e.to_string())?;
    let state = AppState::from_config(config);

    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        max_body_bytes: args.max_body_mb.saturating_mul(1024 * 1024),
        static_dir: args.static_dir,
    };
    let addr = spawn_web(state, web_config)
        .await
        .map_err(|e| format!("failed to bind: {e}"))?;
    println!("Tutor API: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown: {e}"))?;
    Ok(())
}
