//! HTTP endpoints for tutor-rs summaries and persona chat.
//!
//! `tutor-web` wraps a [`Tutor`](tutor_rs::Tutor) in an axum server so a
//! browser front-end can request topic indexes and chat replies without
//! holding the API key itself.
//!
//! # Quick start
//!
//! ```ignore
//! use tutor_rs::prelude::*;
//! use tutor_web::{AppState, WebConfig, spawn_web};
//!
//! let state = AppState::from_config(TutorConfig::from_env()?);
//! let addr = spawn_web(state, WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Route | Body | Success |
//! |-------|------|---------|
//! | `POST /api/summary` | `{ documents: [{name, content}], specialty }` | `{ text }` |
//! | `POST /api/chat` | `{ instruction \| persona, message, history }` | `{ text }` |
//! | `GET /api/status` | | `{ configured, models, chunk_size, history_turns }` |
//!
//! Failures answer `{ error }` with a display-ready message. A missing API key
//! is not fatal at startup: the server still runs and every generation
//! endpoint answers 500 until it is configured.

mod api;
mod server;

pub use api::{AppState, ChatBody, StatusBody, SummaryBody, TextBody};

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default request body limit: 25 MiB, enough for several extracted books.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Largest accepted request body. Larger bodies get 413.
    pub max_body_bytes: usize,
    /// Directory of a static front-end build to serve at `/`.
    ///
    /// If `None`, only the API endpoints are served.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(state: AppState, config: WebConfig) -> std::io::Result<SocketAddr> {
    let router = server::build_router(state, config.max_body_bytes, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
