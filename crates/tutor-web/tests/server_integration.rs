//! Integration tests for the tutor-web server.
//!
//! These tests start a real axum server on a random port, backed by a
//! scripted generator, and exercise the REST endpoints over HTTP.

use std::sync::Arc;
use std::time::Duration;

use tutor_rs::api::mock::ScriptedGenerator;
use tutor_rs::prelude::*;
use tutor_web::{AppState, WebConfig, spawn_web};

fn test_config() -> TutorConfig {
    TutorConfig::default()
        .with_models(ModelChain::single("test-model"))
        .with_retry(RetryConfig::none())
        .with_chunk_delay(Duration::ZERO)
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_with_state(state: AppState, max_body_bytes: Option<usize>) -> String {
    let mut config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        ..Default::default()
    };
    if let Some(limit) = max_body_bytes {
        config.max_body_bytes = limit;
    }
    let addr = spawn_web(state, config).await.unwrap();
    format!("http://{addr}")
}

async fn spawn_test_server(generator: Arc<ScriptedGenerator>) -> String {
    spawn_with_state(AppState::new(Tutor::new(test_config(), generator)), None).await
}

async fn post_json(url: String, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ── Chat ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_returns_reply() {
    let generator = Arc::new(ScriptedGenerator::replying("A limit describes..."));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({
            "persona": {"name": "Ada", "specialty": "Mathematics"},
            "message": "What is a limit?",
            "history": [
                {"role": "user", "text": "Hi"},
                {"role": "assistant", "text": "Hello! What shall we study?"}
            ]
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["text"], "A limit describes...");

    let request = generator.last_request().unwrap();
    assert_eq!(request.content, "What is a limit?");
    assert_eq!(request.history.len(), 2);
    assert_eq!(request.history[0].role, TurnRole::User);
    assert!(request.instruction.starts_with("You are Ada"));
}

#[tokio::test]
async fn chat_with_raw_instruction() {
    let generator = Arc::new(ScriptedGenerator::replying("ok"));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"instruction": "You are a chemistry tutor.", "message": "Hi"}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        generator.last_request().unwrap().instruction,
        "You are a chemistry tutor."
    );
}

#[tokio::test]
async fn chat_rejects_blank_message() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"instruction": "p", "message": "   "}),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("message"));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn chat_requires_instruction_or_persona() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"message": "hello"}),
    )
    .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn rate_limit_surfaces_as_429() {
    let generator = Arc::new(ScriptedGenerator::new(|_, _| {
        Err(GenerationError::from_status(429, "quota exceeded"))
    }));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"instruction": "p", "message": "hello"}),
    )
    .await;
    assert_eq!(resp.status(), 429);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("too many requests"));
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn content_rejection_surfaces_as_400() {
    let generator = Arc::new(ScriptedGenerator::new(|_, _| {
        Err(GenerationError::from_message("blocked by safety filter"))
    }));
    let base = spawn_test_server(generator).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"instruction": "p", "message": "hello"}),
    )
    .await;
    assert_eq!(resp.status(), 400);
}

// ── Summary ──────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_returns_text() {
    let generator = Arc::new(ScriptedGenerator::replying("1. Cells\n  1.1 Membranes"));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/summary"),
        serde_json::json!({
            "documents": [
                {"name": "bio.txt", "content": "Cells are the unit of life."},
                {"name": "scan.pdf", "content": null}
            ],
            "specialty": "Biology"
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["text"], "1. Cells\n  1.1 Membranes");
    assert_eq!(generator.call_count(), 1);
    let content = generator.last_request().unwrap().content;
    assert!(content.contains("=== SOURCE: bio.txt ==="));
    assert!(!content.contains("scan.pdf"));
}

#[tokio::test]
async fn summary_of_empty_documents_is_400_without_calls() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let base = spawn_test_server(generator.clone()).await;

    let resp = post_json(
        format!("{base}/api/summary"),
        serde_json::json!({
            "documents": [{"name": "blank.txt", "content": "  "}],
            "specialty": "Art"
        }),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("nothing to summarize"));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn summary_with_every_chunk_failing_is_500() {
    let generator = Arc::new(ScriptedGenerator::new(|_, _| {
        Err(GenerationError::new(FailureKind::Unknown, "boom"))
    }));
    let state = AppState::new(Tutor::new(test_config().with_chunk_size(16), generator));
    let base = spawn_with_state(state, None).await;

    let resp = post_json(
        format!("{base}/api/summary"),
        serde_json::json!({
            "documents": [{"name": "long.txt", "content": "x".repeat(100)}],
            "specialty": "Art"
        }),
    )
    .await;
    assert_eq!(resp.status(), 500);
}

// ── Configuration and transport ──────────────────────────────────────

#[tokio::test]
async fn unconfigured_server_fails_deterministically() {
    let base = spawn_with_state(AppState::from_config(TutorConfig::default()), None).await;

    let resp = post_json(
        format!("{base}/api/chat"),
        serde_json::json!({"instruction": "p", "message": "hello"}),
    )
    .await;
    assert_eq!(resp.status(), 500);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("no API key"));

    let resp = post_json(
        format!("{base}/api/summary"),
        serde_json::json!({"documents": [{"name": "a", "content": "b"}], "specialty": ""}),
    )
    .await;
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn status_reports_configuration() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let base = spawn_test_server(generator).await;

    let resp = reqwest::get(format!("{base}/api/status")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["configured"], true);
    assert_eq!(json["models"], serde_json::json!(["test-model"]));
    assert_eq!(json["chunk_size"], 80_000);
    assert_eq!(json["history_turns"], 10);
    assert!(json.get("error").is_none());

    let base = spawn_with_state(AppState::from_config(TutorConfig::default()), None).await;
    let json: serde_json::Value = reqwest::get(format!("{base}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["configured"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn malformed_json_is_400() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let base = spawn_test_server(generator).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn oversized_body_is_413() {
    let generator = Arc::new(ScriptedGenerator::replying("unused"));
    let state = AppState::new(Tutor::new(test_config(), generator.clone()));
    let base = spawn_with_state(state, Some(1024)).await;

    let resp = post_json(
        format!("{base}/api/summary"),
        serde_json::json!({
            "documents": [{"name": "big.txt", "content": "y".repeat(4096)}],
            "specialty": "Art"
        }),
    )
    .await;
    assert_eq!(resp.status(), 413);
    assert_eq!(generator.call_count(), 0);
}
