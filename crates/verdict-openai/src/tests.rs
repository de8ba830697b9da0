//! Tests for `OpenAiNarrator` against a local fake of the chat API.

use std::time::Duration;

use axum::{
  Json, Router,
  http::{HeaderMap, StatusCode, header},
  routing::post,
};
use serde_json::{Value, json};
use verdict_core::{narrative::Narrator, submission::Submission};

use crate::{Error, OpenAiConfig, OpenAiNarrator};

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
  let authorized = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == "Bearer sk-test");
  if !authorized {
    return (
      StatusCode::UNAUTHORIZED,
      Json(json!({ "error": { "message": "Incorrect API key provided" } })),
    );
  }

  assert_eq!(body["model"], "gpt-3.5-turbo");
  assert_eq!(body["messages"][0]["role"], "user");
  let question = body["messages"][0]["content"].as_str().unwrap_or_default();
  if question.contains("silence") {
    return (StatusCode::OK, Json(json!({ "choices": [] })));
  }
  assert!(question.ends_with("I skipped the wedding."));

  (
    StatusCode::OK,
    Json(json!({
      "id": "chatcmpl-1",
      "object": "chat.completion",
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": "1. Defensive\n2. Apologize" },
        "finish_reason": "stop"
      }]
    })),
  )
}

async fn fake_openai() -> String {
  let router = Router::new().route("/v1/chat/completions", post(completions));
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{addr}/v1")
}

fn narrator(base_url: String, api_key: &str) -> OpenAiNarrator {
  OpenAiNarrator::new(OpenAiConfig {
    base_url,
    api_key: api_key.into(),
    timeout: Duration::from_secs(5),
    ..OpenAiConfig::default()
  })
  .unwrap()
}

fn submission(body_text: &str) -> Submission {
  Submission {
    id:          1,
    remote_id:   "abc123".into(),
    title:       "AITA for skipping my sister's wedding?".into(),
    body_text:   body_text.into(),
    created_utc: 1_672_531_200,
    permalink:   "/r/AmItheAsshole/comments/abc123/".into(),
    score:       10,
  }
}

#[tokio::test]
async fn narrate_returns_first_choice() {
  let base = fake_openai().await;
  let text = narrator(base, "sk-test")
    .narrate(&submission("I skipped the wedding."))
    .await
    .unwrap();
  assert_eq!(text, "1. Defensive\n2. Apologize");
}

#[tokio::test]
async fn rejected_key_is_upstream_unavailable() {
  let base = fake_openai().await;
  let openai = narrator(base, "sk-wrong");

  let err = openai.complete("hello").await.unwrap_err();
  assert!(matches!(&err, Error::Status { status: 401, message } if message.contains("API key")));

  let err = openai.narrate(&submission("hello")).await.unwrap_err();
  assert!(matches!(err, verdict_core::Error::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn empty_completion_is_an_error() {
  let base = fake_openai().await;
  let err = narrator(base, "sk-test").complete("silence").await.unwrap_err();
  assert!(matches!(err, Error::EmptyCompletion));
}
