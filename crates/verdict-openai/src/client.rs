//! Async client for the chat-completions endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::{narrative::Narrator, submission::Submission};

use crate::error::{Error, Result};

/// Connection settings for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  /// Everything before `/chat/completions`.
  pub base_url: String,
  pub api_key:  String,
  pub model:    String,
  pub timeout:  Duration,
}

impl Default for OpenAiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".into(),
      api_key:  String::new(),
      model:    "gpt-3.5-turbo".into(),
      timeout:  Duration::from_secs(60),
    }
  }
}

/// The question asked about a submission's body.
pub fn prompt(body_text: &str) -> String {
  format!("Based on the following context, is the author an asshole? {body_text}")
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
  message: String,
}

/// A [`Narrator`] that asks a chat model about each submission.
pub struct OpenAiNarrator {
  client: Client,
  config: OpenAiConfig,
}

impl OpenAiNarrator {
  pub fn new(config: OpenAiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  /// `POST /chat/completions` with a single user message.
  pub async fn complete(&self, content: &str) -> Result<String> {
    let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
    let body = ChatRequest {
      model:    &self.config.model,
      messages: [ChatMessage { role: "user", content }],
    };

    let resp = self
      .client
      .post(url)
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_owned(),
      };
      return Err(Error::Status { status: status.as_u16(), message });
    }

    let reply: ChatResponse = resp.json().await?;
    let text = reply
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or(Error::EmptyCompletion)?;
    debug!(model = %self.config.model, chars = text.len(), "chat completion received");
    Ok(text)
  }
}

impl Narrator for OpenAiNarrator {
  async fn narrate(&self, submission: &Submission) -> verdict_core::Result<String> {
    Ok(self.complete(&prompt(&submission.body_text)).await?)
  }
}
