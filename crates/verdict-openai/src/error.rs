//! Error types for the OpenAI narrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("chat completion returned {status}: {message}")]
  Status { status: u16, message: String },

  #[error("chat completion carried no message")]
  EmptyCompletion,
}

impl From<Error> for verdict_core::Error {
  fn from(err: Error) -> Self { Self::UpstreamUnavailable(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
