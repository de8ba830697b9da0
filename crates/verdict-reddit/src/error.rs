//! Error types for the Reddit content source.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{endpoint} returned {status}")]
  Status { endpoint: String, status: u16 },

  #[error("token request rejected: {0}")]
  Auth(String),

  #[error("limit must be positive")]
  ZeroLimit,
}

impl From<Error> for verdict_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::ZeroLimit => Self::Validation(err.to_string()),
      other => Self::UpstreamUnavailable(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
