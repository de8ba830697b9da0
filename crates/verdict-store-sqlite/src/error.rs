//! Error type for `verdict-store-sqlite`.

use thiserror::Error;
use verdict_core::Classify;

#[derive(Debug, Error)]
pub enum Error {
  /// Not-found, conflict and validation failures.
  #[error(transparent)]
  Core(#[from] verdict_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Classify for Error {
  fn core(&self) -> Option<&verdict_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
