//! Error types for the reconcilers and snapshot export.

use std::path::PathBuf;

use thiserror::Error;
use verdict_core::Classify;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] verdict_core::Error),

  /// The store refused one entity (duplicate key, missing parent, bad
  /// input). The row is skipped and the run continues.
  #[error("store rejected write: {0}")]
  Rejected(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The store itself failed; the run stops.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("lexicon error: {0}")]
  Lexicon(#[from] verdict_text::Error),

  #[error("cannot write {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid settings: {0}")]
  Settings(String),
}

impl Error {
  /// Wrap a backend error, separating per-entity rejections from
  /// infrastructure failures.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    if err.is_conflict() || err.is_not_found() || err.is_validation() {
      Self::Rejected(Box::new(err))
    } else {
      Self::Store(Box::new(err))
    }
  }

  /// Whether a reconciler must abort instead of skipping the entity.
  pub fn is_fatal(&self) -> bool { matches!(self, Self::Store(_) | Self::Io { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
