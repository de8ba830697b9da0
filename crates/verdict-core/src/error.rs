//! Error types for `verdict-core`.

use std::fmt;

use thiserror::Error;

/// The persisted entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Submission,
  Comment,
  Summary,
  Breakdown,
  Narrative,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Submission => "submission",
      Self::Comment => "comment",
      Self::Summary => "summary",
      Self::Breakdown => "breakdown",
      Self::Narrative => "narrative",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A lookup by surrogate id or natural key found nothing.
  #[error("{entity} {key} not found")]
  NotFound { entity: Entity, key: String },

  /// A create collided with an existing natural key.
  #[error("{entity} {key} already exists")]
  Conflict { entity: Entity, key: String },

  /// The content source could not be reached or refused the request.
  #[error("content source unavailable: {0}")]
  UpstreamUnavailable(String),

  /// Malformed query input, rejected before touching storage.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(entity: Entity, key: impl ToString) -> Self {
    Self::NotFound { entity, key: key.to_string() }
  }

  pub fn conflict(entity: Entity, key: impl ToString) -> Self {
    Self::Conflict { entity, key: key.to_string() }
  }
}

/// Lets generic callers tell domain failures from infrastructure ones in a
/// backend's error type.
pub trait Classify {
  /// The domain error this error wraps, if any.
  fn core(&self) -> Option<&Error>;

  fn is_conflict(&self) -> bool { matches!(self.core(), Some(Error::Conflict { .. })) }

  fn is_not_found(&self) -> bool { matches!(self.core(), Some(Error::NotFound { .. })) }

  fn is_validation(&self) -> bool { matches!(self.core(), Some(Error::Validation(_))) }
}

impl Classify for Error {
  fn core(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
