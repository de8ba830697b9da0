//! Error types for the verdict-text analytics engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read lexicon {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed lexicon line {line}: {reason}")]
  MalformedLine { line: usize, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
