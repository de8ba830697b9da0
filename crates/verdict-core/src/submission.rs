//! Submissions: the top-level posts crawled from a channel.

use serde::{Deserialize, Serialize};

use crate::comment::Comment;

/// Body text the content source substitutes for moderator-removed posts.
pub const REMOVED_SENTINEL: &str = "[removed]";

/// A persisted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  /// Surrogate id assigned by the store on first insert; never changes.
  pub id:          i64,
  /// Natural key assigned by the content source.
  pub remote_id:   String,
  pub title:       String,
  pub body_text:   String,
  /// Creation time in seconds since the Unix epoch (UTC).
  pub created_utc: i64,
  pub permalink:   String,
  /// Refreshed on every re-crawl.
  pub score:       i64,
}

/// A submission as delivered by the content source, before it has a
/// surrogate id. Also the input to the store's create/update operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSubmission {
  pub remote_id:   String,
  pub title:       String,
  pub body_text:   String,
  pub created_utc: i64,
  pub permalink:   String,
  pub score:       i64,
}

impl RemoteSubmission {
  /// `true` when the body is empty or the source's removal sentinel.
  /// Such submissions are never persisted.
  pub fn is_removed(&self) -> bool {
    let body = self.body_text.trim();
    body.is_empty() || body == REMOVED_SENTINEL
  }
}

/// The fields of a submission needed to search titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
  pub id:          i64,
  pub title:       String,
  pub created_utc: i64,
}

/// A submission bundled with its persisted comments; the unit of work handed
/// to the analytics engine.
#[derive(Debug, Clone)]
pub struct SubmissionWithComments {
  pub submission: Submission,
  pub comments:   Vec<Comment>,
}

impl SubmissionWithComments {
  /// The comment bodies in persisted order.
  pub fn texts(&self) -> impl Iterator<Item = &str> {
    self.comments.iter().map(|c| c.message.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn remote(body: &str) -> RemoteSubmission {
    RemoteSubmission {
      remote_id:   "abc123".into(),
      title:       "AITA for testing?".into(),
      body_text:   body.into(),
      created_utc: 1_700_000_000,
      permalink:   "/r/AmItheAsshole/comments/abc123/".into(),
      score:       1,
    }
  }

  #[test]
  fn removed_sentinel_is_removed() {
    assert!(remote("[removed]").is_removed());
    assert!(remote("  ").is_removed());
    assert!(!remote("I did a thing.").is_removed());
  }
}
