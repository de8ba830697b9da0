//! Comments: flattened entries of a submission's comment tree.

use serde::{Deserialize, Serialize};

/// A persisted comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub id:                   i64,
  /// Natural key assigned by the content source.
  pub remote_id:            String,
  /// The owning submission's `remote_id`.
  pub remote_submission_id: String,
  /// Fullname of the parent comment or submission (e.g. `t1_…`, `t3_…`).
  pub parent_id:            String,
  pub message:              String,
  pub created_utc:          i64,
  pub score:                i64,
}

/// A comment as delivered by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteComment {
  pub remote_id:            String,
  pub remote_submission_id: String,
  pub parent_id:            String,
  pub message:              String,
  pub created_utc:          i64,
  pub score:                i64,
}
