//! The `ContentSource` trait: the read side of the remote forum.

use std::future::Future;

use crate::{
  Result,
  comment::RemoteComment,
  submission::RemoteSubmission,
};

/// Abstraction over the remote forum's read API.
///
/// Implementations make a single attempt per call; retry policy belongs to
/// the caller. Failures surface as
/// [`Error::UpstreamUnavailable`](crate::Error::UpstreamUnavailable).
pub trait ContentSource: Send + Sync {
  /// Fetch up to `limit` current submissions from `channel`.
  ///
  /// Submissions whose body is the removal sentinel are filtered out.
  fn fetch_recent_submissions<'a>(
    &'a self,
    channel: &'a str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RemoteSubmission>>> + Send + 'a;

  /// Fetch the flattened comment tree of one submission. Placeholders for
  /// unloaded replies are dropped.
  fn fetch_comments<'a>(
    &'a self,
    remote_submission_id: &'a str,
  ) -> impl Future<Output = Result<Vec<RemoteComment>>> + Send + 'a;
}
