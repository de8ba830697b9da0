//! Free-text narratives produced by a language model for one submission.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Result, submission::Submission};

/// A generated narrative, keyed by the submission's id. At most one per
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
  pub id:   i64,
  pub text: String,
}

/// Produces a narrative for a submission.
///
/// Failures surface as
/// [`Error::UpstreamUnavailable`](crate::Error::UpstreamUnavailable); a
/// caller retries on its next run.
pub trait Narrator: Send + Sync {
  fn narrate<'a>(
    &'a self,
    submission: &'a Submission,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}
