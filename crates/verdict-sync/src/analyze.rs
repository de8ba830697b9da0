//! Analytics reconciler: computes summaries for pending submissions.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};
use verdict_core::{
  query::TimeWindow,
  store::{ForumStore, Upsert},
  submission::{Submission, SubmissionWithComments},
  summary::Summary,
};
use verdict_text::Analyzer;

use crate::{
  error::{Error, Result},
  settings::PolicySetting,
};

/// Which submissions a run analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPolicy {
  /// Submissions created within the window, bounds inclusive.
  Window(TimeWindow),
  /// Submissions with no summary yet.
  Unanalyzed,
}

impl PendingPolicy {
  /// The previous UTC day.
  pub fn yesterday() -> Self { Self::Window(TimeWindow::day_before(Utc::now())) }
}

impl From<PolicySetting> for PendingPolicy {
  fn from(setting: PolicySetting) -> Self {
    match setting {
      PolicySetting::Yesterday => Self::yesterday(),
      PolicySetting::Unanalyzed => Self::Unanalyzed,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalyzeReport {
  pub selected: u32,
  pub inserted: u32,
  pub updated:  u32,
  pub failed:   u32,
}

async fn pending_submissions<S: ForumStore>(
  store: &S,
  policy: PendingPolicy,
  limit: u32,
) -> Result<Vec<Submission>> {
  match policy {
    PendingPolicy::Window(window) => store.submissions_in_window(window, limit).await,
    PendingPolicy::Unanalyzed => store.unanalyzed_submissions(limit).await,
  }
  .map_err(Error::store)
}

async fn with_comments<S: ForumStore>(
  store: &S,
  submission: Submission,
) -> Result<SubmissionWithComments> {
  let comments = store
    .all_comments_for_submission(&submission.remote_id)
    .await
    .map_err(Error::store)?;
  Ok(SubmissionWithComments { submission, comments })
}

/// Load every pending submission with its comments.
pub async fn select_pending<S: ForumStore>(
  store: &S,
  policy: PendingPolicy,
  limit: u32,
) -> Result<Vec<SubmissionWithComments>> {
  let mut out = Vec::new();
  for submission in pending_submissions(store, policy, limit).await? {
    out.push(with_comments(store, submission).await?);
  }
  Ok(out)
}

/// Analyze up to `limit` pending submissions and upsert their summaries.
///
/// Failing to select, or an infrastructure failure of the store, aborts the
/// run. A summary the store rejects is logged and the rest proceed.
#[instrument(skip_all, fields(policy = ?policy, limit))]
pub async fn analyze<S: ForumStore>(
  store: &S,
  analyzer: &Analyzer,
  policy: PendingPolicy,
  limit: u32,
) -> Result<AnalyzeReport> {
  let pending = select_pending(store, policy, limit).await?;
  let mut report = AnalyzeReport { selected: pending.len() as u32, ..Default::default() };

  for submission in &pending {
    let id = submission.submission.id;
    match summarize(store, analyzer, submission).await {
      Ok(Upsert::Inserted) => report.inserted += 1,
      Ok(Upsert::Updated) => report.updated += 1,
      Err(err) if err.is_fatal() => return Err(err),
      Err(err) => {
        warn!(id, error = %err, "failed to analyze submission");
        report.failed += 1;
      }
    }
  }

  info!(?report, "analysis finished");
  Ok(report)
}

async fn summarize<S: ForumStore>(
  store: &S,
  analyzer: &Analyzer,
  pending: &SubmissionWithComments,
) -> Result<Upsert> {
  let analysis = analyzer.analyze(pending.texts());
  let summary = Summary::new(pending.submission.id, analysis, pending.comments.len() as u32);
  store.upsert_summary(summary).await.map_err(Error::store)
}
