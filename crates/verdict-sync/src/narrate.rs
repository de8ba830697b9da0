//! Narrative reconciler: asks a [`Narrator`] about submissions that have no
//! narrative yet.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use verdict_core::{
  narrative::{Narrative, Narrator},
  store::ForumStore,
  submission::Submission,
};

use crate::{
  analyze::PendingPolicy,
  error::{Error, Result},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NarrateReport {
  pub selected: u32,
  /// Already narrated; never sent to the narrator again.
  pub skipped:  u32,
  pub written:  u32,
  pub failed:   u32,
}

/// Submissions selected by `policy`. `Unanalyzed` here means "no narrative
/// yet"; a window may include narrated submissions, which are flagged.
async fn candidates<S: ForumStore>(
  store: &S,
  policy: PendingPolicy,
  limit: u32,
) -> Result<Vec<(Submission, bool)>> {
  match policy {
    PendingPolicy::Unanalyzed => Ok(
      store
        .unnarrated_submissions(limit)
        .await
        .map_err(Error::store)?
        .into_iter()
        .map(|s| (s, false))
        .collect(),
    ),
    PendingPolicy::Window(window) => {
      let mut out = Vec::new();
      for submission in store
        .submissions_in_window(window, limit)
        .await
        .map_err(Error::store)?
      {
        let narrated = store
          .get_narrative(submission.id)
          .await
          .map_err(Error::store)?
          .is_some();
        out.push((submission, narrated));
      }
      Ok(out)
    }
  }
}

/// Narrate up to `limit` submissions selected by `policy`.
///
/// A narrator failure is logged and the submission is retried on the next
/// run. An infrastructure failure of the store aborts the run.
#[instrument(skip_all, fields(policy = ?policy, limit))]
pub async fn narrate<S, N>(
  store: &S,
  narrator: &N,
  policy: PendingPolicy,
  limit: u32,
) -> Result<NarrateReport>
where
  S: ForumStore,
  N: Narrator,
{
  let pending = candidates(store, policy, limit).await?;
  let mut report = NarrateReport { selected: pending.len() as u32, ..Default::default() };

  for (submission, narrated) in pending {
    let id = submission.id;
    if narrated {
      debug!(id, "narrative exists; skipping");
      report.skipped += 1;
      continue;
    }

    let text = match narrator.narrate(&submission).await {
      Ok(text) => text,
      Err(err) => {
        warn!(id, error = %err, "narrator failed");
        report.failed += 1;
        continue;
      }
    };

    match store
      .upsert_narrative(Narrative { id, text })
      .await
      .map_err(Error::store)
    {
      Ok(_) => report.written += 1,
      Err(err) if err.is_fatal() => return Err(err),
      Err(err) => {
        warn!(id, error = %err, "failed to store narrative");
        report.failed += 1;
      }
    }
  }

  info!(?report, "narration finished");
  Ok(report)
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use verdict_core::{query::TimeWindow, submission::RemoteSubmission};
  use verdict_store_sqlite::SqliteStore;

  use super::*;

  /// 2023-01-01T00:00:00Z
  const JAN_2023: i64 = 1_672_531_200;

  /// Echoes the title; refuses bodies mentioning "refuse".
  #[derive(Default)]
  struct FakeNarrator {
    calls: AtomicUsize,
  }

  impl Narrator for FakeNarrator {
    async fn narrate(&self, submission: &Submission) -> verdict_core::Result<String> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if submission.body_text.contains("refuse") {
        return Err(verdict_core::Error::UpstreamUnavailable("429".into()));
      }
      Ok(format!("narrative for {}", submission.title))
    }
  }

  async fn seed(store: &SqliteStore, remote_id: &str, body: &str) -> i64 {
    store
      .create_submission(RemoteSubmission {
        remote_id: remote_id.into(),
        title: format!("AITA {remote_id}"),
        body_text: body.into(),
        created_utc: JAN_2023 + 60,
        permalink: format!("/r/AmItheAsshole/comments/{remote_id}/"),
        score: 1,
      })
      .await
      .unwrap()
      .id
  }

  #[tokio::test]
  async fn narrates_each_submission_once() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let id = seed(&store, "abc123", "My sister...").await;
    seed(&store, "def456", "My roommate...").await;
    let narrator = FakeNarrator::default();

    let report = narrate(&store, &narrator, PendingPolicy::Unanalyzed, 10).await.unwrap();
    assert_eq!((report.selected, report.written), (2, 2));

    let stored = store.get_narrative(id).await.unwrap().unwrap();
    assert_eq!(stored.text, "narrative for AITA abc123");

    let again = narrate(&store, &narrator, PendingPolicy::Unanalyzed, 10).await.unwrap();
    assert_eq!(again.selected, 0);
    assert_eq!(narrator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.counts().await.unwrap().narratives, 2);
  }

  #[tokio::test]
  async fn window_skips_narrated_submissions() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let id = seed(&store, "abc123", "text").await;
    seed(&store, "def456", "text").await;
    store
      .upsert_narrative(Narrative { id, text: "kept".into() })
      .await
      .unwrap();

    let narrator = FakeNarrator::default();
    let window = PendingPolicy::Window(TimeWindow { start: JAN_2023, end: JAN_2023 + 86_400 });
    let report = narrate(&store, &narrator, window, 10).await.unwrap();

    assert_eq!(report.selected, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 1);
    assert_eq!(store.get_narrative(id).await.unwrap().unwrap().text, "kept");
  }

  #[tokio::test]
  async fn narrator_failures_are_retried_next_run() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    seed(&store, "ok", "text").await;
    let refused = seed(&store, "busy", "please refuse").await;
    let narrator = FakeNarrator::default();

    let report = narrate(&store, &narrator, PendingPolicy::Unanalyzed, 10).await.unwrap();
    assert_eq!((report.written, report.failed), (1, 1));
    assert!(store.get_narrative(refused).await.unwrap().is_none());

    let pending = store.unnarrated_submissions(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, refused);
  }

  #[tokio::test]
  async fn closed_store_aborts_narration() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    seed(&store, "abc123", "text").await;
    store.clone().close().await.unwrap();

    let err = narrate(&store, &FakeNarrator::default(), PendingPolicy::Unanalyzed, 10)
      .await
      .unwrap_err();
    assert!(err.is_fatal());
  }
}
