//! Crawl reconciler: mirrors the source's current submissions and their
//! comment trees into the store.

use std::{collections::HashSet, time::Duration};

use futures::{StreamExt as _, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use verdict_core::{
  Classify,
  comment::RemoteComment,
  source::ContentSource,
  store::{ForumStore, Upsert},
  submission::RemoteSubmission,
};

use crate::error::{Error, Result};

/// What to do with comments that are already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentPolicy {
  /// Leave known comments untouched.
  #[default]
  InsertOnly,
  /// Overwrite message and score of known comments.
  Refresh,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
  pub channel:        String,
  pub limit:          u32,
  /// Upper bound on comment fetches in flight.
  pub concurrency:    usize,
  pub fetch_timeout:  Duration,
  pub comment_policy: CommentPolicy,
}

/// Outcome of one crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
  pub submissions_inserted:   u32,
  pub submissions_updated:    u32,
  /// Removed or empty on the source.
  pub submissions_skipped:    u32,
  pub submissions_failed:     u32,
  pub comments_inserted:      u32,
  pub comments_skipped:       u32,
  pub comments_refreshed:     u32,
  pub comments_failed:        u32,
  /// Submissions whose comment tree could not be fetched this run.
  pub comment_fetches_failed: u32,
}

/// Run one crawl of `options.channel`.
///
/// A failure to list the channel or an infrastructure failure of the store
/// aborts the run. Rejected submissions or comments and failed comment
/// fetches are logged, counted and skipped.
#[instrument(skip_all, fields(channel = %options.channel, limit = options.limit))]
pub async fn crawl<C, S>(source: &C, store: &S, options: &CrawlOptions) -> Result<CrawlReport>
where
  C: ContentSource,
  S: ForumStore,
{
  let fetched = source
    .fetch_recent_submissions(&options.channel, options.limit)
    .await?;
  info!(count = fetched.len(), "fetched submissions");

  let mut report = CrawlReport::default();
  let mut committed: Vec<String> = Vec::new();
  let mut seen = HashSet::new();

  for remote in fetched {
    if remote.is_removed() {
      debug!(remote_id = %remote.remote_id, "skipping removed submission");
      report.submissions_skipped += 1;
      continue;
    }

    let remote_id = remote.remote_id.clone();
    match persist_submission(store, remote).await {
      Ok(Upsert::Inserted) => report.submissions_inserted += 1,
      Ok(Upsert::Updated) => report.submissions_updated += 1,
      Err(err) if err.is_fatal() => return Err(err),
      Err(err) => {
        warn!(%remote_id, error = %err, "failed to persist submission");
        report.submissions_failed += 1;
        continue;
      }
    }
    if seen.insert(remote_id.clone()) {
      committed.push(remote_id);
    }
  }

  for (remote_id, fetched) in fetch_trees(source, committed, options).await {
    let comments = match fetched {
      Ok(comments) => comments,
      Err(err) => {
        warn!(%remote_id, error = %err, "failed to fetch comments");
        report.comment_fetches_failed += 1;
        continue;
      }
    };

    for comment in comments {
      let comment_id = comment.remote_id.clone();
      match persist_comment(store, comment, options.comment_policy).await {
        Ok(CommentOutcome::Inserted) => report.comments_inserted += 1,
        Ok(CommentOutcome::Skipped) => report.comments_skipped += 1,
        Ok(CommentOutcome::Refreshed) => report.comments_refreshed += 1,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => {
          warn!(%remote_id, %comment_id, error = %err, "failed to persist comment");
          report.comments_failed += 1;
        }
      }
    }
  }

  info!(?report, "crawl finished");
  Ok(report)
}

/// Fetch every comment tree, at most `options.concurrency` at a time, each
/// under its own timeout. All fetches finish before anything is written so
/// store latency never eats into a fetch's time budget.
async fn fetch_trees<C: ContentSource>(
  source: &C,
  remote_ids: Vec<String>,
  options: &CrawlOptions,
) -> Vec<(String, verdict_core::Result<Vec<RemoteComment>>)> {
  stream::iter(remote_ids)
    .map(|remote_id| async move {
      let fetched =
        match tokio::time::timeout(options.fetch_timeout, source.fetch_comments(&remote_id)).await
        {
          Ok(fetched) => fetched,
          Err(_) => Err(verdict_core::Error::UpstreamUnavailable(format!(
            "comment fetch timed out after {:?}",
            options.fetch_timeout
          ))),
        };
      (remote_id, fetched)
    })
    .buffer_unordered(options.concurrency.max(1))
    .collect()
    .await
}

/// Create the submission, or update it in place if its `remote_id` is
/// already stored.
async fn persist_submission<S: ForumStore>(store: &S, remote: RemoteSubmission) -> Result<Upsert> {
  if let Some(existing) = store.find_submission(&remote.remote_id).await.map_err(Error::store)? {
    store
      .update_submission(existing.id, remote)
      .await
      .map_err(Error::store)?;
    return Ok(Upsert::Updated);
  }

  match store.create_submission(remote.clone()).await {
    Ok(_) => Ok(Upsert::Inserted),
    // Lost a race with another writer; treat it as existing.
    Err(err) if err.is_conflict() => {
      let existing = store
        .find_submission(&remote.remote_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::store(err))?;
      store
        .update_submission(existing.id, remote)
        .await
        .map_err(Error::store)?;
      Ok(Upsert::Updated)
    }
    Err(err) => Err(Error::store(err)),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentOutcome {
  Inserted,
  Skipped,
  Refreshed,
}

async fn persist_comment<S: ForumStore>(
  store: &S,
  comment: RemoteComment,
  policy: CommentPolicy,
) -> Result<CommentOutcome> {
  match policy {
    CommentPolicy::Refresh => {
      let (_, upsert) = store.upsert_comment(comment).await.map_err(Error::store)?;
      Ok(match upsert {
        Upsert::Inserted => CommentOutcome::Inserted,
        Upsert::Updated => CommentOutcome::Refreshed,
      })
    }
    CommentPolicy::InsertOnly => {
      if store
        .find_comment(&comment.remote_id)
        .await
        .map_err(Error::store)?
        .is_some()
      {
        return Ok(CommentOutcome::Skipped);
      }
      match store.create_comment(comment).await {
        Ok(_) => Ok(CommentOutcome::Inserted),
        Err(err) if err.is_conflict() => Ok(CommentOutcome::Skipped),
        Err(err) => Err(Error::store(err)),
      }
    }
  }
}
