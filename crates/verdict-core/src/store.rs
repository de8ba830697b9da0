//! The `ForumStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `verdict-store-sqlite`). The reconcilers and the API depend on this
//! abstraction, not on any concrete backend.
//!
//! Point lookups return `Ok(None)` when nothing matches; callers that need a
//! hard failure turn that into [`Error::NotFound`](crate::Error::NotFound).
//! Updates of a missing row and creates of an existing natural key fail with
//! `NotFound` and `Conflict` respectively.

use std::future::Future;

use serde::Serialize;

use crate::{
  Classify,
  comment::{Comment, RemoteComment},
  narrative::Narrative,
  query::{ListQuery, Page, SubmissionFilter, TimeWindow, TopQuery, TopSubmission},
  submission::{IndexEntry, RemoteSubmission, Submission},
  summary::{Breakdown, Summary},
};

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Upsert {
  Inserted,
  Updated,
}

/// Row counts per entity, for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
  pub submissions: u64,
  pub comments:    u64,
  pub summaries:   u64,
  pub narratives:  u64,
}

/// Abstraction over the durable store of submissions, comments and
/// summaries. The store is the single writer of record and enforces
/// natural-key uniqueness.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ForumStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Submissions ───────────────────────────────────────────────────────

  fn get_submission(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Look up a submission by its natural key.
  fn find_submission<'a>(
    &'a self,
    remote_id: &'a str,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + 'a;

  /// Insert a new submission with a freshly assigned id.
  /// Fails with `Conflict` if `remote_id` is already stored.
  fn create_submission(
    &self,
    input: RemoteSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Overwrite the mutable fields (`title`, `body_text`, `permalink`,
  /// `score`) of submission `id`. The id, `remote_id` and `created_utc` are
  /// preserved. Fails with `NotFound` if `id` is absent.
  fn update_submission(
    &self,
    id: i64,
    input: RemoteSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Create-or-update keyed on `remote_id`, in one transaction.
  fn upsert_submission(
    &self,
    input: RemoteSubmission,
  ) -> impl Future<Output = Result<(Submission, Upsert), Self::Error>> + Send + '_;

  fn list_submissions<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Submission>, Self::Error>> + Send + 'a;

  /// Exact natural-key match or inclusive creation window; see
  /// [`SubmissionFilter`].
  fn search_submissions<'a>(
    &'a self,
    filter: &'a SubmissionFilter,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Submission>, Self::Error>> + Send + 'a;

  /// Submissions with no summary yet, oldest id first.
  fn unanalyzed_submissions(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Submissions created within `window`, oldest id first.
  fn submissions_in_window(
    &self,
    window: TimeWindow,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// A lightweight entry for every submission, in id order. Feeds
  /// approximate title matching and the search snapshot.
  fn submission_index(
    &self,
  ) -> impl Future<Output = Result<Vec<IndexEntry>, Self::Error>> + Send + '_;

  /// The submissions with the given ids, in the order the ids are given.
  /// Unknown ids are left out.
  fn submissions_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + 'a;

  /// Full-text search over title and body, best match first.
  fn text_search<'a>(
    &'a self,
    text: &'a str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + 'a;

  /// A uniformly random submission, or `None` if the store is empty.
  fn random_submission(
    &self,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Per-period maximum of one breakdown counter; see [`TopQuery`].
  fn top_submissions<'a>(
    &'a self,
    query: &'a TopQuery,
  ) -> impl Future<Output = Result<Vec<TopSubmission>, Self::Error>> + Send + 'a;

  // ── Comments ──────────────────────────────────────────────────────────

  fn get_comment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn find_comment<'a>(
    &'a self,
    remote_id: &'a str,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + 'a;

  /// Insert a new comment. Fails with `Conflict` if `remote_id` is already
  /// stored, or `NotFound` if the owning submission is not.
  fn create_comment(
    &self,
    input: RemoteComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Overwrite `message` and `score` of comment `id`.
  fn update_comment(
    &self,
    id: i64,
    input: RemoteComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Create-or-update keyed on `remote_id`, in one transaction.
  fn upsert_comment(
    &self,
    input: RemoteComment,
  ) -> impl Future<Output = Result<(Comment, Upsert), Self::Error>> + Send + '_;

  fn list_comments<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Comment>, Self::Error>> + Send + 'a;

  /// Comments of one submission, addressed by its natural key.
  fn comments_for_submission<'a>(
    &'a self,
    remote_submission_id: &'a str,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Comment>, Self::Error>> + Send + 'a;

  /// Every comment of one submission, in id order.
  fn all_comments_for_submission<'a>(
    &'a self,
    remote_submission_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;

  // ── Summaries & breakdowns ────────────────────────────────────────────

  fn get_summary(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Summary>, Self::Error>> + Send + '_;

  fn get_breakdown(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Breakdown>, Self::Error>> + Send + '_;

  /// Insert a summary and its breakdown. Fails with `Conflict` if a summary
  /// already exists for the id, or `NotFound` if the submission does not.
  fn create_summary(
    &self,
    summary: Summary,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  /// Replace an existing summary and its breakdown in full.
  /// Fails with `NotFound` if no summary exists for the id.
  fn update_summary(
    &self,
    summary: Summary,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  /// Create-or-replace a summary and its breakdown in one transaction.
  fn upsert_summary(
    &self,
    summary: Summary,
  ) -> impl Future<Output = Result<Upsert, Self::Error>> + Send + '_;

  /// Summaries sorted by id; only [`SortField::Id`](crate::query::SortField)
  /// is accepted.
  fn list_summaries<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Summary>, Self::Error>> + Send + 'a;

  /// Every analyzed submission joined with its breakdown, in id order.
  fn breakdowns_with_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<(Submission, Breakdown)>, Self::Error>> + Send + '_;

  // ── Narratives ────────────────────────────────────────────────────────

  fn get_narrative(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Narrative>, Self::Error>> + Send + '_;

  /// Create-or-replace the narrative of submission `narrative.id`.
  /// Fails with `NotFound` if the submission does not exist.
  fn upsert_narrative(
    &self,
    narrative: Narrative,
  ) -> impl Future<Output = Result<Upsert, Self::Error>> + Send + '_;

  /// Submissions with no narrative yet, oldest id first.
  fn unnarrated_submissions(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  // ── Housekeeping ──────────────────────────────────────────────────────

  fn counts(&self) -> impl Future<Output = Result<StoreCounts, Self::Error>> + Send + '_;
}
