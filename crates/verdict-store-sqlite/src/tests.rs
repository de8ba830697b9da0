//! Integration tests for `SqliteStore` against an in-memory database.

use verdict_core::{
  Classify as _,
  comment::RemoteComment,
  narrative::Narrative,
  query::{
    ListQuery, MonthSelector, SortField, SortOrder, SubmissionFilter, TimeWindow,
    TopQuery,
  },
  store::{ForumStore, Upsert},
  submission::RemoteSubmission,
  summary::{Analysis, KeywordCategory, Summary, TokenCount},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// 2023-01-01T00:00:00Z
const JAN_2023: i64 = 1_672_531_200;

fn remote(remote_id: &str, created_utc: i64, score: i64) -> RemoteSubmission {
  RemoteSubmission {
    remote_id: remote_id.into(),
    title: format!("AITA for post {remote_id}?"),
    body_text: "My sister asked me to host her wedding and I said no.".into(),
    created_utc,
    permalink: format!("/r/AmItheAsshole/comments/{remote_id}/"),
    score,
  }
}

fn comment(remote_id: &str, submission: &str, message: &str) -> RemoteComment {
  RemoteComment {
    remote_id:            remote_id.into(),
    remote_submission_id: submission.into(),
    parent_id:            format!("t3_{submission}"),
    message:              message.into(),
    created_utc:          JAN_2023 + 60,
    score:                1,
  }
}

fn query(offset: u32, limit: u32, sort: SortField, order: SortOrder) -> ListQuery {
  ListQuery::new(offset, limit, sort, order).unwrap()
}

fn summary_with_yta(id: i64, yta: u32) -> Summary {
  let mut analysis = Analysis::default();
  analysis.keyword_counts.set(KeywordCategory::Yta, yta);
  Summary::new(id, analysis, yta)
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_submission() {
  let s = store().await;

  let created = s.create_submission(remote("abc123", JAN_2023, 10)).await.unwrap();
  assert!(created.id > 0);

  let fetched = s.get_submission(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let by_key = s.find_submission("abc123").await.unwrap().unwrap();
  assert_eq!(by_key.id, created.id);
}

#[tokio::test]
async fn get_missing_submission_returns_none() {
  let s = store().await;
  assert!(s.get_submission(42).await.unwrap().is_none());
  assert!(s.find_submission("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_remote_id_is_a_conflict() {
  let s = store().await;
  s.create_submission(remote("abc123", JAN_2023, 10)).await.unwrap();

  let err = s
    .create_submission(remote("abc123", JAN_2023, 11))
    .await
    .unwrap_err();
  assert!(err.is_conflict());

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.submissions, 1);
}

#[tokio::test]
async fn update_refreshes_score_and_keeps_identity() {
  let s = store().await;
  let created = s.create_submission(remote("abc123", JAN_2023, 10)).await.unwrap();

  let mut changed = remote("abc123", JAN_2023 + 999, 250);
  changed.title = "AITA (edited)".into();
  let updated = s.update_submission(created.id, changed).await.unwrap();

  assert_eq!(updated.id, created.id);
  assert_eq!(updated.score, 250);
  assert_eq!(updated.title, "AITA (edited)");
  assert_eq!(updated.created_utc, JAN_2023);
}

#[tokio::test]
async fn update_missing_submission_is_not_found() {
  let s = store().await;
  let err = s
    .update_submission(7, remote("abc123", JAN_2023, 1))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn upsert_submission_inserts_then_updates() {
  let s = store().await;

  let (first, outcome) = s.upsert_submission(remote("abc123", JAN_2023, 10)).await.unwrap();
  assert_eq!(outcome, Upsert::Inserted);

  let (second, outcome) = s.upsert_submission(remote("abc123", JAN_2023, 15)).await.unwrap();
  assert_eq!(outcome, Upsert::Updated);
  assert_eq!(second.id, first.id);
  assert_eq!(second.score, 15);
}

#[tokio::test]
async fn pages_partition_the_listing() {
  let s = store().await;
  for i in 0..7 {
    s.create_submission(remote(&format!("r{i}"), JAN_2023 + i, 100 - i))
      .await
      .unwrap();
  }

  let mut seen = Vec::new();
  for offset in (0..7).step_by(3) {
    let page = s
      .list_submissions(&query(offset, 3, SortField::Id, SortOrder::Asc))
      .await
      .unwrap();
    assert_eq!(page.total, 7);
    seen.extend(page.items.into_iter().map(|p| p.id));
  }

  let mut sorted = seen.clone();
  sorted.sort_unstable();
  sorted.dedup();
  assert_eq!(seen, sorted);
  assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn listing_honours_sort_and_order() {
  let s = store().await;
  s.create_submission(remote("a", JAN_2023, 5)).await.unwrap();
  s.create_submission(remote("b", JAN_2023 + 1, 50)).await.unwrap();
  s.create_submission(remote("c", JAN_2023 + 2, 20)).await.unwrap();

  let page = s
    .list_submissions(&query(0, 10, SortField::Score, SortOrder::Desc))
    .await
    .unwrap();
  let scores: Vec<i64> = page.items.iter().map(|p| p.score).collect();
  assert_eq!(scores, vec![50, 20, 5]);

  let page = s.list_submissions(&ListQuery::default()).await.unwrap();
  let keys: Vec<&str> = page.items.iter().map(|p| p.remote_id.as_str()).collect();
  assert_eq!(keys, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn search_by_key_window_or_nothing() {
  let s = store().await;
  s.create_submission(remote("early", JAN_2023, 1)).await.unwrap();
  s.create_submission(remote("mid", JAN_2023 + 100, 1)).await.unwrap();
  s.create_submission(remote("late", JAN_2023 + 200, 1)).await.unwrap();
  let q = ListQuery::default();

  let by_key = SubmissionFilter { remote_id: Some("mid".into()), ..Default::default() };
  let page = s.search_submissions(&by_key, &q).await.unwrap();
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].remote_id, "mid");

  let window = SubmissionFilter {
    created_after: Some(JAN_2023 + 100),
    created_before: Some(JAN_2023 + 200),
    ..Default::default()
  };
  let page = s.search_submissions(&window, &q).await.unwrap();
  assert_eq!(page.total, 2);

  let half_open = SubmissionFilter { created_after: Some(JAN_2023), ..Default::default() };
  let page = s.search_submissions(&half_open, &q).await.unwrap();
  assert!(page.items.is_empty());
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn random_submission_on_empty_and_populated_store() {
  let s = store().await;
  assert!(s.random_submission().await.unwrap().is_none());

  s.create_submission(remote("only", JAN_2023, 1)).await.unwrap();
  let picked = s.random_submission().await.unwrap().unwrap();
  assert_eq!(picked.remote_id, "only");
}

#[tokio::test]
async fn text_search_matches_title_and_body() {
  let s = store().await;
  let mut wedding = remote("w1", JAN_2023, 1);
  wedding.title = "AITA for skipping the wedding".into();
  s.create_submission(wedding).await.unwrap();

  let mut rent = remote("r1", JAN_2023, 1);
  rent.title = "WIBTA for raising rent".into();
  rent.body_text = "My roommate never pays on time.".into();
  s.create_submission(rent).await.unwrap();

  let hits = s.text_search("wedding", 10).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].remote_id, "w1");

  let hits = s.text_search("roommate", 10).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].remote_id, "r1");

  assert!(s.text_search("   ", 10).await.unwrap().is_empty());
  assert!(s.text_search("\"NEAR(", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn submissions_by_ids_keeps_requested_order() {
  let s = store().await;
  let a = s.create_submission(remote("a", JAN_2023, 1)).await.unwrap();
  let b = s.create_submission(remote("b", JAN_2023, 1)).await.unwrap();
  let c = s.create_submission(remote("c", JAN_2023, 1)).await.unwrap();

  let found = s.submissions_by_ids(&[c.id, 999, a.id, b.id]).await.unwrap();
  let ids: Vec<_> = found.iter().map(|s| s.remote_id.as_str()).collect();
  assert_eq!(ids, ["c", "a", "b"]);

  assert!(s.submissions_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn text_search_follows_updates() {
  let s = store().await;
  let created = s.create_submission(remote("x", JAN_2023, 1)).await.unwrap();

  let mut edited = remote("x", JAN_2023, 1);
  edited.title = "AITA about a parrot".into();
  s.update_submission(created.id, edited).await.unwrap();

  assert_eq!(s.text_search("parrot", 10).await.unwrap().len(), 1);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_requires_existing_submission() {
  let s = store().await;
  let err = s
    .create_comment(comment("c1", "ghost", "NTA"))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn comments_are_unique_and_scoped_to_submission() {
  let s = store().await;
  s.create_submission(remote("abc123", JAN_2023, 1)).await.unwrap();
  s.create_submission(remote("other", JAN_2023, 1)).await.unwrap();

  s.create_comment(comment("c1", "abc123", "NTA")).await.unwrap();
  s.create_comment(comment("c2", "abc123", "YTA")).await.unwrap();
  s.create_comment(comment("c3", "other", "ESH")).await.unwrap();

  let err = s
    .create_comment(comment("c1", "abc123", "NTA again"))
    .await
    .unwrap_err();
  assert!(err.is_conflict());

  let page = s
    .comments_for_submission("abc123", &query(0, 10, SortField::Id, SortOrder::Asc))
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.items[0].remote_id, "c1");

  let all = s.all_comments_for_submission("abc123").await.unwrap();
  assert_eq!(all.len(), 2);

  let everything = s.list_comments(&ListQuery::default()).await.unwrap();
  assert_eq!(everything.total, 3);
}

#[tokio::test]
async fn upsert_comment_refreshes_message() {
  let s = store().await;
  s.create_submission(remote("abc123", JAN_2023, 1)).await.unwrap();

  let (first, outcome) = s.upsert_comment(comment("c1", "abc123", "NTA")).await.unwrap();
  assert_eq!(outcome, Upsert::Inserted);

  let (second, outcome) = s
    .upsert_comment(comment("c1", "abc123", "edit: YTA"))
    .await
    .unwrap();
  assert_eq!(outcome, Upsert::Updated);
  assert_eq!(second.id, first.id);
  assert_eq!(second.message, "edit: YTA");
}

#[tokio::test]
async fn comments_reject_title_sort() {
  let s = store().await;
  let err = s
    .list_comments(&query(0, 10, SortField::Title, SortOrder::Asc))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdict_core::Error::Validation(_))
  ));
}

// ─── Summaries ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_round_trips_with_breakdown() {
  let s = store().await;
  let sub = s.create_submission(remote("abc123", JAN_2023, 1)).await.unwrap();

  let mut analysis = Analysis::default();
  analysis.sentiment_score = -3.0;
  analysis.emotion_scores.insert("anger".into(), 2);
  analysis.top_tokens.push(TokenCount { token: "nta".into(), count: 4 });
  analysis.keyword_counts.set(KeywordCategory::Nta, 4);
  let summary = Summary::new(sub.id, analysis, 5);

  s.create_summary(summary.clone()).await.unwrap();

  let stored = s.get_summary(sub.id).await.unwrap().unwrap();
  assert_eq!(stored, summary);

  let breakdown = s.get_breakdown(sub.id).await.unwrap().unwrap();
  assert_eq!(breakdown, summary.breakdown());

  let err = s.create_summary(summary).await.unwrap_err();
  assert!(err.is_conflict());
}

#[tokio::test]
async fn summary_for_missing_submission_is_not_found() {
  let s = store().await;
  let err = s.upsert_summary(summary_with_yta(99, 1)).await.unwrap_err();
  assert!(err.is_not_found());

  let err = s.update_summary(summary_with_yta(99, 1)).await.unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn upsert_summary_replaces_in_full() {
  let s = store().await;
  let sub = s.create_submission(remote("abc123", JAN_2023, 1)).await.unwrap();

  assert_eq!(
    s.upsert_summary(summary_with_yta(sub.id, 1)).await.unwrap(),
    Upsert::Inserted
  );
  assert_eq!(
    s.upsert_summary(summary_with_yta(sub.id, 9)).await.unwrap(),
    Upsert::Updated
  );

  let breakdown = s.get_breakdown(sub.id).await.unwrap().unwrap();
  assert_eq!(breakdown.yta, 9);
  assert_eq!(s.counts().await.unwrap().summaries, 1);
}

#[tokio::test]
async fn unanalyzed_and_windowed_selection() {
  let s = store().await;
  let a = s.create_submission(remote("a", JAN_2023, 1)).await.unwrap();
  let b = s.create_submission(remote("b", JAN_2023 + 86_400, 1)).await.unwrap();
  s.upsert_summary(summary_with_yta(a.id, 1)).await.unwrap();

  let pending = s.unanalyzed_submissions(10).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, b.id);

  let window = TimeWindow { start: JAN_2023, end: JAN_2023 + 3_600 };
  let in_window = s.submissions_in_window(window, 10).await.unwrap();
  assert_eq!(in_window.len(), 1);
  assert_eq!(in_window[0].id, a.id);
}

#[tokio::test]
async fn list_summaries_only_sorts_by_id() {
  let s = store().await;
  for key in ["a", "b"] {
    let sub = s.create_submission(remote(key, JAN_2023, 1)).await.unwrap();
    s.upsert_summary(summary_with_yta(sub.id, 1)).await.unwrap();
  }

  let page = s
    .list_summaries(&query(0, 10, SortField::Id, SortOrder::Asc))
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  assert!(page.items[0].id < page.items[1].id);

  assert!(
    s.list_summaries(&query(0, 10, SortField::Score, SortOrder::Asc))
      .await
      .is_err()
  );
}

// ─── Top aggregation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn top_picks_highest_counter_for_the_month() {
  let s = store().await;
  let mut expected = None;
  for (i, yta) in [1u32, 5, 2].into_iter().enumerate() {
    let sub = s
      .create_submission(remote(&format!("jan{i}"), JAN_2023 + i as i64 * 86_400, 1))
      .await
      .unwrap();
    s.upsert_summary(summary_with_yta(sub.id, yta)).await.unwrap();
    if yta == 5 {
      expected = Some(sub.id);
    }
  }

  let top = s
    .top_submissions(&TopQuery {
      year:     2023,
      month:    MonthSelector::Month(1),
      category: KeywordCategory::Yta,
    })
    .await
    .unwrap();

  assert_eq!(top.len(), 1);
  assert_eq!(top[0].count, 5);
  assert_eq!(top[0].period, "2023-01");
  assert_eq!(Some(top[0].submission.id), expected);
}

#[tokio::test]
async fn top_breaks_ties_by_lowest_id_and_groups_years() {
  let s = store().await;
  let first = s.create_submission(remote("x", JAN_2023, 1)).await.unwrap();
  let second = s
    .create_submission(remote("y", JAN_2023 + 40 * 86_400, 1))
    .await
    .unwrap();
  s.upsert_summary(summary_with_yta(first.id, 3)).await.unwrap();
  s.upsert_summary(summary_with_yta(second.id, 3)).await.unwrap();

  let top = s
    .top_submissions(&TopQuery {
      year:     2023,
      month:    MonthSelector::AllMonths,
      category: KeywordCategory::Yta,
    })
    .await
    .unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].period, "2023");
  assert_eq!(top[0].submission.id, first.id);

  let none = s
    .top_submissions(&TopQuery {
      year:     2022,
      month:    MonthSelector::AllMonths,
      category: KeywordCategory::Yta,
    })
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn breakdowns_join_submissions() {
  let s = store().await;
  let sub = s.create_submission(remote("a", JAN_2023, 1)).await.unwrap();
  s.create_submission(remote("b", JAN_2023, 1)).await.unwrap();
  s.upsert_summary(summary_with_yta(sub.id, 2)).await.unwrap();

  let joined = s.breakdowns_with_submissions().await.unwrap();
  assert_eq!(joined.len(), 1);
  assert_eq!(joined[0].0.remote_id, "a");
  assert_eq!(joined[0].1.yta, 2);

  let index = s.submission_index().await.unwrap();
  assert_eq!(index.len(), 2);
}

// ─── Narratives ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn narrative_upsert_is_one_to_one() {
  let s = store().await;
  let sub = s.create_submission(remote("a", JAN_2023, 1)).await.unwrap();
  assert!(s.get_narrative(sub.id).await.unwrap().is_none());

  let first = Narrative { id: sub.id, text: "- defensive\n- apologize".into() };
  assert_eq!(s.upsert_narrative(first).await.unwrap(), Upsert::Inserted);

  let second = Narrative { id: sub.id, text: "- calm".into() };
  assert_eq!(s.upsert_narrative(second.clone()).await.unwrap(), Upsert::Updated);
  assert_eq!(s.get_narrative(sub.id).await.unwrap(), Some(second));
  assert_eq!(s.counts().await.unwrap().narratives, 1);
}

#[tokio::test]
async fn narrative_for_missing_submission_is_not_found() {
  let s = store().await;
  let err = s
    .upsert_narrative(Narrative { id: 42, text: "text".into() })
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn unnarrated_skips_submissions_with_a_narrative() {
  let s = store().await;
  let a = s.create_submission(remote("a", JAN_2023, 1)).await.unwrap();
  let b = s.create_submission(remote("b", JAN_2023, 1)).await.unwrap();
  s.upsert_narrative(Narrative { id: a.id, text: "done".into() })
    .await
    .unwrap();

  let pending = s.unnarrated_submissions(10).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, b.id);
}
