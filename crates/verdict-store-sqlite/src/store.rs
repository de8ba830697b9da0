//! [`SqliteStore`]: the SQLite implementation of [`ForumStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::{
  Connection, OptionalExtension as _, Row, params, params_from_iter, types::Value,
};
use tracing::debug;
use verdict_core::{
  Entity, Error as CoreError,
  comment::{Comment, RemoteComment},
  narrative::Narrative,
  query::{
    ListQuery, MonthSelector, Page, SubmissionFilter, SubmissionMatch, TimeWindow,
    TopQuery, TopSubmission,
  },
  store::{ForumStore, StoreCounts, Upsert},
  submission::{IndexEntry, RemoteSubmission, Submission},
  summary::{Breakdown, Summary},
};

use crate::{
  Result,
  encode::{
    BREAKDOWN_COLUMNS, COMMENT_COLUMNS, EncodedSummary, RawSummary, SUBMISSION_COLUMNS,
    SUMMARY_COLUMNS, breakdown_from_row, comment_from_row, comment_order, fts_query,
    index_entry_from_row, keyword_column, submission_from_row, submission_order,
    summary_order,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Verdict forum store backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the shared connection. Every clone fails afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the database thread) ────────────────────────────────

fn submission_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Submission>> {
  conn
    .query_row(
      &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.id = ?1"),
      params![id],
      submission_from_row,
    )
    .optional()
}

fn submission_by_remote_id(
  conn: &Connection,
  remote_id: &str,
) -> rusqlite::Result<Option<Submission>> {
  conn
    .query_row(
      &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.remote_id = ?1"),
      params![remote_id],
      submission_from_row,
    )
    .optional()
}

fn insert_submission(
  conn: &Connection,
  input: RemoteSubmission,
) -> rusqlite::Result<Submission> {
  conn.execute(
    "INSERT INTO submissions (remote_id, title, body_text, created_utc, permalink, score)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      input.remote_id,
      input.title,
      input.body_text,
      input.created_utc,
      input.permalink,
      input.score,
    ],
  )?;
  Ok(Submission {
    id:          conn.last_insert_rowid(),
    remote_id:   input.remote_id,
    title:       input.title,
    body_text:   input.body_text,
    created_utc: input.created_utc,
    permalink:   input.permalink,
    score:       input.score,
  })
}

/// Overwrite the mutable columns; `None` if `id` does not exist.
fn update_submission_row(
  conn: &Connection,
  id: i64,
  input: &RemoteSubmission,
) -> rusqlite::Result<Option<Submission>> {
  let changed = conn.execute(
    "UPDATE submissions SET title = ?2, body_text = ?3, permalink = ?4, score = ?5
     WHERE id = ?1",
    params![id, input.title, input.body_text, input.permalink, input.score],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  submission_by_id(conn, id)
}

fn comment_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Comment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?1"),
      params![id],
      comment_from_row,
    )
    .optional()
}

fn comment_by_remote_id(
  conn: &Connection,
  remote_id: &str,
) -> rusqlite::Result<Option<Comment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.remote_id = ?1"),
      params![remote_id],
      comment_from_row,
    )
    .optional()
}

fn submission_exists(conn: &Connection, remote_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM submissions WHERE remote_id = ?1",
        params![remote_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn insert_comment(conn: &Connection, input: RemoteComment) -> rusqlite::Result<Comment> {
  conn.execute(
    "INSERT INTO comments (
       remote_id, remote_submission_id, parent_id, message, created_utc, score
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      input.remote_id,
      input.remote_submission_id,
      input.parent_id,
      input.message,
      input.created_utc,
      input.score,
    ],
  )?;
  Ok(Comment {
    id:                   conn.last_insert_rowid(),
    remote_id:            input.remote_id,
    remote_submission_id: input.remote_submission_id,
    parent_id:            input.parent_id,
    message:              input.message,
    created_utc:          input.created_utc,
    score:                input.score,
  })
}

fn update_comment_row(
  conn: &Connection,
  id: i64,
  input: &RemoteComment,
) -> rusqlite::Result<Option<Comment>> {
  let changed = conn.execute(
    "UPDATE comments SET message = ?2, score = ?3 WHERE id = ?1",
    params![id, input.message, input.score],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  comment_by_id(conn, id)
}

fn summary_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM summaries WHERE id = ?1", params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn submission_id_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM submissions WHERE id = ?1", params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn insert_summary_row(conn: &Connection, s: &EncodedSummary) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO summaries (
       id, sentiment_score, emotion_scores, top_tokens, keyword_counts, comment_count
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      s.id,
      s.sentiment_score,
      s.emotion_scores,
      s.top_tokens,
      s.keyword_counts,
      s.comment_count,
    ],
  )?;
  Ok(())
}

fn update_summary_row(conn: &Connection, s: &EncodedSummary) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE summaries SET sentiment_score = ?2, emotion_scores = ?3, top_tokens = ?4,
       keyword_counts = ?5, comment_count = ?6
     WHERE id = ?1",
    params![
      s.id,
      s.sentiment_score,
      s.emotion_scores,
      s.top_tokens,
      s.keyword_counts,
      s.comment_count,
    ],
  )?;
  Ok(())
}

fn write_breakdown(conn: &Connection, b: &Breakdown) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO breakdowns (id, nta, yta, esh, info, nah)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT (id) DO UPDATE SET
       nta = excluded.nta, yta = excluded.yta, esh = excluded.esh,
       info = excluded.info, nah = excluded.nah",
    params![b.id, b.nta, b.yta, b.esh, b.info, b.nah],
  )?;
  Ok(())
}

/// Run a count and a page query over the same `FROM … WHERE …` clause in one
/// read transaction so `total` and `items` agree.
#[allow(clippy::too_many_arguments)]
fn page_of<T, F>(
  conn: &mut Connection,
  columns: &str,
  from_where: &str,
  order: &str,
  mut args: Vec<Value>,
  limit: u32,
  offset: u32,
  map: F,
) -> rusqlite::Result<Page<T>>
where
  F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
  let tx = conn.transaction()?;
  let total: i64 = tx.query_row(
    &format!("SELECT COUNT(*) {from_where}"),
    params_from_iter(args.iter()),
    |r| r.get(0),
  )?;

  let n = args.len();
  let sql = format!(
    "SELECT {columns} {from_where} ORDER BY {order} LIMIT ?{} OFFSET ?{}",
    n + 1,
    n + 2
  );
  args.push(Value::Integer(limit.into()));
  args.push(Value::Integer(offset.into()));

  let items = {
    let mut stmt = tx.prepare(&sql)?;
    stmt
      .query_map(params_from_iter(args.iter()), map)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  tx.commit()?;

  Ok(Page { items, total: total.max(0) as u64 })
}

fn collect_submissions(
  conn: &Connection,
  sql: &str,
  args: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Submission>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(args, submission_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── ForumStore impl ─────────────────────────────────────────────────────────

impl ForumStore for SqliteStore {
  type Error = crate::Error;

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
    Ok(self.conn.call(move |conn| Ok(submission_by_id(conn, id)?)).await?)
  }

  async fn find_submission(&self, remote_id: &str) -> Result<Option<Submission>> {
    let remote_id = remote_id.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| Ok(submission_by_remote_id(conn, &remote_id)?))
        .await?,
    )
  }

  async fn create_submission(&self, input: RemoteSubmission) -> Result<Submission> {
    let outcome: verdict_core::Result<Submission> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if submission_by_remote_id(&tx, &input.remote_id)?.is_some() {
          return Ok(Err(CoreError::conflict(Entity::Submission, input.remote_id)));
        }
        let submission = insert_submission(&tx, input)?;
        tx.commit()?;
        Ok(Ok(submission))
      })
      .await?;

    let submission = outcome?;
    debug!(id = submission.id, remote_id = %submission.remote_id, "submission created");
    Ok(submission)
  }

  async fn update_submission(&self, id: i64, input: RemoteSubmission) -> Result<Submission> {
    let updated = self
      .conn
      .call(move |conn| Ok(update_submission_row(conn, id, &input)?))
      .await?;
    Ok(updated.ok_or_else(|| CoreError::not_found(Entity::Submission, id))?)
  }

  async fn upsert_submission(&self, input: RemoteSubmission) -> Result<(Submission, Upsert)> {
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let result = match submission_by_remote_id(&tx, &input.remote_id)? {
          Some(existing) => {
            let updated = update_submission_row(&tx, existing.id, &input)?;
            (updated.unwrap_or(existing), Upsert::Updated)
          }
          None => (insert_submission(&tx, input)?, Upsert::Inserted),
        };
        tx.commit()?;
        Ok(result)
      })
      .await?;

    debug!(id = result.0.id, outcome = ?result.1, "submission upserted");
    Ok(result)
  }

  async fn list_submissions(&self, query: &ListQuery) -> Result<Page<Submission>> {
    let order = submission_order(query);
    let (limit, offset) = (query.limit(), query.offset());

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(page_of(
            conn,
            SUBMISSION_COLUMNS,
            "FROM submissions s",
            &order,
            Vec::new(),
            limit,
            offset,
            submission_from_row,
          )?)
        })
        .await?,
    )
  }

  async fn search_submissions(
    &self,
    filter: &SubmissionFilter,
    query: &ListQuery,
  ) -> Result<Page<Submission>> {
    let (from_where, args) = match filter.resolve() {
      SubmissionMatch::RemoteId(remote_id) => (
        "FROM submissions s WHERE s.remote_id = ?1",
        vec![Value::Text(remote_id.to_owned())],
      ),
      SubmissionMatch::Window(TimeWindow { start, end }) => (
        "FROM submissions s WHERE s.created_utc BETWEEN ?1 AND ?2",
        vec![Value::Integer(start), Value::Integer(end)],
      ),
      SubmissionMatch::Nothing => return Ok(Page::empty()),
    };
    let order = submission_order(query);
    let (limit, offset) = (query.limit(), query.offset());

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(page_of(
            conn,
            SUBMISSION_COLUMNS,
            from_where,
            &order,
            args,
            limit,
            offset,
            submission_from_row,
          )?)
        })
        .await?,
    )
  }

  async fn unanalyzed_submissions(&self, limit: u32) -> Result<Vec<Submission>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(collect_submissions(
            conn,
            &format!(
              "SELECT {SUBMISSION_COLUMNS} FROM submissions s
               LEFT JOIN summaries m ON m.id = s.id
               WHERE m.id IS NULL
               ORDER BY s.id ASC
               LIMIT ?1"
            ),
            params![limit],
          )?)
        })
        .await?,
    )
  }

  async fn submissions_in_window(
    &self,
    window: TimeWindow,
    limit: u32,
  ) -> Result<Vec<Submission>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(collect_submissions(
            conn,
            &format!(
              "SELECT {SUBMISSION_COLUMNS} FROM submissions s
               WHERE s.created_utc BETWEEN ?1 AND ?2
               ORDER BY s.id ASC
               LIMIT ?3"
            ),
            params![window.start, window.end, limit],
          )?)
        })
        .await?,
    )
  }

  async fn submission_index(&self) -> Result<Vec<IndexEntry>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn
            .prepare("SELECT s.id, s.title, s.created_utc FROM submissions s ORDER BY s.id")?;
          let rows = stmt
            .query_map([], index_entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn submissions_by_ids(&self, ids: &[i64]) -> Result<Vec<Submission>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let wanted = ids.to_vec();
    let placeholders = vec!["?"; wanted.len()].join(", ");
    let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.id IN ({placeholders})");

    let mut found: HashMap<i64, Submission> = self
      .conn
      .call(move |conn| Ok(collect_submissions(conn, &sql, params_from_iter(wanted.iter()))?))
      .await?
      .into_iter()
      .map(|s| (s.id, s))
      .collect();
    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
  }

  async fn text_search(&self, text: &str, limit: u32) -> Result<Vec<Submission>> {
    let Some(fts) = fts_query(text) else {
      return Ok(Vec::new());
    };

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(collect_submissions(
            conn,
            &format!(
              "SELECT {SUBMISSION_COLUMNS} FROM submission_fts
               JOIN submissions s ON s.id = submission_fts.rowid
               WHERE submission_fts MATCH ?1
               ORDER BY bm25(submission_fts), s.id
               LIMIT ?2"
            ),
            params![fts, limit],
          )?)
        })
        .await?,
    )
  }

  async fn random_submission(&self) -> Result<Option<Submission>> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(
            conn
              .query_row(
                &format!(
                  "SELECT {SUBMISSION_COLUMNS} FROM submissions s ORDER BY RANDOM() LIMIT 1"
                ),
                [],
                submission_from_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn top_submissions(&self, query: &TopQuery) -> Result<Vec<TopSubmission>> {
    let column = keyword_column(query.category);
    let year = format!("{:04}", query.year);

    let (period, month_filter, month) = match query.month {
      MonthSelector::Month(m) => (
        "strftime('%Y-%m', s.created_utc, 'unixepoch')",
        "AND strftime('%m', s.created_utc, 'unixepoch') = ?2",
        Some(format!("{m:02}")),
      ),
      MonthSelector::AllMonths => ("strftime('%Y', s.created_utc, 'unixepoch')", "", None),
    };

    // One winner per period: highest counter, lowest id on ties.
    let sql = format!(
      "WITH ranked AS (
         SELECT {SUBMISSION_COLUMNS},
                b.{column} AS winning_count,
                {period} AS period,
                ROW_NUMBER() OVER (
                  PARTITION BY {period}
                  ORDER BY b.{column} DESC, s.id ASC
                ) AS position
         FROM submissions s
         INNER JOIN breakdowns b ON b.id = s.id
         WHERE strftime('%Y', s.created_utc, 'unixepoch') = ?1
         {month_filter}
       )
       SELECT id, remote_id, title, body_text, created_utc, permalink, score,
              winning_count, period
       FROM ranked
       WHERE position = 1
       ORDER BY period ASC"
    );

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut args = vec![Value::Text(year)];
          if let Some(m) = month {
            args.push(Value::Text(m));
          }
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
              Ok(TopSubmission {
                submission: submission_from_row(row)?,
                count:      row.get(7)?,
                period:     row.get(8)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
    Ok(self.conn.call(move |conn| Ok(comment_by_id(conn, id)?)).await?)
  }

  async fn find_comment(&self, remote_id: &str) -> Result<Option<Comment>> {
    let remote_id = remote_id.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| Ok(comment_by_remote_id(conn, &remote_id)?))
        .await?,
    )
  }

  async fn create_comment(&self, input: RemoteComment) -> Result<Comment> {
    let outcome: verdict_core::Result<Comment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if comment_by_remote_id(&tx, &input.remote_id)?.is_some() {
          return Ok(Err(CoreError::conflict(Entity::Comment, input.remote_id)));
        }
        if !submission_exists(&tx, &input.remote_submission_id)? {
          return Ok(Err(CoreError::not_found(
            Entity::Submission,
            input.remote_submission_id,
          )));
        }
        let comment = insert_comment(&tx, input)?;
        tx.commit()?;
        Ok(Ok(comment))
      })
      .await?;
    Ok(outcome?)
  }

  async fn update_comment(&self, id: i64, input: RemoteComment) -> Result<Comment> {
    let updated = self
      .conn
      .call(move |conn| Ok(update_comment_row(conn, id, &input)?))
      .await?;
    Ok(updated.ok_or_else(|| CoreError::not_found(Entity::Comment, id))?)
  }

  async fn upsert_comment(&self, input: RemoteComment) -> Result<(Comment, Upsert)> {
    let outcome: verdict_core::Result<(Comment, Upsert)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let result = match comment_by_remote_id(&tx, &input.remote_id)? {
          Some(existing) => {
            let updated = update_comment_row(&tx, existing.id, &input)?;
            (updated.unwrap_or(existing), Upsert::Updated)
          }
          None => {
            if !submission_exists(&tx, &input.remote_submission_id)? {
              return Ok(Err(CoreError::not_found(
                Entity::Submission,
                input.remote_submission_id,
              )));
            }
            (insert_comment(&tx, input)?, Upsert::Inserted)
          }
        };
        tx.commit()?;
        Ok(Ok(result))
      })
      .await?;
    Ok(outcome?)
  }

  async fn list_comments(&self, query: &ListQuery) -> Result<Page<Comment>> {
    let order = comment_order(query)?;
    let (limit, offset) = (query.limit(), query.offset());

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(page_of(
            conn,
            COMMENT_COLUMNS,
            "FROM comments c",
            &order,
            Vec::new(),
            limit,
            offset,
            comment_from_row,
          )?)
        })
        .await?,
    )
  }

  async fn comments_for_submission(
    &self,
    remote_submission_id: &str,
    query: &ListQuery,
  ) -> Result<Page<Comment>> {
    let order = comment_order(query)?;
    let (limit, offset) = (query.limit(), query.offset());
    let args = vec![Value::Text(remote_submission_id.to_owned())];

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(page_of(
            conn,
            COMMENT_COLUMNS,
            "FROM comments c WHERE c.remote_submission_id = ?1",
            &order,
            args,
            limit,
            offset,
            comment_from_row,
          )?)
        })
        .await?,
    )
  }

  async fn all_comments_for_submission(
    &self,
    remote_submission_id: &str,
  ) -> Result<Vec<Comment>> {
    let remote_submission_id = remote_submission_id.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c
             WHERE c.remote_submission_id = ?1
             ORDER BY c.id ASC"
          ))?;
          let rows = stmt
            .query_map(params![remote_submission_id], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Summaries & breakdowns ────────────────────────────────────────────────

  async fn get_summary(&self, id: i64) -> Result<Option<Summary>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUMMARY_COLUMNS} FROM summaries m WHERE m.id = ?1"),
              params![id],
              RawSummary::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSummary::into_summary).transpose()
  }

  async fn get_breakdown(&self, id: i64) -> Result<Option<Breakdown>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {BREAKDOWN_COLUMNS} FROM breakdowns b WHERE b.id = ?1"),
                params![id],
                |row| breakdown_from_row(row, 0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn create_summary(&self, summary: Summary) -> Result<Summary> {
    let encoded = EncodedSummary::encode(&summary)?;

    let outcome: verdict_core::Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !submission_id_exists(&tx, encoded.id)? {
          return Ok(Err(CoreError::not_found(Entity::Submission, encoded.id)));
        }
        if summary_exists(&tx, encoded.id)? {
          return Ok(Err(CoreError::conflict(Entity::Summary, encoded.id)));
        }
        insert_summary_row(&tx, &encoded)?;
        write_breakdown(&tx, &encoded.breakdown)?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    Ok(summary)
  }

  async fn update_summary(&self, summary: Summary) -> Result<Summary> {
    let encoded = EncodedSummary::encode(&summary)?;

    let outcome: verdict_core::Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !summary_exists(&tx, encoded.id)? {
          return Ok(Err(CoreError::not_found(Entity::Summary, encoded.id)));
        }
        update_summary_row(&tx, &encoded)?;
        write_breakdown(&tx, &encoded.breakdown)?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    Ok(summary)
  }

  async fn upsert_summary(&self, summary: Summary) -> Result<Upsert> {
    let encoded = EncodedSummary::encode(&summary)?;

    let outcome: verdict_core::Result<Upsert> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !submission_id_exists(&tx, encoded.id)? {
          return Ok(Err(CoreError::not_found(Entity::Submission, encoded.id)));
        }
        let upsert = if summary_exists(&tx, encoded.id)? {
          update_summary_row(&tx, &encoded)?;
          Upsert::Updated
        } else {
          insert_summary_row(&tx, &encoded)?;
          Upsert::Inserted
        };
        write_breakdown(&tx, &encoded.breakdown)?;
        tx.commit()?;
        Ok(Ok(upsert))
      })
      .await?;

    let upsert = outcome?;
    debug!(id = summary.id, outcome = ?upsert, "summary upserted");
    Ok(upsert)
  }

  async fn list_summaries(&self, query: &ListQuery) -> Result<Page<Summary>> {
    let order = summary_order(query)?;
    let (limit, offset) = (query.limit(), query.offset());

    let raw = self
      .conn
      .call(move |conn| {
        Ok(page_of(
          conn,
          SUMMARY_COLUMNS,
          "FROM summaries m",
          &order,
          Vec::new(),
          limit,
          offset,
          RawSummary::from_row,
        )?)
      })
      .await?;

    Ok(Page {
      items: raw
        .items
        .into_iter()
        .map(RawSummary::into_summary)
        .collect::<Result<_>>()?,
      total: raw.total,
    })
  }

  async fn breakdowns_with_submissions(&self) -> Result<Vec<(Submission, Breakdown)>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS}, {BREAKDOWN_COLUMNS}
             FROM submissions s
             INNER JOIN breakdowns b ON b.id = s.id
             ORDER BY s.id ASC"
          ))?;
          let rows = stmt
            .query_map([], |row| Ok((submission_from_row(row)?, breakdown_from_row(row, 7)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Narratives ────────────────────────────────────────────────────────────

  async fn get_narrative(&self, id: i64) -> Result<Option<Narrative>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row("SELECT id, text FROM narratives WHERE id = ?1", params![id], |r| {
                Ok(Narrative { id: r.get(0)?, text: r.get(1)? })
              })
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn upsert_narrative(&self, narrative: Narrative) -> Result<Upsert> {
    let id = narrative.id;
    let outcome: verdict_core::Result<Upsert> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !submission_id_exists(&tx, narrative.id)? {
          return Ok(Err(CoreError::not_found(Entity::Submission, narrative.id)));
        }
        let updated = tx.execute(
          "UPDATE narratives SET text = ?2 WHERE id = ?1",
          params![narrative.id, narrative.text],
        )?;
        let upsert = if updated > 0 {
          Upsert::Updated
        } else {
          tx.execute(
            "INSERT INTO narratives (id, text) VALUES (?1, ?2)",
            params![narrative.id, narrative.text],
          )?;
          Upsert::Inserted
        };
        tx.commit()?;
        Ok(Ok(upsert))
      })
      .await?;

    let upsert = outcome?;
    debug!(id, outcome = ?upsert, "narrative upserted");
    Ok(upsert)
  }

  async fn unnarrated_submissions(&self, limit: u32) -> Result<Vec<Submission>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(collect_submissions(
            conn,
            &format!(
              "SELECT {SUBMISSION_COLUMNS} FROM submissions s
               LEFT JOIN narratives n ON n.id = s.id
               WHERE n.id IS NULL
               ORDER BY s.id ASC
               LIMIT ?1"
            ),
            params![limit],
          )?)
        })
        .await?,
    )
  }

  // ── Housekeeping ──────────────────────────────────────────────────────────

  async fn counts(&self) -> Result<StoreCounts> {
    Ok(
      self
        .conn
        .call(|conn| {
          let count = |table: &str| -> rusqlite::Result<u64> {
            let n: i64 =
              conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n.max(0) as u64)
          };
          Ok(StoreCounts {
            submissions: count("submissions")?,
            comments:    count("comments")?,
            summaries:   count("summaries")?,
            narratives:  count("narratives")?,
          })
        })
        .await?,
    )
  }
}
