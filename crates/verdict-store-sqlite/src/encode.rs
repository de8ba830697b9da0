//! Encoding and decoding helpers between domain types and SQLite rows.
//!
//! Scalar fields map to native columns. The structured parts of a summary
//! (emotions, top tokens, keyword counts) are stored as compact JSON.

use rusqlite::Row;
use verdict_core::{
  Error as CoreError,
  comment::Comment,
  query::{ListQuery, SortField, SortOrder},
  submission::{IndexEntry, Submission},
  summary::{Breakdown, KeywordCategory, Summary},
};

use crate::Result;

// ─── Column lists ────────────────────────────────────────────────────────────

pub const SUBMISSION_COLUMNS: &str =
  "s.id, s.remote_id, s.title, s.body_text, s.created_utc, s.permalink, s.score";

pub const COMMENT_COLUMNS: &str = "c.id, c.remote_id, c.remote_submission_id, \
                                   c.parent_id, c.message, c.created_utc, c.score";

pub const SUMMARY_COLUMNS: &str = "m.id, m.sentiment_score, m.emotion_scores, \
                                   m.top_tokens, m.keyword_counts, m.comment_count";

pub const BREAKDOWN_COLUMNS: &str = "b.id, b.nta, b.yta, b.esh, b.info, b.nah";

// ─── Ordering ────────────────────────────────────────────────────────────────

fn direction(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

/// `ORDER BY` body for submissions aliased as `s`. Ties always fall back to
/// ascending id so pages are stable.
pub fn submission_order(query: &ListQuery) -> String {
  let dir = direction(query.order());
  match query.sort() {
    SortField::Id => format!("s.id {dir}"),
    SortField::Score => format!("s.score {dir}, s.id ASC"),
    SortField::Title => format!("s.title {dir}, s.id ASC"),
    SortField::Created => format!("s.created_utc {dir}, s.id ASC"),
  }
}

/// `ORDER BY` body for comments aliased as `c`. Comments have no title.
pub fn comment_order(query: &ListQuery) -> Result<String> {
  let dir = direction(query.order());
  match query.sort() {
    SortField::Id => Ok(format!("c.id {dir}")),
    SortField::Score => Ok(format!("c.score {dir}, c.id ASC")),
    SortField::Created => Ok(format!("c.created_utc {dir}, c.id ASC")),
    SortField::Title => {
      Err(CoreError::Validation("comments cannot be sorted by title".into()).into())
    }
  }
}

/// `ORDER BY` body for summaries aliased as `m`; only id is sortable.
pub fn summary_order(query: &ListQuery) -> Result<String> {
  match query.sort() {
    SortField::Id => Ok(format!("m.id {}", direction(query.order()))),
    other => Err(
      CoreError::Validation(format!("summaries cannot be sorted by {other}")).into(),
    ),
  }
}

pub fn keyword_column(category: KeywordCategory) -> &'static str {
  match category {
    KeywordCategory::Nta => "nta",
    KeywordCategory::Yta => "yta",
    KeywordCategory::Esh => "esh",
    KeywordCategory::Info => "info",
    KeywordCategory::Nah => "nah",
  }
}

// ─── Full-text queries ───────────────────────────────────────────────────────

/// Turn free user text into an FTS5 query that matches documents containing
/// every word. Each word is quoted so operators and column filters in the
/// input are treated as plain text. Returns `None` when nothing is left.
pub fn fts_query(text: &str) -> Option<String> {
  let terms: Vec<String> = text
    .split_whitespace()
    .map(|w| w.replace('"', ""))
    .filter(|w| !w.is_empty())
    .map(|w| format!("\"{w}\""))
    .collect();
  (!terms.is_empty()).then(|| terms.join(" "))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
  Ok(Submission {
    id:          row.get(0)?,
    remote_id:   row.get(1)?,
    title:       row.get(2)?,
    body_text:   row.get(3)?,
    created_utc: row.get(4)?,
    permalink:   row.get(5)?,
    score:       row.get(6)?,
  })
}

pub fn index_entry_from_row(row: &Row<'_>) -> rusqlite::Result<IndexEntry> {
  Ok(IndexEntry {
    id:          row.get(0)?,
    title:       row.get(1)?,
    created_utc: row.get(2)?,
  })
}

pub fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
  Ok(Comment {
    id:                   row.get(0)?,
    remote_id:            row.get(1)?,
    remote_submission_id: row.get(2)?,
    parent_id:            row.get(3)?,
    message:              row.get(4)?,
    created_utc:          row.get(5)?,
    score:                row.get(6)?,
  })
}

/// Reads `BREAKDOWN_COLUMNS` starting at column `offset`.
pub fn breakdown_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Breakdown> {
  Ok(Breakdown {
    id:   row.get(offset)?,
    nta:  row.get(offset + 1)?,
    yta:  row.get(offset + 2)?,
    esh:  row.get(offset + 3)?,
    info: row.get(offset + 4)?,
    nah:  row.get(offset + 5)?,
  })
}

/// Raw values read directly from a `summaries` row; JSON columns are still
/// strings.
pub struct RawSummary {
  pub id:              i64,
  pub sentiment_score: f64,
  pub emotion_scores:  String,
  pub top_tokens:      String,
  pub keyword_counts:  String,
  pub comment_count:   u32,
}

impl RawSummary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      sentiment_score: row.get(1)?,
      emotion_scores:  row.get(2)?,
      top_tokens:      row.get(3)?,
      keyword_counts:  row.get(4)?,
      comment_count:   row.get(5)?,
    })
  }

  pub fn into_summary(self) -> Result<Summary> {
    Ok(Summary {
      id:              self.id,
      sentiment_score: self.sentiment_score,
      emotion_scores:  serde_json::from_str(&self.emotion_scores)?,
      top_tokens:      serde_json::from_str(&self.top_tokens)?,
      keyword_counts:  serde_json::from_str(&self.keyword_counts)?,
      comment_count:   self.comment_count,
    })
  }
}

/// A summary with its JSON columns already serialised, ready to bind.
pub struct EncodedSummary {
  pub id:              i64,
  pub sentiment_score: f64,
  pub emotion_scores:  String,
  pub top_tokens:      String,
  pub keyword_counts:  String,
  pub comment_count:   u32,
  pub breakdown:       Breakdown,
}

impl EncodedSummary {
  pub fn encode(summary: &Summary) -> Result<Self> {
    Ok(Self {
      id:              summary.id,
      sentiment_score: summary.sentiment_score,
      emotion_scores:  serde_json::to_string(&summary.emotion_scores)?,
      top_tokens:      serde_json::to_string(&summary.top_tokens)?,
      keyword_counts:  serde_json::to_string(&summary.keyword_counts)?,
      comment_count:   summary.comment_count,
      breakdown:       summary.breakdown(),
    })
  }
}
