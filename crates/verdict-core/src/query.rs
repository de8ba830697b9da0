//! Query parameter types shared by the store and the API.
//!
//! Everything here is validated on construction so that a malformed request
//! is rejected before any SQL is built.

use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, submission::Submission, summary::KeywordCategory};

/// Upper bound on page size for every listing.
pub const MAX_LIMIT: u32 = 100;

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// The allow-list of sortable columns.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SortField {
  #[default]
  #[strum(serialize = "id")]
  Id,
  #[strum(serialize = "score")]
  Score,
  #[strum(serialize = "title")]
  Title,
  /// Creation time.
  #[strum(serialize = "new", serialize = "created_utc", serialize = "created")]
  Created,
}

impl SortField {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| {
      Error::Validation(format!(
        "unknown sort field {s:?}; expected one of id, score, title, new"
      ))
    })
  }
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| {
      Error::Validation(format!("unknown sort order {s:?}; expected asc or desc"))
    })
  }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Offset/limit/sort parameters for any listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
  offset: u32,
  limit:  u32,
  sort:   SortField,
  order:  SortOrder,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      offset: 0,
      limit:  DEFAULT_LIMIT,
      sort:   SortField::default(),
      order:  SortOrder::default(),
    }
  }
}

impl ListQuery {
  /// Build a query, rejecting a zero or oversized `limit`.
  pub fn new(
    offset: u32,
    limit: u32,
    sort: SortField,
    order: SortOrder,
  ) -> Result<Self> {
    if limit == 0 || limit > MAX_LIMIT {
      return Err(Error::Validation(format!(
        "limit must be between 1 and {MAX_LIMIT}, got {limit}"
      )));
    }
    Ok(Self { offset, limit, sort, order })
  }

  pub fn offset(&self) -> u32 { self.offset }

  pub fn limit(&self) -> u32 { self.limit }

  pub fn sort(&self) -> SortField { self.sort }

  pub fn order(&self) -> SortOrder { self.order }
}

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

impl<T> Page<T> {
  pub fn empty() -> Self { Self { items: Vec::new(), total: 0 } }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// An inclusive window over `created_utc` (epoch seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub start: i64,
  pub end:   i64,
}

impl TimeWindow {
  /// The UTC day before the one containing `now`: from midnight yesterday up
  /// to and including midnight today.
  pub fn day_before(now: DateTime<Utc>) -> Self {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc().timestamp();
    Self { start: midnight - 86_400, end: midnight }
  }

  pub fn contains(&self, t: i64) -> bool { (self.start..=self.end).contains(&t) }
}

/// Submission search criteria.
///
/// `remote_id` takes precedence. Otherwise both window bounds must be
/// present; any other combination matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
  pub remote_id:      Option<String>,
  pub created_after:  Option<i64>,
  pub created_before: Option<i64>,
}

/// The shape a [`SubmissionFilter`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionMatch<'a> {
  RemoteId(&'a str),
  Window(TimeWindow),
  Nothing,
}

impl SubmissionFilter {
  pub fn resolve(&self) -> SubmissionMatch<'_> {
    if let Some(remote_id) = self.remote_id.as_deref() {
      return SubmissionMatch::RemoteId(remote_id);
    }
    match (self.created_after, self.created_before) {
      (Some(start), Some(end)) => SubmissionMatch::Window(TimeWindow { start, end }),
      _ => SubmissionMatch::Nothing,
    }
  }
}

// ─── Top aggregation ─────────────────────────────────────────────────────────

/// Which slice of a year the top aggregation groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelector {
  /// A single calendar month, 1-based.
  Month(u32),
  /// One group spanning the whole year.
  AllMonths,
}

const MONTH_NAMES: [&str; 12] = [
  "january",
  "february",
  "march",
  "april",
  "may",
  "june",
  "july",
  "august",
  "september",
  "october",
  "november",
  "december",
];

impl MonthSelector {
  /// Accepts `allMonths`, full or three-letter English month names (any
  /// case), or a month number.
  pub fn parse(s: &str) -> Result<Self> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "allmonths" || lower == "all" {
      return Ok(Self::AllMonths);
    }
    if let Ok(n) = lower.parse::<u32>() {
      if (1..=12).contains(&n) {
        return Ok(Self::Month(n));
      }
    } else if lower.len() >= 3 {
      if let Some(i) = MONTH_NAMES.iter().position(|m| m.starts_with(&lower)) {
        return Ok(Self::Month(i as u32 + 1));
      }
    }
    Err(Error::Validation(format!("unknown month {s:?}")))
  }
}

/// Parameters for the top-by-category-per-period aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopQuery {
  pub year:     i32,
  pub month:    MonthSelector,
  pub category: KeywordCategory,
}

/// The winning submission for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSubmission {
  /// `YYYY-MM` for a month group, `YYYY` for a whole-year group.
  pub period:     String,
  /// The category counter value that won the group.
  pub count:      u32,
  pub submission: Submission,
}
