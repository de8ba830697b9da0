//! Handlers for `/submissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/submissions` | `offset`, `limit`, `sortBy`, `orderBy` |
//! | `GET`  | `/submissions/{id}` | 404 if not found |
//! | `GET`  | `/submissions/search` | `submission_id` or `startUTC` + `endUTC` |
//! | `GET`  | `/submissions/top` | `year`, `month`, `type` |
//! | `GET`  | `/submissions/fuzzy-search` | `query`, `limit` |
//! | `GET`  | `/submissions/text-search` | `query`, `limit` |
//! | `GET`  | `/submissions/random` | 404 when empty |

use std::{str::FromStr, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  response::IntoResponse,
};
use serde::Deserialize;
use verdict_core::{
  query::{MonthSelector, SubmissionFilter, TopQuery, TopSubmission},
  store::ForumStore,
  submission::Submission,
  summary::KeywordCategory,
};

use crate::{
  error::ApiError,
  fuzzy,
  params::{PageParams, number, paged, search_limit},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /submissions`
pub async fn list<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
  let query = params.list_query()?;
  let page = store.list_submissions(&query).await.map_err(ApiError::store)?;
  Ok(paged(page, &query))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /submissions/{id}`
pub async fn get_one<S: ForumStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store
    .get_submission(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  Ok(Json(submission))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub submission_id: Option<String>,
  #[serde(rename = "startUTC")]
  pub start_utc:     Option<String>,
  #[serde(rename = "endUTC")]
  pub end_utc:       Option<String>,
  #[serde(flatten)]
  pub page:          PageParams,
}

/// `GET /submissions/search`: exact `submission_id`, or an inclusive
/// `startUTC`..`endUTC` window. Anything else yields an empty page.
pub async fn search<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
  let query = params.page.list_query()?;
  let filter = SubmissionFilter {
    remote_id:      params.submission_id.filter(|s| !s.is_empty()),
    created_after:  number("startUTC", params.start_utc.as_deref())?,
    created_before: number("endUTC", params.end_utc.as_deref())?,
  };
  let page = store
    .search_submissions(&filter, &query)
    .await
    .map_err(ApiError::store)?;
  Ok(paged(page, &query))
}

// ─── Top ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TopParams {
  pub year:     Option<String>,
  pub month:    Option<String>,
  #[serde(rename = "type")]
  pub category: Option<String>,
}

/// `GET /submissions/top?year=2023&month=January&type=yta`
///
/// `month` defaults to `allMonths`.
pub async fn top<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TopParams>,
) -> Result<Json<Vec<TopSubmission>>, ApiError> {
  let year = number("year", params.year.as_deref())?
    .ok_or_else(|| ApiError::BadRequest("year is required".into()))?;
  let month = match params.month.as_deref() {
    Some(m) if !m.is_empty() => MonthSelector::parse(m)?,
    _ => MonthSelector::AllMonths,
  };
  let raw = params
    .category
    .ok_or_else(|| ApiError::BadRequest("type is required".into()))?;
  let category = KeywordCategory::from_str(&raw).map_err(|_| {
    ApiError::BadRequest(format!(
      "unknown type {raw:?}; expected one of nta, yta, esh, info, nah"
    ))
  })?;

  let top = store
    .top_submissions(&TopQuery { year, month, category })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(top))
}

// ─── Fuzzy & full-text search ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextParams {
  #[serde(default)]
  pub query: String,
  pub limit: Option<String>,
}

/// `GET /submissions/fuzzy-search?query=…`: approximate title match.
pub async fn fuzzy_search<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TextParams>,
) -> Result<Json<Vec<Submission>>, ApiError> {
  if params.query.chars().count() > fuzzy::MAX_QUERY_LEN {
    return Err(ApiError::BadRequest(format!(
      "query must be at most {} characters",
      fuzzy::MAX_QUERY_LEN
    )));
  }
  let limit = search_limit(params.limit.as_deref())?;
  if params.query.trim().is_empty() {
    return Ok(Json(Vec::new()));
  }

  let index = store.submission_index().await.map_err(ApiError::store)?;
  let ids = fuzzy::rank(&index, &params.query, limit as usize);

  let hits = store.submissions_by_ids(&ids).await.map_err(ApiError::store)?;
  Ok(Json(hits))
}

/// `GET /submissions/text-search?query=…`: full-text match on title and
/// body, best first.
pub async fn text_search<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TextParams>,
) -> Result<Json<Vec<Submission>>, ApiError> {
  let limit = search_limit(params.limit.as_deref())?;
  let hits = store
    .text_search(&params.query, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(hits))
}

// ─── Random ───────────────────────────────────────────────────────────────────

/// `GET /submissions/random`
pub async fn random<S: ForumStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store
    .random_submission()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no submissions stored".into()))?;
  Ok(Json(submission))
}
