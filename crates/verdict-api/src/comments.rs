//! Handlers for `/comments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/comments` | `offset`, `limit`, `sortBy`, `orderBy` |
//! | `GET`  | `/comments/{id}` | 404 if not found |
//! | `GET`  | `/comments/search` | `submission_id` (the submission's remote id) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  response::IntoResponse,
};
use serde::Deserialize;
use verdict_core::{comment::Comment, query::Page, store::ForumStore};

use crate::{
  error::ApiError,
  params::{PageParams, paged},
};

/// `GET /comments`
pub async fn list<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
  let query = params.list_query()?;
  let page = store.list_comments(&query).await.map_err(ApiError::store)?;
  Ok(paged(page, &query))
}

/// `GET /comments/{id}`
pub async fn get_one<S: ForumStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Comment>, ApiError> {
  let comment = store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub submission_id: Option<String>,
  #[serde(flatten)]
  pub page:          PageParams,
}

/// `GET /comments/search?submission_id=…`: without a submission id the
/// result is an empty page.
pub async fn search<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
  let query = params.page.list_query()?;
  let page = match params.submission_id.as_deref().filter(|s| !s.is_empty()) {
    Some(remote_id) => store
      .comments_for_submission(remote_id, &query)
      .await
      .map_err(ApiError::store)?,
    None => Page::empty(),
  };
  Ok(paged(page, &query))
}
