//! Handlers for `/summaries` and `/breakdowns` endpoints.
//!
//! Summaries are listed by id only; `orderBy` picks the direction.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  response::IntoResponse,
};
use verdict_core::{
  store::ForumStore,
  summary::{Breakdown, Summary},
};

use crate::{
  error::ApiError,
  params::{PageParams, paged},
};

/// `GET /summaries`
pub async fn list<S: ForumStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
  let query = params.list_query()?;
  let page = store.list_summaries(&query).await.map_err(ApiError::store)?;
  Ok(paged(page, &query))
}

/// `GET /summaries/{id}`: `id` is the submission's id.
pub async fn get_one<S: ForumStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Summary>, ApiError> {
  let summary = store
    .get_summary(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("summary {id} not found")))?;
  Ok(Json(summary))
}

/// `GET /breakdowns/{id}`
pub async fn breakdown<S: ForumStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Breakdown>, ApiError> {
  let breakdown = store
    .get_breakdown(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("breakdown {id} not found")))?;
  Ok(Json(breakdown))
}
