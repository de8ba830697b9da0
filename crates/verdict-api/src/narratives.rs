//! `GET /openai-analysis/{id}`: the model-generated narrative of one
//! submission.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use verdict_core::{narrative::Narrative, store::ForumStore};

use crate::error::ApiError;

pub async fn get_one<S: ForumStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Narrative>, ApiError> {
  let narrative = store
    .get_narrative(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("narrative {id} not found")))?;
  Ok(Json(narrative))
}
