//! `GET /health`: store reachability and row counts.

use std::{sync::Arc, time::Instant};

use axum::{Json, extract::State};
use serde::Serialize;
use verdict_core::store::{ForumStore, StoreCounts};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:     &'static str,
  pub counts:     StoreCounts,
  /// Time taken to count every table.
  pub latency_ms: f64,
}

pub async fn handler<S: ForumStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Health>, ApiError> {
  let started = Instant::now();
  let counts = store.counts().await.map_err(ApiError::store)?;
  Ok(Json(Health {
    status: "ok",
    counts,
    latency_ms: started.elapsed().as_secs_f64() * 1000.0,
  }))
}
