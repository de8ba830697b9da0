//! Query-string parsing shared by the listing endpoints.
//!
//! Parameters arrive as raw strings and are validated here so that every
//! malformed value produces the same JSON `400` body.

use std::str::FromStr;

use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};
use verdict_core::query::{DEFAULT_LIMIT, ListQuery, MAX_LIMIT, Page, SortField, SortOrder};

use crate::error::ApiError;

/// `offset`, `limit`, `sortBy`, `orderBy`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
  pub offset:   Option<String>,
  pub limit:    Option<String>,
  pub sort_by:  Option<String>,
  pub order_by: Option<String>,
}

impl PageParams {
  pub fn list_query(&self) -> Result<ListQuery, ApiError> {
    let offset = number("offset", self.offset.as_deref())?.unwrap_or(0);
    let limit = number("limit", self.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT);
    let sort = self
      .sort_by
      .as_deref()
      .map(SortField::parse)
      .transpose()?
      .unwrap_or_default();
    let order = self
      .order_by
      .as_deref()
      .map(SortOrder::parse)
      .transpose()?
      .unwrap_or_default();
    Ok(ListQuery::new(offset, limit, sort, order)?)
  }
}

/// Parse an optional numeric parameter; an empty string counts as absent.
pub fn number<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => s
      .parse()
      .map(Some)
      .map_err(|_| ApiError::BadRequest(format!("{name} must be a number, got {s:?}"))),
  }
}

/// A free-standing `limit` for the search endpoints, defaulted and bounded
/// like listings.
pub fn search_limit(raw: Option<&str>) -> Result<u32, ApiError> {
  let limit = number("limit", raw)?.unwrap_or(DEFAULT_LIMIT);
  if limit == 0 || limit > MAX_LIMIT {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_LIMIT}, got {limit}"
    )));
  }
  Ok(limit)
}

/// A page body with `X-Count`, `X-Offset` and `X-Limit` headers.
pub fn paged<T: Serialize>(page: Page<T>, query: &ListQuery) -> impl IntoResponse + use<T> {
  (
    [
      ("X-Count", page.total.to_string()),
      ("X-Offset", query.offset().to_string()),
      ("X-Limit", query.limit().to_string()),
    ],
    Json(page.items),
  )
}
