//! Batch side of Verdict: the crawl, analytics and narrative reconcilers,
//! snapshot export, runtime settings, and the HTTP application served by
//! the `verdict` binary.

pub mod analyze;
pub mod crawl;
pub mod error;
pub mod export;
pub mod narrate;
pub mod settings;

pub use error::{Error, Result};

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use verdict_core::store::ForumStore;

/// The full HTTP application: the read API under `/api`, with request
/// tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: ForumStore + 'static,
{
  Router::new()
    .nest("/api", verdict_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
