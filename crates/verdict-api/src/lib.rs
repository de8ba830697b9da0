//! Read-only JSON API for Verdict.
//!
//! Exposes an axum [`Router`] backed by any
//! [`verdict_core::store::ForumStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", verdict_api::api_router(store.clone()))
//! ```

pub mod comments;
pub mod error;
pub mod fuzzy;
pub mod health;
pub mod narratives;
pub mod params;
pub mod submissions;
pub mod summaries;

use std::sync::Arc;

use axum::{Router, routing::get};
use verdict_core::store::ForumStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ForumStore + 'static,
{
  Router::new()
    // Submissions
    .route("/submissions", get(submissions::list::<S>))
    .route("/submissions/search", get(submissions::search::<S>))
    .route("/submissions/top", get(submissions::top::<S>))
    .route("/submissions/fuzzy-search", get(submissions::fuzzy_search::<S>))
    .route("/submissions/text-search", get(submissions::text_search::<S>))
    .route("/submissions/random", get(submissions::random::<S>))
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    // Comments
    .route("/comments", get(comments::list::<S>))
    .route("/comments/search", get(comments::search::<S>))
    .route("/comments/{id}", get(comments::get_one::<S>))
    // Summaries
    .route("/summaries", get(summaries::list::<S>))
    .route("/summaries/{id}", get(summaries::get_one::<S>))
    .route("/breakdowns/{id}", get(summaries::breakdown::<S>))
    // Narratives
    .route("/openai-analysis/{id}", get(narratives::get_one::<S>))
    // Health
    .route("/health", get(health::handler::<S>))
    .with_state(store)
}
