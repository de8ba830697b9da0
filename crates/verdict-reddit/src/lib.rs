//! Reddit-backed [`ContentSource`](verdict_core::source::ContentSource) for
//! Verdict.
//!
//! Fetches a subreddit's hot listing and each submission's comment tree
//! using application-only OAuth. Comment trees are flattened depth-first and
//! "load more" placeholders are dropped.

mod client;
mod model;

pub mod error;

pub use client::{RedditConfig, RedditSource};
pub use error::{Error, Result};
