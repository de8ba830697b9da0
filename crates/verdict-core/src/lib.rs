//! Core types and trait definitions for Verdict.
//!
//! No HTTP or database dependencies live here. The
//! store, the content source, the analytics engine and the API all speak in
//! the types defined here.

pub mod comment;
pub mod error;
pub mod narrative;
pub mod query;
pub mod source;
pub mod store;
pub mod submission;
pub mod summary;

pub use error::{Classify, Entity, Error, Result};
