//! OpenAI-backed [`Narrator`](verdict_core::narrative::Narrator) for Verdict.
//!
//! Sends one chat-completion request per submission and keeps the first
//! choice's message as the narrative.

mod client;

pub mod error;

pub use client::{OpenAiConfig, OpenAiNarrator, prompt};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
