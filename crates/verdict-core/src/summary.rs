//! Analytic summaries derived from a submission's comments.
//!
//! A [`Summary`] is always written whole; recomputation regenerates every
//! field. A [`Breakdown`] is its denormalized five-counter projection and is
//! written in the same step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── Keywords ────────────────────────────────────────────────────────────────

/// The judgment labels tallied per submission.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum KeywordCategory {
  /// Not the asshole.
  Nta,
  /// You're the asshole.
  Yta,
  /// Everyone sucks here.
  Esh,
  /// Not enough info.
  Info,
  /// No assholes here.
  Nah,
}

/// Occurrence counts of each [`KeywordCategory`] token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCounts {
  pub nta:  u32,
  pub yta:  u32,
  pub esh:  u32,
  pub info: u32,
  pub nah:  u32,
}

impl KeywordCounts {
  pub fn get(&self, category: KeywordCategory) -> u32 {
    match category {
      KeywordCategory::Nta => self.nta,
      KeywordCategory::Yta => self.yta,
      KeywordCategory::Esh => self.esh,
      KeywordCategory::Info => self.info,
      KeywordCategory::Nah => self.nah,
    }
  }

  pub fn set(&mut self, category: KeywordCategory, count: u32) {
    match category {
      KeywordCategory::Nta => self.nta = count,
      KeywordCategory::Yta => self.yta = count,
      KeywordCategory::Esh => self.esh = count,
      KeywordCategory::Info => self.info = count,
      KeywordCategory::Nah => self.nah = count,
    }
  }
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// One row of the token-frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
  pub token: String,
  pub count: u32,
}

/// The output of the text analytics engine for one body of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
  /// Sum of matched-word polarities.
  pub sentiment_score: f64,
  /// Emotion label → number of matched words.
  pub emotion_scores:  BTreeMap<String, u32>,
  /// Most frequent non-stop-word tokens, most frequent first.
  pub top_tokens:      Vec<TokenCount>,
  pub keyword_counts:  KeywordCounts,
}

// ─── Persisted forms ─────────────────────────────────────────────────────────

/// A persisted [`Analysis`], keyed by the submission's surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub id:              i64,
  pub sentiment_score: f64,
  pub emotion_scores:  BTreeMap<String, u32>,
  pub top_tokens:      Vec<TokenCount>,
  pub keyword_counts:  KeywordCounts,
  /// Number of comments the analysis was computed over.
  pub comment_count:   u32,
}

impl Summary {
  pub fn new(id: i64, analysis: Analysis, comment_count: u32) -> Self {
    Self {
      id,
      sentiment_score: analysis.sentiment_score,
      emotion_scores: analysis.emotion_scores,
      top_tokens: analysis.top_tokens,
      keyword_counts: analysis.keyword_counts,
      comment_count,
    }
  }

  /// The breakdown row that must be written alongside this summary.
  pub fn breakdown(&self) -> Breakdown {
    let k = self.keyword_counts;
    Breakdown {
      id:   self.id,
      nta:  k.nta,
      yta:  k.yta,
      esh:  k.esh,
      info: k.info,
      nah:  k.nah,
    }
  }
}

/// Five scalar keyword counters, one-to-one with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
  pub id:   i64,
  pub nta:  u32,
  pub yta:  u32,
  pub esh:  u32,
  pub info: u32,
  pub nah:  u32,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn category_parses_case_insensitively() {
    assert_eq!(KeywordCategory::from_str("YTA").unwrap(), KeywordCategory::Yta);
    assert_eq!(KeywordCategory::from_str("info").unwrap(), KeywordCategory::Info);
    assert!(KeywordCategory::from_str("maybe").is_err());
  }

  #[test]
  fn breakdown_mirrors_keyword_counts() {
    let mut analysis = Analysis::default();
    for (i, category) in KeywordCategory::iter().enumerate() {
      analysis.keyword_counts.set(category, i as u32 + 1);
    }
    let summary = Summary::new(7, analysis, 3);
    let breakdown = summary.breakdown();

    assert_eq!(breakdown.id, 7);
    assert_eq!(breakdown.nta, 1);
    assert_eq!(breakdown.yta, 2);
    assert_eq!(breakdown.esh, 3);
    assert_eq!(breakdown.info, 4);
    assert_eq!(breakdown.nah, 5);
  }
}
