//! Comment-text analytics for Verdict.
//!
//! Turns the comment bodies of one submission into a
//! [`verdict_core::summary::Analysis`]: a sentiment score, an emotion tally,
//! the most frequent non-stop-word tokens, and counts of the judgment
//! keywords. Pure and synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use verdict_text::Analyzer;
//!
//! let analyzer = Analyzer::default();
//! let analysis = analyzer.analyze(["NTA. Your sister was rude.", "YTA."]);
//! println!("{} nta votes", analysis.keyword_counts.nta);
//! ```

pub mod error;
mod lexicon;
mod stopwords;
mod tokenize;

use std::collections::{BTreeMap, HashMap};

pub use error::{Error, Result};
pub use lexicon::{AfinnLexicon, NrcLexicon};
use strum::IntoEnumIterator as _;
use verdict_core::summary::{Analysis, KeywordCategory, KeywordCounts, TokenCount};

/// How many rows of the frequency table are kept.
pub const TOP_TOKENS: usize = 30;

// ─── Analyzer ────────────────────────────────────────────────────────────────

/// A configured analytics engine. Holds its lexicons so repeated calls do
/// not re-parse them.
#[derive(Debug, Clone)]
pub struct Analyzer {
  afinn: AfinnLexicon,
  nrc:   NrcLexicon,
}

impl Default for Analyzer {
  /// An analyzer over the built-in lexicon excerpts.
  fn default() -> Self { Self::new(AfinnLexicon::builtin(), NrcLexicon::builtin()) }
}

impl Analyzer {
  pub fn new(afinn: AfinnLexicon, nrc: NrcLexicon) -> Self { Self { afinn, nrc } }

  /// Analyze a submission's comment bodies.
  ///
  /// The texts are concatenated with no separator before processing. Never
  /// fails; empty input yields [`Analysis::default`].
  pub fn analyze<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Analysis {
    let text: String = texts.into_iter().collect();
    let words = tokenize::words(&text);

    let mut sentiment = 0i64;
    let mut emotions: BTreeMap<String, u32> = BTreeMap::new();
    for word in &words {
      if let Some(score) = self.afinn.score(word) {
        sentiment += i64::from(score);
      }
      for emotion in self.nrc.emotions(word) {
        *emotions.entry(emotion.clone()).or_default() += 1;
      }
    }

    let table = frequencies(words.iter().filter(|w| !stopwords::is_stop_word(w)));

    Analysis {
      sentiment_score: sentiment as f64,
      emotion_scores:  emotions,
      keyword_counts:  keyword_counts(&table),
      top_tokens:      top_tokens(table),
    }
  }
}

// ─── Frequency table ─────────────────────────────────────────────────────────

/// Token counts in first-seen order.
fn frequencies<'a>(tokens: impl Iterator<Item = &'a String>) -> Vec<TokenCount> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut table: Vec<TokenCount> = Vec::new();
  for token in tokens {
    match index.get(token.as_str()) {
      Some(&i) => table[i].count += 1,
      None => {
        index.insert(token.as_str(), table.len());
        table.push(TokenCount { token: token.clone(), count: 1 });
      }
    }
  }
  table
}

/// The most frequent rows. The sort is stable so equal counts keep
/// first-seen order.
fn top_tokens(mut table: Vec<TokenCount>) -> Vec<TokenCount> {
  table.sort_by(|a, b| b.count.cmp(&a.count));
  table.truncate(TOP_TOKENS);
  table
}

fn keyword_counts(table: &[TokenCount]) -> KeywordCounts {
  let mut counts = KeywordCounts::default();
  for category in KeywordCategory::iter() {
    let key: &str = category.as_ref();
    if let Some(row) = table.iter().find(|r| r.token == key) {
      counts.set(category, row.count);
    }
  }
  counts
}
