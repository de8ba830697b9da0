//! Text normalisation.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Lowercase, turn `.` into a space, collapse runs of non-word characters to
/// a single space, then split on whitespace.
pub(crate) fn words(text: &str) -> Vec<String> {
  let lowered = text.to_lowercase().replace('.', " ");
  NON_WORD
    .replace_all(&lowered, " ")
    .split_whitespace()
    .map(str::to_owned)
    .collect()
}
