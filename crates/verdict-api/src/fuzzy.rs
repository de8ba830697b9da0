//! Approximate title matching.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use verdict_core::submission::IndexEntry;

/// Longest query accepted by fuzzy search.
pub const MAX_QUERY_LEN: usize = 50;

/// Ids of the entries whose titles match `query`, best score first, ties by
/// ascending id, at most `limit` of them.
pub fn rank(entries: &[IndexEntry], query: &str, limit: usize) -> Vec<i64> {
  let query = query.trim();
  if query.is_empty() {
    return Vec::new();
  }

  let matcher = SkimMatcherV2::default().ignore_case();
  let mut scored: Vec<(i64, i64)> = entries
    .iter()
    .filter_map(|e| matcher.fuzzy_match(&e.title, query).map(|score| (score, e.id)))
    .collect();

  scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
  scored.into_iter().take(limit).map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(id: i64, title: &str) -> IndexEntry {
    IndexEntry { id, title: title.into(), created_utc: 0 }
  }

  #[test]
  fn closer_titles_rank_first() {
    let entries = [
      entry(1, "AITA for refusing to pay rent"),
      entry(2, "AITA for skipping my sister's wedding"),
      entry(3, "WIBTA if I told my boss"),
    ];
    let ids = rank(&entries, "wedding", 10);
    assert_eq!(ids.first(), Some(&2));
    assert!(!ids.contains(&3));
  }

  #[test]
  fn empty_query_matches_nothing() {
    assert!(rank(&[entry(1, "anything")], "  ", 10).is_empty());
  }

  #[test]
  fn limit_truncates() {
    let entries: Vec<_> = (1..=5).map(|i| entry(i, "AITA")).collect();
    assert_eq!(rank(&entries, "aita", 2), vec![1, 2]);
  }
}
