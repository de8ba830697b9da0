//! Word lexicons for sentiment and emotion scoring.
//!
//! Both formats are tab-separated text, one entry per line, `#` comments and
//! blank lines ignored:
//!
//! - AFINN: `word<TAB>polarity`, polarity an integer (usually −5..=5).
//! - NRC:   `word<TAB>emotion<TAB>0|1`, one line per word/emotion pair.

use std::{collections::HashMap, fs, path::Path};

use tracing::debug;

use crate::error::{Error, Result};

// ─── Built-in excerpts ───────────────────────────────────────────────────────

const BUILTIN_AFINN: &str = "\
abandon\t-2
abuse\t-3
angry\t-3
annoyed\t-2
annoying\t-2
apologize\t-1
apology\t-1
awesome\t4
awful\t-3
bad\t-3
best\t3
better\t2
blame\t-2
care\t2
cheat\t-3
cruel\t-3
cry\t-1
disappointed\t-2
disrespect\t-2
entitled\t1
fair\t2
fault\t-2
fine\t2
fun\t4
glad\t3
good\t3
great\t3
guilty\t-3
happy\t3
hate\t-3
help\t2
hurt\t-2
jerk\t-3
kind\t2
love\t3
lie\t-2
lied\t-2
mad\t-3
mean\t-1
nice\t3
no\t-1
petty\t-2
reasonable\t2
rude\t-2
sad\t-2
sorry\t-1
stupid\t-2
support\t2
terrible\t-3
thank\t2
toxic\t-3
upset\t-2
wrong\t-2
yes\t1
";

const BUILTIN_NRC: &str = "\
abandon\tfear\t1
abandon\tnegative\t1
abandon\tsadness\t1
abuse\tanger\t1
abuse\tdisgust\t1
abuse\tfear\t1
abuse\tnegative\t1
abuse\tsadness\t1
angry\tanger\t1
angry\tdisgust\t1
angry\tnegative\t1
cheat\tanger\t1
cheat\tdisgust\t1
cheat\tnegative\t1
cruel\tanger\t1
cruel\tdisgust\t1
cruel\tfear\t1
cruel\tnegative\t1
cruel\tsadness\t1
family\tpositive\t1
family\ttrust\t1
friend\tjoy\t1
friend\tpositive\t1
friend\ttrust\t1
good\tanticipation\t1
good\tjoy\t1
good\tpositive\t1
good\tsurprise\t1
good\ttrust\t1
guilty\tanger\t1
guilty\tnegative\t1
guilty\tsadness\t1
happy\tanticipation\t1
happy\tjoy\t1
happy\tpositive\t1
happy\ttrust\t1
hate\tanger\t1
hate\tdisgust\t1
hate\tfear\t1
hate\tnegative\t1
hate\tsadness\t1
hurt\tanger\t1
hurt\tfear\t1
hurt\tnegative\t1
hurt\tsadness\t1
lie\tanger\t1
lie\tdisgust\t1
lie\tnegative\t1
lie\tsadness\t1
love\tjoy\t1
love\tpositive\t1
money\tanger\t1
money\tanticipation\t1
money\tjoy\t1
money\tpositive\t1
money\tsurprise\t1
money\ttrust\t1
rude\tanger\t1
rude\tdisgust\t1
rude\tnegative\t1
sad\tnegative\t1
sad\tsadness\t1
selfish\tanger\t1
selfish\tdisgust\t1
selfish\tnegative\t1
terrible\tanger\t1
terrible\tdisgust\t1
terrible\tfear\t1
terrible\tnegative\t1
terrible\tsadness\t1
wedding\tanticipation\t1
wedding\tjoy\t1
wedding\tpositive\t1
wedding\ttrust\t1
wrong\tnegative\t1
";

// ─── Shared parsing ──────────────────────────────────────────────────────────

/// Yields `(line_number, fields)` for every non-blank, non-comment line.
fn records(input: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
  input.lines().enumerate().filter_map(|(i, line)| {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() || line.starts_with('#') {
      None
    } else {
      Some((i + 1, line.split('\t').map(str::trim).collect()))
    }
  })
}

fn read(path: &Path) -> Result<String> {
  fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

// ─── AFINN ───────────────────────────────────────────────────────────────────

/// Word → integer polarity.
#[derive(Debug, Clone, Default)]
pub struct AfinnLexicon {
  scores: HashMap<String, i32>,
}

impl AfinnLexicon {
  /// Multi-word entries (`no fun`, `does not work`) are validated and then
  /// dropped; scoring is per token so they could never match.
  pub fn parse(input: &str) -> Result<Self> {
    let mut scores = HashMap::new();
    let mut phrases = 0usize;
    for (line, fields) in records(input) {
      let &[word, score] = fields.as_slice() else {
        return Err(Error::MalformedLine {
          line,
          reason: format!("expected 2 fields, found {}", fields.len()),
        });
      };
      let score = score.parse::<i32>().map_err(|e| Error::MalformedLine {
        line,
        reason: format!("bad polarity {score:?}: {e}"),
      })?;
      if word.split_whitespace().nth(1).is_some() {
        phrases += 1;
        continue;
      }
      scores.insert(word.to_lowercase(), score);
    }
    if phrases > 0 {
      debug!(phrases, "skipped multi-word AFINN entries");
    }
    Ok(Self { scores })
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let lexicon = Self::parse(&read(path)?)?;
    debug!(path = %path.display(), words = lexicon.len(), "loaded AFINN lexicon");
    Ok(lexicon)
  }

  /// The small excerpt compiled into the crate.
  pub fn builtin() -> Self {
    Self::parse(BUILTIN_AFINN).unwrap_or_default()
  }

  pub fn score(&self, word: &str) -> Option<i32> { self.scores.get(word).copied() }

  pub fn len(&self) -> usize { self.scores.len() }

  pub fn is_empty(&self) -> bool { self.scores.is_empty() }
}

// ─── NRC ─────────────────────────────────────────────────────────────────────

/// Word → associated emotion labels.
#[derive(Debug, Clone, Default)]
pub struct NrcLexicon {
  emotions: HashMap<String, Vec<String>>,
}

impl NrcLexicon {
  pub fn parse(input: &str) -> Result<Self> {
    let mut emotions: HashMap<String, Vec<String>> = HashMap::new();
    for (line, fields) in records(input) {
      let &[word, emotion, flag] = fields.as_slice() else {
        return Err(Error::MalformedLine {
          line,
          reason: format!("expected 3 fields, found {}", fields.len()),
        });
      };
      match flag {
        "0" => continue,
        "1" => {}
        other => {
          return Err(Error::MalformedLine {
            line,
            reason: format!("association must be 0 or 1, found {other:?}"),
          });
        }
      }
      let labels = emotions.entry(word.to_lowercase()).or_default();
      if !labels.iter().any(|l| l == emotion) {
        labels.push(emotion.to_owned());
      }
    }
    Ok(Self { emotions })
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let lexicon = Self::parse(&read(path)?)?;
    debug!(path = %path.display(), words = lexicon.len(), "loaded NRC lexicon");
    Ok(lexicon)
  }

  /// The small excerpt compiled into the crate.
  pub fn builtin() -> Self {
    Self::parse(BUILTIN_NRC).unwrap_or_default()
  }

  pub fn emotions(&self, word: &str) -> &[String] {
    self.emotions.get(word).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn len(&self) -> usize { self.emotions.len() }

  pub fn is_empty(&self) -> bool { self.emotions.is_empty() }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn builtin_lexicons_parse() {
    assert!(!AfinnLexicon::builtin().is_empty());
    assert_eq!(AfinnLexicon::builtin().score("bad"), Some(-3));
    assert!(
      NrcLexicon::builtin()
        .emotions("rude")
        .iter()
        .any(|e| e == "anger")
    );
  }

  #[test]
  fn afinn_rejects_bad_lines() {
    let err = AfinnLexicon::parse("good\t3\nbad\n").unwrap_err();
    assert!(matches!(err, Error::MalformedLine { line: 2, .. }));

    let err = AfinnLexicon::parse("good\tvery").unwrap_err();
    assert!(matches!(err, Error::MalformedLine { line: 1, .. }));
  }

  #[test]
  fn afinn_drops_multi_word_phrases() {
    let lexicon = AfinnLexicon::parse("no fun\t-3\nfun\t4\ndoes not work\t-3\n").unwrap();
    assert_eq!(lexicon.len(), 1);
    assert_eq!(lexicon.score("fun"), Some(4));
    assert_eq!(lexicon.score("no fun"), None);

    let err = AfinnLexicon::parse("no fun\tlots").unwrap_err();
    assert!(matches!(err, Error::MalformedLine { line: 1, .. }));
  }

  #[test]
  fn nrc_skips_zero_associations() {
    let lexicon = NrcLexicon::parse("# header\nrude\tanger\t1\nrude\tjoy\t0\n").unwrap();
    assert_eq!(lexicon.emotions("rude"), ["anger".to_string()]);
    assert!(lexicon.emotions("polite").is_empty());
  }

  #[test]
  fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Wonderful\t4").unwrap();
    let lexicon = AfinnLexicon::load(file.path()).unwrap();
    assert_eq!(lexicon.score("wonderful"), Some(4));

    let err = NrcLexicon::load("/nonexistent/nrc.txt").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }
}
