//! Derived JSON snapshots for static consumers.
//!
//! Neither file is authoritative; both are regenerated from the store on
//! every export.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};
use verdict_core::store::ForumStore;

use crate::error::{Error, Result};

pub const SEARCH_FILE: &str = "search.json";
pub const TOP_FILE: &str = "top.json";

/// One row of `top.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
  pub id:          i64,
  pub score:       i64,
  pub created_utc: i64,
  pub nta:         u32,
  pub yta:         u32,
  pub esh:         u32,
  pub info:        u32,
  pub nah:         u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
  pub search_entries: usize,
  pub top_entries:    usize,
}

/// Write `search.json` and `top.json` into `dir`, creating it if needed.
#[instrument(skip(store))]
pub async fn export<S: ForumStore>(store: &S, dir: &Path) -> Result<ExportReport> {
  tokio::fs::create_dir_all(dir)
    .await
    .map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;

  let index = store.submission_index().await.map_err(Error::store)?;
  write_json(&dir.join(SEARCH_FILE), &index).await?;

  let top: Vec<TopEntry> = store
    .breakdowns_with_submissions()
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|(s, b)| TopEntry {
      id:          s.id,
      score:       s.score,
      created_utc: s.created_utc,
      nta:         b.nta,
      yta:         b.yta,
      esh:         b.esh,
      info:        b.info,
      nah:         b.nah,
    })
    .collect();
  write_json(&dir.join(TOP_FILE), &top).await?;

  let report = ExportReport { search_entries: index.len(), top_entries: top.len() };
  info!(?report, "snapshots written");
  Ok(report)
}

/// Write through a sibling temp file and rename, so readers never see a
/// partial snapshot.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let bytes = serde_json::to_vec(value)?;
  let tmp = PathBuf::from(format!("{}.tmp", path.display()));
  tokio::fs::write(&tmp, bytes)
    .await
    .map_err(|source| Error::Io { path: tmp.clone(), source })?;
  tokio::fs::rename(&tmp, path)
    .await
    .map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
  use serde_json::Value;
  use verdict_core::{
    submission::RemoteSubmission,
    summary::{Analysis, KeywordCategory, Summary},
  };
  use verdict_store_sqlite::SqliteStore;

  use super::*;

  fn remote(remote_id: &str, score: i64) -> RemoteSubmission {
    RemoteSubmission {
      remote_id:   remote_id.into(),
      title:       format!("AITA {remote_id}"),
      body_text:   "body".into(),
      created_utc: 1_672_531_200,
      permalink:   format!("/r/AmItheAsshole/comments/{remote_id}/"),
      score,
    }
  }

  fn read(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
  }

  #[tokio::test]
  async fn writes_both_snapshots() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let analyzed = store.create_submission(remote("abc123", 42)).await.unwrap();
    store.create_submission(remote("def456", 7)).await.unwrap();

    let mut analysis = Analysis::default();
    analysis.keyword_counts.set(KeywordCategory::Nta, 3);
    store
      .upsert_summary(Summary::new(analyzed.id, analysis, 3))
      .await
      .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("snapshots");
    let report = export(&store, &out).await.unwrap();
    assert_eq!(report, ExportReport { search_entries: 2, top_entries: 1 });

    let search = read(&out.join(SEARCH_FILE));
    assert_eq!(search.as_array().unwrap().len(), 2);
    assert_eq!(search[1]["title"], "AITA def456");

    let top = read(&out.join(TOP_FILE));
    assert_eq!(top[0]["id"], analyzed.id);
    assert_eq!(top[0]["score"], 42);
    assert_eq!(top[0]["nta"], 3);
    assert_eq!(top[0]["yta"], 0);

    assert!(!out.join("top.json.tmp").exists());
  }

  #[tokio::test]
  async fn empty_store_exports_empty_arrays() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    export(&store, dir.path()).await.unwrap();
    assert_eq!(read(&dir.path().join(SEARCH_FILE)), serde_json::json!([]));
    assert_eq!(read(&dir.path().join(TOP_FILE)), serde_json::json!([]));
  }
}
