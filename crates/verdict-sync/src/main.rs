//! `verdict` binary.
//!
//! Reads `verdict.toml` (or the path given with `--config`) plus `VERDICT_*`
//! environment overrides, opens the SQLite store, and runs one command:
//!
//! ```text
//! verdict serve                       # read API on server.host:server.port
//! verdict crawl                       # mirror the channel into the store
//! verdict analyze [--unanalyzed]      # summarize pending submissions
//! verdict narrate [--unanalyzed]      # ask the chat model about submissions
//! verdict export [--dir DIR]          # write search.json and top.json
//! verdict run                         # crawl, analyze, export once
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use verdict_core::query::TimeWindow;
use verdict_openai::OpenAiNarrator;
use verdict_reddit::RedditSource;
use verdict_store_sqlite::SqliteStore;
use verdict_sync::{
  analyze::{self, PendingPolicy},
  crawl,
  export,
  narrate,
  settings::Settings,
};

#[derive(Parser)]
#[command(author, version, about = "Verdict forum crawler and analytics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "verdict.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the read API over HTTP.
  Serve,
  /// Fetch current submissions and their comments once.
  Crawl,
  /// Compute summaries for pending submissions.
  Analyze {
    /// Analyze every submission that has no summary yet.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    unanalyzed: bool,
    /// Window start, epoch seconds (inclusive).
    #[arg(long, requires = "end")]
    start:      Option<i64>,
    /// Window end, epoch seconds (inclusive).
    #[arg(long, requires = "start")]
    end:        Option<i64>,
  },
  /// Generate narratives for submissions that have none.
  Narrate {
    /// Narrate every submission without a narrative, not just yesterday's.
    #[arg(long)]
    unanalyzed: bool,
  },
  /// Write the JSON snapshots.
  Export {
    /// Output directory; defaults to `export.dir`.
    #[arg(long)]
    dir: Option<PathBuf>,
  },
  /// Crawl, analyze, then export if `export.dir` is set.
  Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to load settings from {:?}", cli.config))?;

  let store_path = expand_tilde(&settings.database_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => serve(&settings, store).await,
    Command::Crawl => run_crawl(&settings, &store).await,
    Command::Analyze { unanalyzed, start, end } => {
      let policy = match (unanalyzed, start, end) {
        (true, ..) => PendingPolicy::Unanalyzed,
        (false, Some(start), Some(end)) => PendingPolicy::Window(TimeWindow { start, end }),
        _ => settings.analytics.policy.into(),
      };
      run_analyze(&settings, &store, policy).await
    }
    Command::Narrate { unanalyzed } => {
      let policy = if unanalyzed {
        PendingPolicy::Unanalyzed
      } else {
        settings.narrative.policy.into()
      };
      run_narrate(&settings, &store, policy).await
    }
    Command::Export { dir } => {
      let dir = dir
        .or_else(|| settings.export.dir.clone())
        .context("no export directory: pass --dir or set export.dir")?;
      run_export(&store, &dir).await
    }
    Command::Run => {
      run_crawl(&settings, &store).await?;
      run_analyze(&settings, &store, settings.analytics.policy.into()).await?;
      match &settings.export.dir {
        Some(dir) => run_export(&store, dir).await,
        None => {
          info!("export.dir not set; skipping snapshot export");
          Ok(())
        }
      }
    }
  }
}

async fn serve(settings: &Settings, store: SqliteStore) -> anyhow::Result<()> {
  let app = verdict_sync::app(Arc::new(store));
  let address = format!("{}:{}", settings.server.host, settings.server.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn run_crawl(settings: &Settings, store: &SqliteStore) -> anyhow::Result<()> {
  let source = RedditSource::new(settings.source.reddit_config()?)
    .context("failed to build HTTP client")?;
  let report = crawl::crawl(&source, store, &settings.crawl_options())
    .await
    .context("crawl failed")?;
  println!("{}", serde_json::to_string(&report)?);
  Ok(())
}

async fn run_analyze(
  settings: &Settings,
  store: &SqliteStore,
  policy: PendingPolicy,
) -> anyhow::Result<()> {
  let analyzer = settings
    .analytics
    .analyzer()
    .context("failed to load lexicons")?;
  let report = analyze::analyze(store, &analyzer, policy, settings.analytics.batch_limit)
    .await
    .context("analysis failed")?;
  println!("{}", serde_json::to_string(&report)?);
  Ok(())
}

async fn run_narrate(
  settings: &Settings,
  store: &SqliteStore,
  policy: PendingPolicy,
) -> anyhow::Result<()> {
  let narrator = OpenAiNarrator::new(settings.narrative.openai_config()?)
    .context("failed to build HTTP client")?;
  let report = narrate::narrate(store, &narrator, policy, settings.narrative.batch_limit)
    .await
    .context("narration failed")?;
  println!("{}", serde_json::to_string(&report)?);
  Ok(())
}

async fn run_export(store: &SqliteStore, dir: &Path) -> anyhow::Result<()> {
  let dir = expand_tilde(dir);
  let report = export::export(store, &dir)
    .await
    .with_context(|| format!("failed to export snapshots to {dir:?}"))?;
  println!("{}", serde_json::to_string(&report)?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
