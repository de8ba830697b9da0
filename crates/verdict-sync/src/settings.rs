//! Runtime settings, layered from an optional TOML file and `VERDICT_*`
//! environment variables.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `VERDICT_SOURCE__CLIENT_SECRET` sets `source.client_secret`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;
use verdict_openai::OpenAiConfig;
use verdict_reddit::RedditConfig;
use verdict_text::{AfinnLexicon, Analyzer, NrcLexicon};

use crate::{
  crawl::{CommentPolicy, CrawlOptions},
  error::{Error, Result},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path: PathBuf,
  pub server:        ServerSettings,
  pub source:        SourceSettings,
  pub crawl:         CrawlSettings,
  pub analytics:     AnalyticsSettings,
  pub narrative:     NarrativeSettings,
  pub export:        ExportSettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path: PathBuf::from("verdict.db"),
      server:        ServerSettings::default(),
      source:        SourceSettings::default(),
      crawl:         CrawlSettings::default(),
      analytics:     AnalyticsSettings::default(),
      narrative:     NarrativeSettings::default(),
      export:        ExportSettings::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
  pub host: String,
  pub port: u16,
}

impl Default for ServerSettings {
  fn default() -> Self { Self { host: "127.0.0.1".into(), port: 8000 } }
}

/// The remote forum to crawl.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
  pub channel:       String,
  pub client_id:     String,
  pub client_secret: String,
  pub fetch_limit:   u32,
  pub user_agent:    String,
  pub timeout_secs:  u64,
  /// Upper bound on concurrent comment fetches.
  pub concurrency:   usize,
  pub base_url:      String,
  pub auth_url:      String,
}

impl Default for SourceSettings {
  fn default() -> Self {
    let reddit = RedditConfig::default();
    Self {
      channel:       "AmItheAsshole".into(),
      client_id:     String::new(),
      client_secret: String::new(),
      fetch_limit:   100,
      user_agent:    reddit.user_agent,
      timeout_secs:  reddit.timeout.as_secs(),
      concurrency:   4,
      base_url:      reddit.base_url,
      auth_url:      reddit.auth_url,
    }
  }
}

impl SourceSettings {
  /// Credentials are only needed to crawl, so they are checked here rather
  /// than at load time.
  pub fn reddit_config(&self) -> Result<RedditConfig> {
    if self.client_id.is_empty() || self.client_secret.is_empty() {
      return Err(Error::Settings(
        "source.client_id and source.client_secret are required to crawl".into(),
      ));
    }
    Ok(RedditConfig {
      base_url:      self.base_url.clone(),
      auth_url:      self.auth_url.clone(),
      client_id:     self.client_id.clone(),
      client_secret: self.client_secret.clone(),
      user_agent:    self.user_agent.clone(),
      timeout:       Duration::from_secs(self.timeout_secs),
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
  pub comment_policy: CommentPolicy,
}

/// Which submissions an analytics run picks up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySetting {
  /// Submissions created during the previous UTC day.
  #[default]
  Yesterday,
  /// Submissions that have no summary yet.
  Unanalyzed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
  pub policy:      PolicySetting,
  pub batch_limit: u32,
  /// AFINN-format lexicon; the built-in excerpt is used when unset.
  pub afinn_path:  Option<PathBuf>,
  /// NRC-format lexicon; the built-in excerpt is used when unset.
  pub nrc_path:    Option<PathBuf>,
}

impl Default for AnalyticsSettings {
  fn default() -> Self {
    Self { policy: PolicySetting::default(), batch_limit: 50_000, afinn_path: None, nrc_path: None }
  }
}

impl AnalyticsSettings {
  pub fn analyzer(&self) -> Result<Analyzer> {
    let afinn = match &self.afinn_path {
      Some(path) => AfinnLexicon::load(path)?,
      None => AfinnLexicon::builtin(),
    };
    let nrc = match &self.nrc_path {
      Some(path) => NrcLexicon::load(path)?,
      None => NrcLexicon::builtin(),
    };
    Ok(Analyzer::new(afinn, nrc))
  }
}

/// The chat model asked for narratives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NarrativeSettings {
  pub api_key:      String,
  pub model:        String,
  pub base_url:     String,
  pub timeout_secs: u64,
  pub policy:       PolicySetting,
  pub batch_limit:  u32,
}

impl Default for NarrativeSettings {
  fn default() -> Self {
    let openai = OpenAiConfig::default();
    Self {
      api_key:      String::new(),
      model:        openai.model,
      base_url:     openai.base_url,
      timeout_secs: openai.timeout.as_secs(),
      policy:       PolicySetting::default(),
      batch_limit:  10_000,
    }
  }
}

impl NarrativeSettings {
  pub fn openai_config(&self) -> Result<OpenAiConfig> {
    if self.api_key.is_empty() {
      return Err(Error::Settings("narrative.api_key is required to narrate".into()));
    }
    Ok(OpenAiConfig {
      base_url: self.base_url.clone(),
      api_key:  self.api_key.clone(),
      model:    self.model.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
  /// Where `search.json` and `top.json` are written; export is skipped by
  /// `run` when unset.
  pub dir: Option<PathBuf>,
}

impl Settings {
  /// Load `path` (if it exists) and overlay `VERDICT_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("VERDICT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn crawl_options(&self) -> CrawlOptions {
    CrawlOptions {
      channel:        self.source.channel.clone(),
      limit:          self.source.fetch_limit,
      concurrency:    self.source.concurrency.max(1),
      fetch_timeout:  Duration::from_secs(self.source.timeout_secs),
      comment_policy: self.crawl.comment_policy,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      r#"
database_path = "/tmp/verdict-test.db"

[server]
port = 9000

[source]
channel = "AmIOverreacting"
concurrency = 8

[crawl]
comment_policy = "refresh"

[analytics]
policy = "unanalyzed"
"#
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.database_path, PathBuf::from("/tmp/verdict-test.db"));
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.source.channel, "AmIOverreacting");
    assert_eq!(settings.source.fetch_limit, 100);
    assert_eq!(settings.crawl.comment_policy, CommentPolicy::Refresh);
    assert_eq!(settings.analytics.policy, PolicySetting::Unanalyzed);
    assert_eq!(settings.crawl_options().concurrency, 8);
  }

  #[test]
  fn missing_file_yields_defaults() {
    let settings = Settings::load(Path::new("/nonexistent/verdict.toml")).unwrap();
    assert_eq!(settings.source.channel, "AmItheAsshole");
    assert_eq!(settings.crawl.comment_policy, CommentPolicy::InsertOnly);
  }

  #[test]
  fn crawling_requires_credentials() {
    let mut source = SourceSettings::default();
    assert!(matches!(source.reddit_config(), Err(Error::Settings(_))));

    source.client_id = "id".into();
    source.client_secret = "secret".into();
    assert_eq!(source.reddit_config().unwrap().client_id, "id");
  }

  #[test]
  fn narrating_requires_an_api_key() {
    let mut narrative = NarrativeSettings::default();
    assert!(matches!(narrative.openai_config(), Err(Error::Settings(_))));

    narrative.api_key = "sk-test".into();
    let config = narrative.openai_config().unwrap();
    assert_eq!(config.model, "gpt-3.5-turbo");
    assert_eq!(config.base_url, "https://api.openai.com/v1");
  }

  #[test]
  fn default_analyzer_uses_builtin_lexicons() {
    let analyzer = AnalyticsSettings::default().analyzer().unwrap();
    assert_eq!(analyzer.analyze(["bad."]).sentiment_score, -3.0);
  }
}
