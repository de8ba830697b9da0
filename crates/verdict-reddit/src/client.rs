//! Async HTTP client for Reddit's listing API.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::debug;
use verdict_core::{
  comment::RemoteComment,
  source::ContentSource,
  submission::RemoteSubmission,
};

use crate::{
  error::{Error, Result},
  model::Listing,
};

/// Tokens are refreshed this long before Reddit says they expire.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// Connection settings for the Reddit API.
#[derive(Debug, Clone)]
pub struct RedditConfig {
  /// `https://oauth.reddit.com` when authenticated.
  pub base_url:      String,
  /// Full URL of the token endpoint.
  pub auth_url:      String,
  /// Leave empty to skip OAuth entirely.
  pub client_id:     String,
  pub client_secret: String,
  pub user_agent:    String,
  pub timeout:       Duration,
}

impl Default for RedditConfig {
  fn default() -> Self {
    Self {
      base_url:      "https://oauth.reddit.com".into(),
      auth_url:      "https://www.reddit.com/api/v1/access_token".into(),
      client_id:     String::new(),
      client_secret: String::new(),
      user_agent:    concat!("verdict/", env!("CARGO_PKG_VERSION")).into(),
      timeout:       Duration::from_secs(30),
    }
  }
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: Option<String>,
  #[serde(default)]
  expires_in:   u64,
  error:        Option<String>,
}

struct AccessToken {
  value:      String,
  expires_at: Instant,
}

/// A [`ContentSource`] backed by Reddit's application-only OAuth API.
///
/// Makes one attempt per call; the inner [`reqwest::Client`] applies the
/// configured timeout to every request.
pub struct RedditSource {
  client: Client,
  config: RedditConfig,
  token:  Mutex<Option<AccessToken>>,
}

impl RedditSource {
  pub fn new(config: RedditConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, config, token: Mutex::new(None) })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Attach a bearer token, fetching a new one when the cached token is
  /// missing or about to expire.
  async fn auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    if self.config.client_id.is_empty() {
      return Ok(req);
    }

    let mut token = self.token.lock().await;
    let fresh = token.as_ref().is_some_and(|t| t.expires_at > Instant::now());
    if !fresh {
      *token = Some(self.request_token().await?);
    }
    match token.as_ref() {
      Some(t) => Ok(req.bearer_auth(&t.value)),
      None => Err(Error::Auth("no token".into())),
    }
  }

  /// `POST /api/v1/access_token` with the client-credentials grant.
  async fn request_token(&self) -> Result<AccessToken> {
    let resp = self
      .client
      .post(&self.config.auth_url)
      .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
      .form(&[("grant_type", "client_credentials")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        endpoint: "access_token".into(),
        status:   resp.status().as_u16(),
      });
    }

    let body: TokenResponse = resp.json().await?;
    let value = match (body.access_token, body.error) {
      (Some(value), None) => value,
      (_, Some(error)) => return Err(Error::Auth(error)),
      (None, None) => return Err(Error::Auth("response carried no token".into())),
    };

    debug!(expires_in = body.expires_in, "obtained reddit access token");
    let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_SLACK);
    Ok(AccessToken { value, expires_at: Instant::now() + lifetime })
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let req = self.client.get(self.url(path)).query(query);
    let resp = self.auth(req).await?.send().await?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        endpoint: path.to_owned(),
        status:   resp.status().as_u16(),
      });
    }
    Ok(resp.json().await?)
  }

  /// `GET /r/{channel}/hot?limit=N`
  pub async fn hot(&self, channel: &str, limit: u32) -> Result<Vec<RemoteSubmission>> {
    if limit == 0 {
      return Err(Error::ZeroLimit);
    }

    let listing: Listing = self
      .get_json(&format!("/r/{channel}/hot"), &[
        ("limit", limit.to_string()),
        ("raw_json", "1".into()),
      ])
      .await?;

    let fetched = listing.into_submissions();
    let total = fetched.len();
    let kept: Vec<_> = fetched.into_iter().filter(|s| !s.is_removed()).collect();
    debug!(channel, total, kept = kept.len(), "fetched hot listing");
    Ok(kept)
  }

  /// `GET /comments/{id}`: the response is a pair of listings: the
  /// submission itself, then its comment tree.
  pub async fn comments(&self, remote_submission_id: &str) -> Result<Vec<RemoteComment>> {
    let (_submission, tree): (Listing, Listing) = self
      .get_json(&format!("/comments/{remote_submission_id}"), &[
        ("limit", "500".into()),
        ("raw_json", "1".into()),
      ])
      .await?;

    let mut comments = Vec::new();
    tree.flatten_comments(remote_submission_id, &mut comments);
    debug!(remote_submission_id, count = comments.len(), "fetched comment tree");
    Ok(comments)
  }
}

impl ContentSource for RedditSource {
  async fn fetch_recent_submissions(
    &self,
    channel: &str,
    limit: u32,
  ) -> verdict_core::Result<Vec<RemoteSubmission>> {
    Ok(self.hot(channel, limit).await?)
  }

  async fn fetch_comments(
    &self,
    remote_submission_id: &str,
  ) -> verdict_core::Result<Vec<RemoteComment>> {
    Ok(self.comments(remote_submission_id).await?)
  }
}
