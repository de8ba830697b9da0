//! Wire types for Reddit's listing JSON.
//!
//! Every response is a tree of `{"kind": …, "data": …}` things. Only the
//! fields Verdict persists are decoded; everything else is ignored.

use serde::{Deserialize, de::IgnoredAny};
use verdict_core::{comment::RemoteComment, submission::RemoteSubmission};

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
  pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
  #[serde(default)]
  pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub(crate) enum Thing {
  #[serde(rename = "t1")]
  Comment(CommentData),
  #[serde(rename = "t3")]
  Link(LinkData),
  /// "Load more comments" placeholder.
  #[serde(rename = "more")]
  More(IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkData {
  pub id:          String,
  pub title:       String,
  #[serde(default)]
  pub selftext:    String,
  pub created_utc: f64,
  pub permalink:   String,
  #[serde(default)]
  pub score:       i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
  pub id:          String,
  pub parent_id:   String,
  #[serde(default)]
  pub body:        String,
  pub created_utc: f64,
  #[serde(default)]
  pub score:       i64,
  #[serde(default)]
  pub replies:     Option<Replies>,
}

/// Reddit sends `""` for a comment without replies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Replies {
  Listing(Listing),
  Empty(IgnoredAny),
}

impl From<LinkData> for RemoteSubmission {
  fn from(link: LinkData) -> Self {
    Self {
      remote_id:   link.id,
      title:       link.title,
      body_text:   link.selftext,
      created_utc: link.created_utc as i64,
      permalink:   link.permalink,
      score:       link.score,
    }
  }
}

impl Listing {
  /// The submissions of a subreddit listing, in listing order.
  pub fn into_submissions(self) -> Vec<RemoteSubmission> {
    self
      .data
      .children
      .into_iter()
      .filter_map(|thing| match thing {
        Thing::Link(link) => Some(link.into()),
        _ => None,
      })
      .collect()
  }

  /// Depth-first, pre-order flattening of a comment tree. Placeholders are
  /// dropped.
  pub fn flatten_comments(self, remote_submission_id: &str, out: &mut Vec<RemoteComment>) {
    for thing in self.data.children {
      let Thing::Comment(comment) = thing else {
        continue;
      };
      let replies = comment.replies;
      out.push(RemoteComment {
        remote_id:            comment.id,
        remote_submission_id: remote_submission_id.to_owned(),
        parent_id:            comment.parent_id,
        message:              comment.body,
        created_utc:          comment.created_utc as i64,
        score:                comment.score,
      });
      if let Some(Replies::Listing(listing)) = replies {
        listing.flatten_comments(remote_submission_id, out);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn link_listing_decodes() {
    let listing: Listing = serde_json::from_value(json!({
      "kind": "Listing",
      "data": {
        "after": "t3_zzz",
        "children": [{
          "kind": "t3",
          "data": {
            "id": "abc123",
            "title": "AITA for testing?",
            "selftext": "Body",
            "created_utc": 1672531200.0,
            "permalink": "/r/AmItheAsshole/comments/abc123/aita/",
            "score": 42,
            "ups": 42
          }
        }]
      }
    }))
    .unwrap();

    let submissions = listing.into_submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].remote_id, "abc123");
    assert_eq!(submissions[0].created_utc, 1_672_531_200);
    assert_eq!(submissions[0].score, 42);
  }

  #[test]
  fn comment_tree_flattens_depth_first() {
    let listing: Listing = serde_json::from_value(json!({
      "kind": "Listing",
      "data": { "children": [
        { "kind": "t1", "data": {
          "id": "c1", "parent_id": "t3_abc123", "body": "NTA",
          "created_utc": 1.0, "score": 5,
          "replies": { "kind": "Listing", "data": { "children": [
            { "kind": "t1", "data": {
              "id": "c2", "parent_id": "t1_c1", "body": "agreed",
              "created_utc": 2.0, "score": 1, "replies": ""
            }},
            { "kind": "more", "data": { "count": 3, "children": ["c9"] } }
          ]}}
        }},
        { "kind": "t1", "data": {
          "id": "c3", "parent_id": "t3_abc123", "body": "YTA",
          "created_utc": 3.0, "score": -2, "replies": ""
        }}
      ]}
    }))
    .unwrap();

    let mut out = Vec::new();
    listing.flatten_comments("abc123", &mut out);

    let ids: Vec<&str> = out.iter().map(|c| c.remote_id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    assert_eq!(out[1].parent_id, "t1_c1");
    assert!(out.iter().all(|c| c.remote_submission_id == "abc123"));
  }
}
