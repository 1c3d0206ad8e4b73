//! Pinboard data types
//!
//! The v1 API answers in XML with everything carried in attributes:
//!
//! ```xml
//! <update time="2011-03-24T19:02:07Z" />
//! <posts user="alice">
//!   <post href="https://www.rust-lang.org/" time="2024-01-02T03:04:05Z"
//!         description="Rust" extended="" tag="rust lang" hash="..." meta="..."
//!         shared="yes" toread="no" />
//! </posts>
//! <result code="done" />
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{PinboardError, PinboardResult};

/// `posts/update` response
#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    #[serde(rename = "@time")]
    pub time: String,
}

/// `posts/all` response
#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    #[serde(rename = "post", default)]
    pub posts: Vec<RawPost>,
}

/// A post exactly as the API sends it
#[derive(Debug, Deserialize)]
pub struct RawPost {
    #[serde(rename = "@href")]
    pub href: String,
    #[serde(rename = "@description", default)]
    pub description: String,
    #[serde(rename = "@extended", default)]
    pub extended: String,
    #[serde(rename = "@tag", default)]
    pub tag: String,
    #[serde(rename = "@time", default)]
    pub time: String,
    #[serde(rename = "@hash", default)]
    pub hash: String,
    #[serde(rename = "@meta", default)]
    pub meta: String,
    #[serde(rename = "@shared", default)]
    pub shared: String,
    #[serde(rename = "@toread", default)]
    pub toread: String,
}

/// Result code returned by write methods
#[derive(Debug, Deserialize)]
pub struct ResultResponse {
    #[serde(rename = "@code")]
    pub code: String,
}

impl ResultResponse {
    pub fn into_result(self) -> PinboardResult<()> {
        if self.code == "done" {
            Ok(())
        } else {
            Err(PinboardError::Api(self.code))
        }
    }
}

/// A bookmark as stored in the tag cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub toread: bool,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        let time = DateTime::parse_from_rfc3339(&raw.time)
            .ok()
            .map(|t| t.with_timezone(&Utc));

        Self {
            url: raw.href,
            description: raw.description,
            notes: raw.extended,
            tags: split_tags(&raw.tag),
            time,
            hash: raw.hash,
            meta: raw.meta,
            // Pinboard omits `shared` on some accounts; public is its default
            shared: raw.shared != "no",
            toread: raw.toread == "yes",
        }
    }
}

impl Post {
    /// Whether the post carries `tag` (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Description, or the URL for untitled bookmarks
    pub fn display_title(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.url
        } else {
            &self.description
        }
    }
}

/// Split Pinboard's space separated tag list
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(str::to_string).collect()
}

/// A bookmark to add with `posts/add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub url: String,
    pub description: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub shared: bool,
    pub toread: bool,
}

impl NewPost {
    /// Query parameters for `posts/add`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
        vec![
            ("url", self.url.clone()),
            ("description", self.description.clone()),
            ("extended", self.notes.clone()),
            ("tags", self.tags.join(" ")),
            ("shared", yes_no(self.shared)),
            ("toread", yes_no(self.toread)),
            ("replace", "yes".to_string()),
        ]
    }
}
