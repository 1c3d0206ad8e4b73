//! Post command - Add a bookmark to Pinboard

use anyhow::{ensure, Context, Result};
use url::Url;

use super::utils;
use crate::alfred::Workflow;
use crate::config::Config;
use crate::pinboard::{NewPost, TagCache};

/// Options for adding a bookmark
#[derive(Debug, Default)]
pub struct PostOptions {
    pub url: String,
    pub title: Option<String>,
    /// Tags as typed; each entry may hold several space or comma separated tags
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub private: bool,
    pub toread: bool,
}

/// Validate options and turn them into a bookmark
pub fn build_post(options: &PostOptions) -> Result<NewPost> {
    let url = options.url.trim();
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    ensure!(
        matches!(parsed.scheme(), "http" | "https" | "ftp" | "file"),
        "Pinboard does not accept {} URLs",
        parsed.scheme()
    );

    let description = options
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(url)
        .to_string();

    let mut tags: Vec<String> = Vec::new();
    for tag in options
        .tags
        .iter()
        .flat_map(|t| t.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|t| !t.is_empty())
    {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(NewPost {
        url: url.to_string(),
        description,
        notes: options.notes.clone().unwrap_or_default(),
        tags,
        shared: !options.private,
        toread: options.toread,
    })
}

/// Execute the post command
pub fn execute(workflow: &Workflow, config: &Config, options: &PostOptions) -> Result<String> {
    let post = build_post(options)?;

    utils::client(config)?
        .add_post(&post)
        .context("Failed to add bookmark")?;

    // The new tags should show up on the next suggestion
    TagCache::invalidate(&workflow.cache_path())?;

    Ok(format!("Bookmarked {}", post.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_post_defaults() {
        let post = build_post(&PostOptions {
            url: " https://example.com/page ".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(post.url, "https://example.com/page");
        assert_eq!(post.description, "https://example.com/page");
        assert!(post.tags.is_empty());
        assert!(post.shared);
        assert!(!post.toread);
    }

    #[test]
    fn test_build_post_tags_are_split_and_deduplicated() {
        let post = build_post(&PostOptions {
            url: "https://example.com".to_string(),
            title: Some("Example".to_string()),
            tags: vec!["rust cli".to_string(), "alfred,rust".to_string()],
            private: true,
            toread: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(post.description, "Example");
        assert_eq!(post.tags, vec!["rust", "cli", "alfred"]);
        assert!(!post.shared);
        assert!(post.toread);
    }

    #[test]
    fn test_build_post_rejects_bad_urls() {
        for url in ["", "not a url", "mailto:someone@example.com"] {
            let options = PostOptions {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(build_post(&options).is_err(), "accepted {:?}", url);
        }
    }

    #[test]
    fn test_execute_without_token_fails_before_network() {
        let root = tempfile::tempdir().unwrap();
        let workflow = Workflow::with_dirs(
            "com.example.test".to_string(),
            root.path().to_path_buf(),
            root.path().join("cache"),
            root.path().join("data"),
        )
        .unwrap();
        let options = PostOptions {
            url: "https://example.com".to_string(),
            ..Default::default()
        };

        let err = execute(&workflow, &Config::default(), &options).unwrap_err();
        assert!(format!("{:#}", err).contains("No Pinboard API token"));
    }
}
