//! Local tag cache and its freshness check
//!
//! The cache keeps every bookmark plus aggregated tag counts in
//! `tags_cache.json`. Deciding whether to refetch works in three tiers:
//!
//! 1. Within `max_age` of the last check the cache is trusted without any
//!    network access.
//! 2. After that, `posts/update` is asked for the remote change marker. A
//!    marker equal to the stored one only bumps `checked_at`.
//! 3. A different marker triggers a `posts/all` download, unless the last
//!    download is younger than Pinboard's five minute limit for that call.
//!
//! A download whose content hash equals the stored one leaves the tags
//! untouched. When Pinboard can't be reached the existing cache is served.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use super::api::BookmarkSource;
use super::error::PinboardResult;
use super::models::Post;
use crate::utils::write_atomic;

/// Minimum spacing between two `posts/all` calls
pub const POSTS_ALL_INTERVAL_SECS: i64 = 5 * 60;

/// A tag and the number of bookmarks carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: u32,
}

/// Cached bookmarks and tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCache {
    /// Remote change marker seen at the last download
    pub update_time: Option<String>,

    /// MD5 over the post signatures of the last download
    pub content_hash: String,

    /// Time of the last `posts/all` download
    pub fetched_at: DateTime<Utc>,

    /// Time the cache was last confirmed against Pinboard
    pub checked_at: DateTime<Utc>,

    /// Tags sorted by count (descending), then name
    pub tags: Vec<TagCount>,

    pub posts: Vec<Post>,
}

/// How eager a refresh is
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub max_age: Duration,
    pub force: bool,
}

/// What a refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache younger than `max_age`, no network access
    Fresh,
    /// Remote marker unchanged
    Confirmed,
    /// Bookmarks were downloaded; `changed` when the content hash differs
    Fetched { changed: bool },
    /// Remote changed but `posts/all` was called too recently
    RateLimited,
    /// Pinboard unreachable, serving the existing cache
    Offline,
}

impl TagCache {
    /// Build a cache from freshly downloaded posts
    pub fn from_posts(posts: Vec<Post>, update_time: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            update_time,
            content_hash: content_hash(&posts),
            fetched_at: now,
            checked_at: now,
            tags: count_tags(&posts),
            posts,
        }
    }

    /// Read the cache. Missing or unreadable files yield `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;

        match serde_json::from_str(&content) {
            Ok(cache) => Ok(Some(cache)),
            Err(err) => {
                warn!(path = %path.display(), "Discarding unreadable tag cache: {}", err);
                Ok(None)
            }
        }
    }

    /// Write the cache atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, |file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self).context("Failed to encode tag cache")?;
            writer.flush()?;
            Ok(())
        })
    }

    /// Whether the cache must be confirmed against Pinboard
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.update_time.is_none() || now - self.checked_at >= max_age
    }

    /// Forget the remote marker so the next refresh downloads again,
    /// even inside the `posts/all` interval
    pub fn invalidate(path: &Path) -> Result<()> {
        if let Some(mut cache) = Self::load(path)? {
            cache.update_time = None;
            cache.save(path)?;
            debug!("Tag cache invalidated");
        }
        Ok(())
    }

    /// Delete the cache file
    pub fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Tag cache removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove: {}", path.display()))
            }
        }
    }

    /// Look up the count of a tag (case-insensitive)
    pub fn tag_count(&self, name: &str) -> Option<u32> {
        self.tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .map(|t| t.count)
    }
}

/// Bring the cache at `path` up to date with `source`
pub fn refresh<S>(
    path: &Path,
    source: &S,
    policy: RefreshPolicy,
    now: DateTime<Utc>,
) -> Result<(TagCache, RefreshOutcome)>
where
    S: BookmarkSource + ?Sized,
{
    let Some(mut cache) = TagCache::load(path)? else {
        info!("No tag cache, downloading bookmarks");
        let cache = download(source, None, now).context("Failed to download bookmarks")?;
        cache.save(path)?;
        return Ok((cache, RefreshOutcome::Fetched { changed: true }));
    };

    if policy.force {
        info!("Forced refresh, downloading bookmarks");
        let fetched = download(source, None, now).context("Failed to download bookmarks")?;
        let changed = fetched.content_hash != cache.content_hash;
        fetched.save(path)?;
        return Ok((fetched, RefreshOutcome::Fetched { changed }));
    }

    if !cache.is_stale(policy.max_age, now) {
        debug!(checked_at = %cache.checked_at, "Tag cache is fresh");
        return Ok((cache, RefreshOutcome::Fresh));
    }

    let remote = match source.last_update() {
        Ok(remote) => remote,
        Err(err) if err.is_unreachable() => {
            warn!("Pinboard unreachable, using cached tags: {}", err);
            return Ok((cache, RefreshOutcome::Offline));
        }
        Err(err) => return Err(err).context("Failed to check Pinboard for updates"),
    };

    if cache.update_time.as_deref() == Some(remote.as_str()) {
        debug!(update_time = %remote, "Remote unchanged");
        cache.checked_at = now;
        cache.save(path)?;
        return Ok((cache, RefreshOutcome::Confirmed));
    }

    // An invalidated cache has no marker and is downloaded right away
    let invalidated = cache.update_time.is_none();
    if !invalidated && now - cache.fetched_at < Duration::seconds(POSTS_ALL_INTERVAL_SECS) {
        info!(
            fetched_at = %cache.fetched_at,
            "Remote changed but posts/all was called recently, keeping cache"
        );
        return Ok((cache, RefreshOutcome::RateLimited));
    }

    let fetched = match download(source, Some(remote), now) {
        Ok(fetched) => fetched,
        Err(err) if err.is_unreachable() => {
            warn!("Failed to download bookmarks, using cached tags: {}", err);
            return Ok((cache, RefreshOutcome::Offline));
        }
        Err(err) => return Err(err).context("Failed to download bookmarks"),
    };

    let changed = fetched.content_hash != cache.content_hash;
    if changed {
        info!(tags = fetched.tags.len(), posts = fetched.posts.len(), "Tag cache updated");
    } else {
        info!("Bookmarks unchanged");
    }
    fetched.save(path)?;

    Ok((fetched, RefreshOutcome::Fetched { changed }))
}

/// Download all posts; the marker is read first so that changes racing
/// with the download are picked up next time.
fn download<S>(source: &S, marker: Option<String>, now: DateTime<Utc>) -> PinboardResult<TagCache>
where
    S: BookmarkSource + ?Sized,
{
    let marker = match marker {
        Some(marker) => marker,
        None => source.last_update()?,
    };
    let posts = source.all_posts()?;

    Ok(TagCache::from_posts(posts, Some(marker), now))
}

/// MD5 over the sorted `hash:meta` signatures of all posts
pub fn content_hash(posts: &[Post]) -> String {
    let mut signatures: Vec<String> = posts
        .iter()
        .map(|p| format!("{}:{}", p.hash, p.meta))
        .collect();
    signatures.sort();

    let hash = md5::compute(signatures.join("\n").as_bytes());
    format!("{:x}", hash)
}

/// Count bookmarks per tag, most used first
pub fn count_tags(posts: &[Post]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for post in posts {
        let mut seen: Vec<&str> = Vec::with_capacity(post.tags.len());
        for tag in &post.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag.as_str());
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags
}
