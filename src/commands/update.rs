//! Update command - Refresh the tag cache from Pinboard

use anyhow::Result;

use super::utils;
use crate::alfred::Workflow;
use crate::config::Config;
use crate::pinboard::cache::POSTS_ALL_INTERVAL_SECS;
use crate::pinboard::{RefreshOutcome, TagCache};

/// Execute the update command and describe what happened
pub fn execute(workflow: &Workflow, config: &Config, force: bool) -> Result<String> {
    let (cache, outcome) = utils::load_cache(workflow, config, force)?;
    Ok(summary(&cache, outcome))
}

/// One line for Alfred's notification
pub fn summary(cache: &TagCache, outcome: RefreshOutcome) -> String {
    let counts = format!(
        "{} tags from {}",
        cache.tags.len(),
        utils::bookmark_count(cache.posts.len() as u32)
    );

    match outcome {
        RefreshOutcome::Fresh | RefreshOutcome::Confirmed => {
            format!("Tag cache is up to date: {}", counts)
        }
        RefreshOutcome::Fetched { changed: true } => format!("Tag cache updated: {}", counts),
        RefreshOutcome::Fetched { changed: false } => {
            format!("No changes on Pinboard: {}", counts)
        }
        RefreshOutcome::RateLimited => format!(
            "Pinboard allows one full download every {} minutes, keeping {}",
            POSTS_ALL_INTERVAL_SECS / 60,
            counts
        ),
        RefreshOutcome::Offline => format!(
            "Pinboard unreachable, using {} cached at {}",
            counts,
            cache.fetched_at.format("%Y-%m-%d %H:%M UTC")
        ),
    }
}
