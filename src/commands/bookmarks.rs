//! Bookmarks command - Search cached bookmarks by tag or title

use anyhow::Result;

use super::utils;
use crate::alfred::{Feedback, Item, Workflow};
use crate::config::Config;
use crate::pinboard::Post;

/// Posts matching every query word, newest first
///
/// A word matches when it equals one of the post's tags or occurs in its
/// description (both case-insensitive).
pub fn filter_posts<'a>(posts: &'a [Post], words: &[String], limit: usize) -> Vec<&'a Post> {
    let words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

    let mut found: Vec<&Post> = posts
        .iter()
        .filter(|post| {
            let description = post.description.to_lowercase();
            words
                .iter()
                .all(|w| post.has_tag(w) || description.contains(w.as_str()))
        })
        .collect();

    found.sort_by(|a, b| b.time.cmp(&a.time));
    found.truncate(limit);
    found
}

/// Build the Script Filter results for a search
pub fn build_feedback(posts: &[Post], words: &[String], limit: usize) -> Feedback {
    let mut feedback = Feedback::new();
    let found = filter_posts(posts, words, limit);

    if found.is_empty() {
        feedback.add_item(
            Item::new("")
                .subtitle("No cached bookmarks match")
                .valid(false),
            false,
        );
        return feedback;
    }

    for post in found {
        let subtitle = if post.tags.is_empty() {
            post.url.clone()
        } else {
            format!("{}  [{}]", post.url, post.tags.join(" "))
        };

        feedback.add_item(
            Item::new(post.display_title())
                .uid(post.hash.as_str())
                .arg(post.url.as_str())
                .subtitle(subtitle)
                .valid(true),
            true,
        );
    }

    feedback
}

/// Execute the bookmarks command
pub fn execute(workflow: &Workflow, config: &Config, args: &[String]) -> Result<Feedback> {
    let words = utils::query_words(args);
    let (cache, _) = utils::load_cache(workflow, config, false)?;
    Ok(build_feedback(&cache.posts, &words, config.max_results))
}
