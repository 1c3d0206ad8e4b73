//! Tags command - Suggest Pinboard tags as Alfred feedback
//!
//! The query is the tag list being typed: every word but the last is a
//! tag already chosen, the last word is completed. A trailing space means
//! the last tag is finished and suggestions start over.

use anyhow::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::debug;

use super::utils;
use crate::alfred::{Feedback, Item, Workflow};
use crate::config::Config;
use crate::pinboard::TagCount;

/// A parsed tag query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    /// Completed tags, in input order
    pub chosen: Vec<String>,

    /// Tag being typed (empty after a trailing space)
    pub partial: String,
}

impl TagQuery {
    pub fn parse(raw: &str) -> Self {
        let mut words: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

        let partial = if raw.ends_with(char::is_whitespace) {
            String::new()
        } else {
            words.pop().unwrap_or_default()
        };

        Self {
            chosen: words,
            partial,
        }
    }

    /// Chosen tags followed by a space, ready to prepend to a completion
    pub fn prefix(&self) -> String {
        if self.chosen.is_empty() {
            String::new()
        } else {
            format!("{} ", self.chosen.join(" "))
        }
    }

    /// All typed tags separated by single spaces
    pub fn normalized(&self) -> String {
        let mut all: Vec<&str> = self.chosen.iter().map(String::as_str).collect();
        if !self.partial.is_empty() {
            all.push(&self.partial);
        }
        all.join(" ")
    }

    fn is_chosen(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.chosen.iter().any(|c| c.to_lowercase() == tag)
    }
}

/// Rank tags for a query
///
/// Prefix matches come first (most used first), followed by fuzzy matches
/// ordered by score. Tags already chosen are never suggested again.
pub fn suggest<'a>(tags: &'a [TagCount], query: &TagQuery, limit: usize) -> Vec<&'a TagCount> {
    let candidates = tags.iter().filter(|t| !query.is_chosen(&t.name));

    if query.partial.is_empty() {
        let mut all: Vec<&TagCount> = candidates.collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        all.truncate(limit);
        return all;
    }

    let partial = query.partial.to_lowercase();
    let matcher = SkimMatcherV2::default().ignore_case();

    let mut prefixed = Vec::new();
    let mut fuzzy = Vec::new();
    for tag in candidates {
        if tag.name.to_lowercase().starts_with(&partial) {
            prefixed.push(tag);
        } else if let Some(score) = matcher.fuzzy_match(&tag.name, &query.partial) {
            fuzzy.push((score, tag));
        }
    }

    prefixed.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    fuzzy.sort_by(|(sa, a), (sb, b)| {
        sb.cmp(sa)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.name.cmp(&b.name))
    });

    prefixed
        .into_iter()
        .chain(fuzzy.into_iter().map(|(_, tag)| tag))
        .take(limit)
        .collect()
}

/// Build the Script Filter results for a query
pub fn build_feedback(tags: &[TagCount], query: &TagQuery, limit: usize) -> Feedback {
    let mut feedback = Feedback::new();
    let normalized = query.normalized();

    if !query.chosen.is_empty() {
        feedback.add_item(
            Item::new(normalized.as_str())
                .arg(normalized.as_str())
                .subtitle("Use these tags")
                .valid(true),
            false,
        );
    }

    let suggestions = suggest(tags, query, limit);

    if suggestions.is_empty() {
        if !query.partial.is_empty() {
            feedback.add_item(
                Item::new("")
                    .arg(normalized.as_str())
                    .subtitle(format!("Use \"{}\" as a new tag", query.partial))
                    .valid(true),
                false,
            );
        } else if query.chosen.is_empty() {
            feedback.add_item(
                Item::new("")
                    .subtitle("No tags cached yet")
                    .valid(false),
                false,
            );
        }
        return feedback;
    }

    let prefix = query.prefix();
    for tag in suggestions {
        let completion = format!("{}{}", prefix, tag.name);
        feedback.add_item(
            Item::new(tag.name.as_str())
                .uid(tag.name.as_str())
                .arg(completion.as_str())
                .autocomplete(format!("{} ", completion))
                .subtitle(utils::bookmark_count(tag.count)),
            true,
        );
    }

    feedback
}

/// Execute the tags command
pub fn execute(workflow: &Workflow, config: &Config, args: &[String]) -> Result<Feedback> {
    let query = TagQuery::parse(&args.join(" "));
    let (cache, outcome) = utils::load_cache(workflow, config, false)?;

    debug!(
        ?outcome,
        chosen = ?query.chosen,
        partial = %query.partial,
        "Suggesting tags"
    );

    Ok(build_feedback(&cache.tags, &query, config.max_results))
}
