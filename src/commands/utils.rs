//! Shared utilities for commands

use anyhow::{Context, Result};
use chrono::Utc;

use crate::alfred::Workflow;
use crate::config::Config;
use crate::pinboard::cache::{self, RefreshOutcome, RefreshPolicy, TagCache};
use crate::pinboard::PinboardClient;

/// Read the runtime configuration of a workflow
pub fn load_config(workflow: &Workflow) -> Result<Config> {
    let settings = workflow.settings()?;
    Config::load(&settings)
}

/// Build an API client from the configuration
pub fn client(config: &Config) -> Result<PinboardClient> {
    PinboardClient::new(&config.api_base, config.auth_token.as_deref())
        .context("Failed to create Pinboard client")
}

/// Load the tag cache, refreshing it from Pinboard when needed
pub fn load_cache(
    workflow: &Workflow,
    config: &Config,
    force: bool,
) -> Result<(TagCache, RefreshOutcome)> {
    let client = client(config)?;
    let policy = RefreshPolicy {
        max_age: config.max_age,
        force,
    };
    cache::refresh(&workflow.cache_path(), &client, policy, Utc::now())
}

/// Split raw Alfred arguments into query words
pub fn query_words(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|a| a.split_whitespace())
        .map(str::to_string)
        .collect()
}

/// "1 bookmark", "3 bookmarks"
pub fn bookmark_count(count: u32) -> String {
    if count == 1 {
        "1 bookmark".to_string()
    } else {
        format!("{} bookmarks", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_words() {
        let args = vec!["rust  cli".to_string(), "alfred ".to_string()];
        assert_eq!(query_words(&args), vec!["rust", "cli", "alfred"]);
        assert!(query_words(&[]).is_empty());
    }

    #[test]
    fn test_bookmark_count() {
        assert_eq!(bookmark_count(0), "0 bookmarks");
        assert_eq!(bookmark_count(1), "1 bookmark");
        assert_eq!(bookmark_count(12), "12 bookmarks");
    }

    #[test]
    fn test_client_rejects_bad_base() {
        let config = Config {
            api_base: "::not a url::".to_string(),
            ..Config::default()
        };
        assert!(client(&config).is_err());
    }
}
