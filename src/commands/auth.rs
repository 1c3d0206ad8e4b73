//! Auth command - Store the Pinboard API token

use anyhow::{ensure, Context, Result};
use tracing::info;

use crate::alfred::Workflow;
use crate::config::KEY_AUTH_TOKEN;
use crate::pinboard::TagCache;

/// Check the `user:TOKEN` shape of an API token and return the user
pub fn validate_token(token: &str) -> Result<&str> {
    let (user, secret) = token
        .split_once(':')
        .context("API token must look like user:TOKEN (see pinboard.in/settings/password)")?;

    ensure!(!user.is_empty(), "API token is missing the user name");
    ensure!(!secret.is_empty(), "API token is missing the secret part");
    ensure!(
        !token.chars().any(char::is_whitespace),
        "API token must not contain whitespace"
    );

    Ok(user)
}

/// Execute the auth command
pub fn execute(workflow: &Workflow, token: &str) -> Result<String> {
    let token = token.trim();
    let user = validate_token(token)?;

    let mut settings = workflow.settings()?;
    let previous = settings.get(KEY_AUTH_TOKEN).map(str::to_string);
    settings.set(KEY_AUTH_TOKEN, token)?;

    // Another account's tags must not be served from the cache
    if previous.as_deref() != Some(token) {
        TagCache::remove(&workflow.cache_path())?;
    }

    info!(user, "API token saved");
    Ok(format!("Pinboard token saved for {}", user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(root: &std::path::Path) -> Workflow {
        Workflow::with_dirs(
            "com.example.test".to_string(),
            root.to_path_buf(),
            root.join("cache"),
            root.join("data"),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_token() {
        assert_eq!(validate_token("alice:0123ABCD").unwrap(), "alice");
        assert!(validate_token("alice").is_err());
        assert!(validate_token(":0123").is_err());
        assert!(validate_token("alice:").is_err());
        assert!(validate_token("alice:01 23").is_err());
    }

    #[test]
    fn test_execute_stores_token() {
        let root = tempfile::tempdir().unwrap();
        let workflow = workflow(root.path());

        let message = execute(&workflow, "  alice:0123ABCD \n").unwrap();

        assert_eq!(message, "Pinboard token saved for alice");
        let settings = workflow.settings().unwrap();
        assert_eq!(settings.get(KEY_AUTH_TOKEN), Some("alice:0123ABCD"));
    }

    #[test]
    fn test_new_token_drops_cache() {
        let root = tempfile::tempdir().unwrap();
        let workflow = workflow(root.path());
        let cache_path = workflow.cache_path();
        let cache = TagCache::from_posts(Vec::new(), Some("m1".to_string()), chrono::Utc::now());

        execute(&workflow, "alice:0123ABCD").unwrap();
        cache.save(&cache_path).unwrap();

        // Same token again keeps the cache
        execute(&workflow, "alice:0123ABCD").unwrap();
        assert!(cache_path.exists());

        execute(&workflow, "bob:4567EF").unwrap();
        assert!(!cache_path.exists());
    }

    #[test]
    fn test_execute_rejects_bad_token() {
        let root = tempfile::tempdir().unwrap();
        let workflow = workflow(root.path());

        assert!(execute(&workflow, "nonsense").is_err());
        assert_eq!(workflow.settings().unwrap().get(KEY_AUTH_TOKEN), None);
    }
}
