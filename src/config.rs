//! Platform-specific paths and runtime configuration

use anyhow::{Context, Result};
use chrono::Duration;
use std::env;
use std::path::PathBuf;

use crate::alfred::settings::Settings;

/// Settings file stored in the workflow data directory
pub const SETTINGS_FILE: &str = "settings.plist";

/// Tag cache stored in the workflow cache directory
pub const CACHE_FILE: &str = "tags_cache.json";

/// Log file stored in the workflow cache directory
pub const LOG_FILE: &str = "pinboard-tags.log";

pub const DEFAULT_API_BASE: &str = "https://api.pinboard.in/v1/";
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 60;
pub const DEFAULT_MAX_RESULTS: usize = 25;

/// Settings keys
pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_MAX_AGE_MINUTES: &str = "max_age_minutes";
pub const KEY_MAX_RESULTS: &str = "max_results";
pub const KEY_API_BASE: &str = "api_base";

/// Environment variable that overrides the stored API token
pub const TOKEN_ENV: &str = "PINBOARD_TOKEN";

/// Environment variables Alfred sets for workflow scripts
pub const BUNDLE_ID_ENV: &str = "alfred_workflow_bundleid";
pub const CACHE_DIR_ENV: &str = "alfred_workflow_cache";
pub const DATA_DIR_ENV: &str = "alfred_workflow_data";

/// Get the volatile data directory for a workflow
/// - `$alfred_workflow_cache` when Alfred provides it
/// - macOS: ~/Library/Caches/com.runningwithcrayons.Alfred-2/Workflow Data/<bundleid>/
/// - Others: <cache dir>/alfred/<bundleid>/
pub fn cache_dir(bundle_id: &str) -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform_cache_dir(bundle_id)
}

/// Get the persistent data directory for a workflow
/// - `$alfred_workflow_data` when Alfred provides it
/// - macOS: ~/Library/Application Support/Alfred 2/Workflow Data/<bundleid>/
/// - Others: <data dir>/alfred/<bundleid>/
pub fn data_dir(bundle_id: &str) -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform_data_dir(bundle_id)
}

fn platform_cache_dir(bundle_id: &str) -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join("Library")
            .join("Caches")
            .join("com.runningwithcrayons.Alfred-2")
            .join("Workflow Data")
            .join(bundle_id))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let cache = dirs::cache_dir().context("Could not determine cache directory")?;
        Ok(cache.join("alfred").join(bundle_id))
    }
}

fn platform_data_dir(bundle_id: &str) -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join("Library")
            .join("Application Support")
            .join("Alfred 2")
            .join("Workflow Data")
            .join(bundle_id))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let data = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data.join("alfred").join(bundle_id))
    }
}

/// Runtime configuration resolved from settings and environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Pinboard API token (`user:TOKEN`)
    pub auth_token: Option<String>,

    /// How long the cache is trusted before asking Pinboard for changes
    pub max_age: Duration,

    /// Maximum number of items shown in Alfred
    pub max_results: usize,

    /// Base URL of the Pinboard v1 API
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            max_age: Duration::minutes(DEFAULT_MAX_AGE_MINUTES),
            max_results: DEFAULT_MAX_RESULTS,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Resolve configuration from stored settings and the environment
    pub fn load(settings: &Settings) -> Result<Self> {
        Self::resolve(settings, env::var(TOKEN_ENV).ok())
    }

    /// Resolve configuration with an explicit token override
    pub fn resolve(settings: &Settings, token_override: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        config.auth_token = token_override
            .filter(|t| !t.trim().is_empty())
            .or_else(|| settings.get(KEY_AUTH_TOKEN).map(str::to_string))
            .map(|t| t.trim().to_string());

        if let Some(minutes) = settings.get(KEY_MAX_AGE_MINUTES) {
            config.max_age = Duration::minutes(parse_max_age(minutes)?);
        }

        if let Some(limit) = settings.get(KEY_MAX_RESULTS) {
            config.max_results = parse_max_results(limit)?;
        }

        if let Some(base) = settings.get(KEY_API_BASE).filter(|b| !b.is_empty()) {
            config.api_base = base.to_string();
        }

        Ok(config)
    }
}

/// Parse the `max_age_minutes` setting
pub fn parse_max_age(value: &str) -> Result<i64> {
    let minutes: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} setting: {}", KEY_MAX_AGE_MINUTES, value))?;
    anyhow::ensure!(
        (0..=60 * 24 * 365).contains(&minutes),
        "{} must be between 0 and 525600, got {}",
        KEY_MAX_AGE_MINUTES,
        minutes
    );
    Ok(minutes)
}

/// Parse the `max_results` setting
pub fn parse_max_results(value: &str) -> Result<usize> {
    let limit: usize = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} setting: {}", KEY_MAX_RESULTS, value))?;
    anyhow::ensure!(limit > 0, "{} must be at least 1", KEY_MAX_RESULTS);
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(pairs: &[(&str, &str)]) -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::open(dir.path().join(SETTINGS_FILE)).unwrap();
        for (key, value) in pairs {
            settings.set(key, value).unwrap();
        }
        (dir, settings)
    }

    #[test]
    fn test_platform_paths_end_with_bundle_id() {
        let cache = platform_cache_dir("com.example.pinboard").unwrap();
        let data = platform_data_dir("com.example.pinboard").unwrap();
        assert!(cache.ends_with("com.example.pinboard"));
        assert!(data.ends_with("com.example.pinboard"));
        assert_ne!(cache, data);
    }

    #[test]
    fn test_defaults() {
        let (_dir, settings) = settings_with(&[]);
        let config = Config::resolve(&settings, None).unwrap();
        assert!(config.auth_token.is_none());
        assert_eq!(config.max_age, Duration::minutes(DEFAULT_MAX_AGE_MINUTES));
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_settings_are_applied() {
        let (_dir, settings) = settings_with(&[
            (KEY_AUTH_TOKEN, "alice:ABC"),
            (KEY_MAX_AGE_MINUTES, "15"),
            (KEY_MAX_RESULTS, "5"),
            (KEY_API_BASE, "http://localhost:8080/v1/"),
        ]);
        let config = Config::resolve(&settings, None).unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("alice:ABC"));
        assert_eq!(config.max_age, Duration::minutes(15));
        assert_eq!(config.max_results, 5);
        assert_eq!(config.api_base, "http://localhost:8080/v1/");
    }

    #[test]
    fn test_token_override_wins() {
        let (_dir, settings) = settings_with(&[(KEY_AUTH_TOKEN, "alice:ABC")]);
        let config = Config::resolve(&settings, Some("bob:XYZ".to_string())).unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("bob:XYZ"));

        // Blank overrides are ignored
        let config = Config::resolve(&settings, Some("  ".to_string())).unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("alice:ABC"));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(parse_max_age("soon").is_err());
        assert!(parse_max_age("-1").is_err());
        assert_eq!(parse_max_age(" 30 ").unwrap(), 30);
        assert!(parse_max_results("0").is_err());
        assert!(parse_max_results("many").is_err());
        assert_eq!(parse_max_results("10").unwrap(), 10);
    }
}
