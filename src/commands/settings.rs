//! Settings command - Inspect and change stored workflow settings

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use super::auth;
use crate::alfred::Settings;
use crate::config::{self, KEY_API_BASE, KEY_AUTH_TOKEN, KEY_MAX_AGE_MINUTES, KEY_MAX_RESULTS};
use crate::utils::mask_token;

/// Reject values the workflow could not use later
pub fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        KEY_AUTH_TOKEN => auth::validate_token(value).map(|_| ()),
        KEY_MAX_AGE_MINUTES => config::parse_max_age(value).map(|_| ()),
        KEY_MAX_RESULTS => config::parse_max_results(value).map(|_| ()),
        KEY_API_BASE => Url::parse(value)
            .map(|_| ())
            .with_context(|| format!("Invalid {}: {}", KEY_API_BASE, value)),
        _ => Ok(()),
    }
}

fn display_value(key: &str, value: &str) -> String {
    if key == KEY_AUTH_TOKEN {
        mask_token(value)
    } else {
        value.to_string()
    }
}

pub fn get(settings: &Settings, key: &str) -> Result<String> {
    let value = settings
        .get(key)
        .with_context(|| format!("Setting '{}' is not set", key))?;
    Ok(display_value(key, value))
}

pub fn set(settings: &mut Settings, key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    validate(key, value)?;
    settings.set(key, value)?;
    info!(key, "Setting changed");
    Ok(format!("{} = {}", key, display_value(key, value)))
}

pub fn unset(settings: &mut Settings, key: &str) -> Result<String> {
    if settings.remove(key)? {
        info!(key, "Setting removed");
        Ok(format!("Removed {}", key))
    } else {
        Ok(format!("Setting '{}' was not set", key))
    }
}

pub fn list(settings: &Settings) -> String {
    let entries = settings.entries();
    if entries.is_empty() {
        return "No settings stored".to_string();
    }

    entries
        .into_iter()
        .map(|(key, value)| format!("{} = {}", key, display_value(key, value)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::open(dir.path().join("settings.plist")).unwrap();
        (dir, settings)
    }

    #[test]
    fn test_set_get_masks_token() {
        let (_dir, mut settings) = settings();

        assert_eq!(
            set(&mut settings, KEY_AUTH_TOKEN, "alice:SECRET").unwrap(),
            "auth_token = alice:********"
        );
        assert_eq!(get(&settings, KEY_AUTH_TOKEN).unwrap(), "alice:********");
        assert_eq!(settings.get(KEY_AUTH_TOKEN), Some("alice:SECRET"));
    }

    #[test]
    fn test_set_validates_known_keys() {
        let (_dir, mut settings) = settings();

        assert!(set(&mut settings, KEY_MAX_RESULTS, "0").is_err());
        assert!(set(&mut settings, KEY_MAX_AGE_MINUTES, "an hour").is_err());
        assert!(set(&mut settings, KEY_API_BASE, "nope").is_err());
        assert!(set(&mut settings, KEY_AUTH_TOKEN, "nope").is_err());
        assert!(settings.entries().is_empty());

        set(&mut settings, KEY_MAX_RESULTS, " 10 ").unwrap();
        assert_eq!(get(&settings, KEY_MAX_RESULTS).unwrap(), "10");

        // Unknown keys are stored as-is
        set(&mut settings, "theme", "dark").unwrap();
        assert_eq!(get(&settings, "theme").unwrap(), "dark");
    }

    #[test]
    fn test_get_missing() {
        let (_dir, settings) = settings();
        assert!(get(&settings, "missing").is_err());
    }

    #[test]
    fn test_unset_and_list() {
        let (_dir, mut settings) = settings();
        assert_eq!(list(&settings), "No settings stored");

        set(&mut settings, KEY_MAX_RESULTS, "10").unwrap();
        set(&mut settings, KEY_AUTH_TOKEN, "bob:XYZ").unwrap();
        assert_eq!(
            list(&settings),
            "auth_token = bob:********\nmax_results = 10"
        );

        assert_eq!(unset(&mut settings, KEY_MAX_RESULTS).unwrap(), "Removed max_results");
        assert_eq!(
            unset(&mut settings, KEY_MAX_RESULTS).unwrap(),
            "Setting 'max_results' was not set"
        );
    }
}
