//! Workflow bundle discovery and directory bootstrap
//!
//! Alfred starts workflow scripts with the bundle directory as the working
//! directory. The bundle's `info.plist` carries the `bundleid` that names
//! the per-workflow cache and data directories.

use anyhow::{Context, Result};
use plist::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::settings::Settings;
use crate::config;

/// A located workflow with its working directories
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Bundle identifier from info.plist
    pub bundle_id: String,

    /// Directory holding info.plist and the workflow's resources
    pub bundle_dir: PathBuf,

    /// Volatile data (tag cache, log)
    pub cache_dir: PathBuf,

    /// Persistent data (settings)
    pub data_dir: PathBuf,
}

impl Workflow {
    /// Locate the workflow from its bundle directory (defaults to the
    /// current directory) and create its cache and data directories
    pub fn locate(bundle_dir: Option<&Path>) -> Result<Self> {
        let bundle_dir = match bundle_dir {
            Some(dir) => dir.to_path_buf(),
            None => env::current_dir().context("Failed to get current directory")?,
        };

        let bundle_id = match env::var(config::BUNDLE_ID_ENV) {
            Ok(id) if !id.is_empty() => id,
            _ => read_bundle_id(&bundle_dir.join("info.plist"))?,
        };

        let cache_dir = config::cache_dir(&bundle_id)?;
        let data_dir = config::data_dir(&bundle_id)?;

        Self::with_dirs(bundle_id, bundle_dir, cache_dir, data_dir)
    }

    /// Build a workflow from explicit directories, creating them if needed
    pub fn with_dirs(
        bundle_id: String,
        bundle_dir: PathBuf,
        cache_dir: PathBuf,
        data_dir: PathBuf,
    ) -> Result<Self> {
        for dir in [&cache_dir, &data_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create: {}", dir.display()))?;
        }

        debug!(
            bundle_id = %bundle_id,
            cache_dir = %cache_dir.display(),
            data_dir = %data_dir.display(),
            "Workflow located"
        );

        Ok(Self {
            bundle_id,
            bundle_dir,
            cache_dir,
            data_dir,
        })
    }

    /// Path of settings.plist
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(config::SETTINGS_FILE)
    }

    /// Path of the tag cache
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(config::CACHE_FILE)
    }

    /// Open the workflow settings
    pub fn settings(&self) -> Result<Settings> {
        Settings::open(self.settings_path())
    }
}

/// Read the `bundleid` key from a workflow's info.plist
pub fn read_bundle_id(plist_path: &Path) -> Result<String> {
    let value = Value::from_file(plist_path)
        .with_context(|| format!("Failed to read: {}", plist_path.display()))?;

    value
        .as_dictionary()
        .and_then(|dict| dict.get("bundleid"))
        .and_then(Value::as_string)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .with_context(|| format!("{} doesn't contain a 'bundleid' key", plist_path.display()))
}
