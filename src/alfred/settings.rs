//! Workflow settings persisted as a property list
//!
//! Settings live in `<data dir>/settings.plist` as a flat dictionary of
//! string values.

use anyhow::{bail, Context, Result};
use plist::{Dictionary, Value};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::write_atomic;

/// String settings backed by an XML property list
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    values: Dictionary,
}

impl Settings {
    /// Open the settings file, creating an empty one on first use
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!(path = %path.display(), "Creating settings file");
            let settings = Self {
                path,
                values: Dictionary::new(),
            };
            settings.save()?;
            return Ok(settings);
        }

        let content =
            fs::read(&path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let values = parse_dictionary(&content)
            .with_context(|| format!("Failed to parse: {}", path.display()))?;

        Ok(Self { path, values })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a string setting. Non-string values read as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_string)
    }

    /// Set a string setting and persist immediately
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self.save()
    }

    /// Remove a setting. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let existed = self.values.remove(key).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    /// All string settings, sorted by key
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .values
            .iter()
            .filter_map(|(k, v)| v.as_string().map(|s| (k.as_str(), s)))
            .collect();
        entries.sort();
        entries
    }

    fn save(&self) -> Result<()> {
        write_atomic(&self.path, |file| {
            plist::to_writer_xml(file, &self.values).context("Failed to encode settings")
        })
    }
}

/// Decode a property list whose top level must be a dictionary
fn parse_dictionary(content: &[u8]) -> Result<Dictionary> {
    if is_empty_plist(content) {
        return Ok(Dictionary::new());
    }

    match Value::from_reader(Cursor::new(content))? {
        Value::Dictionary(dict) => Ok(dict),
        _ => bail!("Expected a dictionary at the top level"),
    }
}

/// A zero-byte file or a `<plist>` element with no children
fn is_empty_plist(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    let text = text.trim();
    if text.is_empty() {
        return true;
    }

    let Some(start) = text.find("<plist") else {
        return false;
    };
    let Some(open_end) = text[start..].find('>') else {
        return false;
    };
    let open_tag = &text[start..start + open_end + 1];
    if open_tag.ends_with("/>") {
        return true;
    }
    text[start + open_end + 1..].trim_start().starts_with("</plist>")
}
