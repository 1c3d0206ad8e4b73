//! Shared filesystem helpers

use anyhow::{Context, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write a file atomically: the content goes to a temp file in the same
/// directory which then replaces `path` in one rename.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = path
        .parent()
        .with_context(|| format!("No parent directory for: {}", path.display()))?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
    write(&mut file)?;
    file.persist(path)
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    Ok(())
}

/// Mask a secret for display, keeping only the part before the first ':'
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((user, _)) => format!("{}:********", user),
        None => "********".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, |file| {
            file.write_all(b"new")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_failure_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |_| anyhow::bail!("boom"));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("alice:ABC123"), "alice:********");
        assert_eq!(mask_token("garbage"), "********");
    }
}
