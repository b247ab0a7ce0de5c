//! Flat-file credential lists (allowed IP addresses, access tokens).
//!
//! Both lists are newline-delimited text files edited either by hand on
//! the host or through the website-settings endpoints. The store reloads
//! from disk on every read so out-of-band edits take effect immediately;
//! nothing is cached in the process.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// One newline-delimited credential list with an injected file path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the list from disk. Lines are trimmed and empty lines dropped.
    ///
    /// A missing or unreadable file is a [`CoreError::Configuration`];
    /// callers decide whether that is fatal (the access gate treats a
    /// missing allow-list as "not configured", the settings endpoint as
    /// an error).
    pub fn load(&self) -> Result<Vec<String>, CoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::Configuration(format!(
                "cannot read credential file {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(parse_lines(&contents))
    }

    /// Overwrite the list on disk with trimmed, non-empty lines.
    ///
    /// No atomicity beyond the underlying filesystem write.
    pub fn save(&self, lines: &[String]) -> Result<(), CoreError> {
        let cleaned: Vec<&str> = lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        std::fs::write(&self.path, cleaned.join("\n")).map_err(|e| {
            CoreError::Configuration(format!(
                "cannot write credential file {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// Split file contents into trimmed, non-empty lines. Handles both `\n`
/// and `\r\n` endings.
fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_trims_and_drops_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.txt");
        std::fs::write(&path, "  alpha  \n\n\r\nbeta\r\n   \ngamma").unwrap();

        let store = CredentialStore::new(&path);
        assert_eq!(store.load().unwrap(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn load_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nope.txt"));
        assert!(matches!(store.load(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("ips.txt"));

        let lines = vec![
            "10.0.0.1".to_string(),
            "  10.0.0.2 ".to_string(),
            "".to_string(),
        ];
        store.save(&lines).unwrap();
        assert_eq!(store.load().unwrap(), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn save_preserves_duplicates_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("ips.txt"));

        let lines = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        store.save(&lines).unwrap();
        assert_eq!(store.load().unwrap(), vec!["b", "a", "b"]);
    }
}
