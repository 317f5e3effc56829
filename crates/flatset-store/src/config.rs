use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for a file-backed [`Collection`](crate::Collection).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the backing JSON file.
    pub file_path: PathBuf,
    /// Pretty-print the JSON array (two-space indent) on save.
    pub pretty: bool,
    /// Write to a sibling temporary file and rename it over the target.
    pub atomic_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("flatset.json"),
            pretty: true,
            atomic_writes: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration pointing at `file_path`.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.file_path, PathBuf::from("flatset.json"));
        assert!(c.pretty);
        assert!(c.atomic_writes);
    }

    #[test]
    fn parse_partial_toml() {
        let c = StoreConfig::from_toml_str("file_path = \"data/users.json\"\npretty = false\n").unwrap();
        assert_eq!(c.file_path, PathBuf::from("data/users.json"));
        assert!(!c.pretty);
        assert!(c.atomic_writes);
    }

    #[test]
    fn parse_rejects_bad_types() {
        let err = StoreConfig::from_toml_str("pretty = \"yes\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn from_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let path = dir.path().join("flatset.toml");
        std::fs::write(&path, "atomic_writes = false").unwrap();
        let c = StoreConfig::from_file(&path).unwrap();
        assert!(!c.atomic_writes);
    }
}
