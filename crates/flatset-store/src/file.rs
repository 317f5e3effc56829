//! File-backed [`TextStorage`].

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::TextStorage;

/// Stores the collection text in a single file on disk.
///
/// With atomic writes enabled the text goes to a hidden sibling file
/// (`.<name>.tmp`) that is then renamed over the target, so readers never see
/// a half-written array. This only protects against torn writes, not against
/// other processes writing the same file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
    atomic: bool,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: true,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.file_path.clone(),
            atomic: config.atomic_writes,
        }
    }

    /// Enable or disable temp-file-and-rename writes.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> StoreResult<PathBuf> {
        let name = self.path.file_name().ok_or_else(|| {
            StoreError::Config(format!("backing path has no file name: {}", self.path.display()))
        })?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(name);
        temp_name.push(".tmp");
        Ok(self.path.with_file_name(temp_name))
    }
}

#[async_trait]
impl TextStorage for FileStorage {
    async fn read_text(&self) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_text(&self, text: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        if !self.atomic {
            tokio::fs::write(&self.path, text).await?;
            return Ok(());
        }

        let temp = self.temp_path()?;
        tokio::fs::write(&temp, text).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), bytes = text.len(), "collection file replaced");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
