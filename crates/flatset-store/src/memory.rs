//! In-memory text storage for testing and ephemeral collections.
//!
//! [`MemoryStorage`] holds the collection text in a `RwLock<Option<String>>`.
//! It can be switched to read-only to exercise write-failure paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::TextStorage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    text: RwLock<Option<String>>,
    writes: AtomicUsize,
    read_only: AtomicBool,
}

impl MemoryStorage {
    /// Empty storage: reads report "not found" until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(Some(text.into())),
            ..Self::default()
        }
    }

    /// Current contents, if any.
    pub fn contents(&self) -> Option<String> {
        self.text.read().expect("lock poisoned").clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// When set, every write fails with [`StoreError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextStorage for MemoryStorage {
    async fn read_text(&self) -> StoreResult<Option<String>> {
        Ok(self.contents())
    }

    async fn write_text(&self, text: &str) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        *self.text.write().expect("lock poisoned") = Some(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
