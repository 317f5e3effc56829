use std::fmt;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Where a collection's JSON text lives.
///
/// Implementations must keep "not found" distinguishable from every other
/// read failure: the collection treats the former as an empty collection and
/// propagates the latter.
#[async_trait]
pub trait TextStorage: Send + Sync + fmt::Debug {
    /// Read the full backing text.
    ///
    /// Returns `Ok(None)` if nothing has been written yet.
    /// Returns `Err` on any other failure.
    async fn read_text(&self) -> StoreResult<Option<String>>;

    /// Replace the full backing text.
    async fn write_text(&self, text: &str) -> StoreResult<()>;

    /// Human-readable location, used in log fields.
    fn location(&self) -> String;
}
