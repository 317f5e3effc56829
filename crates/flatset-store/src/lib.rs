//! Validation-gated collection store persisted to a single JSON file.
//!
//! A [`Collection`] keeps an insertion-ordered set of items in memory and
//! mirrors it to a backing text file as a pretty-printed JSON array. Every
//! operation that touches the backing file goes through the collection's
//! [`flatset_queue::OperationQueue`], so loads, saves and adds never
//! interleave and always take effect in the order they were called.
//!
//! # Key Types
//!
//! - [`Collection`] -- the store itself
//! - [`StoreConfig`] -- file path and write behaviour, loadable from TOML
//! - [`TextStorage`] -- where the JSON text lives ([`FileStorage`], [`MemoryStorage`])
//! - [`IdSource`] -- generator for missing `id` fields ([`UuidIdSource`], [`SequentialIdSource`])
//! - [`Validator`] -- admission predicate over the untyped JSON form of an item
//!
//! # Design Rules
//!
//! 1. Every item held in memory passed the validator when it was admitted.
//! 2. Membership is by equality of the persisted JSON record, not by id.
//!    The record keeps generated ids and fields `T` does not declare.
//! 3. Writes persist the full collection; there is no incremental format.
//! 4. A missing backing file is an empty collection. Any other I/O or parse
//!    failure is returned to the caller and leaves memory untouched.

pub mod collection;
pub mod config;
pub mod error;
pub mod file;
pub mod id;
pub mod memory;
mod set;
pub mod traits;
pub mod validator;

pub use collection::{Collection, CollectionBuilder, Item, ID_FIELD};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::FileStorage;
pub use id::{IdSource, SequentialIdSource, UuidIdSource};
pub use memory::MemoryStorage;
pub use traits::TextStorage;
pub use validator::Validator;

pub use flatset_queue::Pending;
pub use flatset_search::{FindBy, SearchOptions, SearchResult, SearchTerm};
