//! Deep, path-annotated search over nested JSON structures.
//!
//! The engine walks a [`serde_json::Value`] depth-first and reports every
//! entry whose key or primitive value matches a [`SearchTerm`]. Each hit is a
//! [`SearchResult`] carrying the full path from the traversal root.
//!
//! # Matching
//!
//! - [`FindBy::Key`] compares object keys against the term. Array indices
//!   appear in paths but are never matched as keys.
//! - [`FindBy::Value`] compares string and number values. Objects and arrays
//!   are only descended into, never matched by value.
//! - Exact matching is case- and type-sensitive: `"5"` never equals `5`.
//! - Partial matching is a case-insensitive substring test, or a regex test
//!   for [`SearchTerm::Pattern`].
//! - An optional predicate over `(value, path)` must also hold.
//!
//! # Example
//!
//! ```
//! use flatset_search::{search, SearchOptions};
//! use serde_json::json;
//!
//! let doc = json!({ "a": { "b": { "c": "X" } } });
//! let hits = search(&doc, &"c".into(), &SearchOptions::default());
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].path, ["a", "b", "c"]);
//! assert_eq!(hits[0].value, json!("X"));
//! ```

pub mod engine;
pub mod term;
pub mod types;

pub use engine::{find_first, search};
pub use term::SearchTerm;
pub use types::{FindBy, Predicate, SearchOptions, SearchResult};
