//! Identifier generation for items that arrive without an `id`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use uuid::Uuid;

/// A source of unique identifiers. Consulted only for items lacking an id.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;

    /// The id as written into the item's JSON form. Strings by default.
    fn next_value(&self) -> Value {
        Value::String(self.next_id())
    }
}

impl<F> IdSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_id(&self) -> String {
        self()
    }
}

/// Time-ordered UUID v7 identifiers. The default source.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Counter-based identifiers (`"1"`, `"2"`, ...) for deterministic tests.
///
/// [`numeric`](Self::numeric) writes JSON numbers instead, for item types
/// whose `id` is an integer.
#[derive(Debug)]
pub struct SequentialIdSource {
    next: AtomicU64,
    numeric: bool,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
            numeric: false,
        }
    }

    /// Like [`new`](Self::new), but ids are JSON numbers.
    pub fn numeric() -> Self {
        Self {
            numeric: true,
            ..Self::new()
        }
    }

    fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> String {
        self.advance().to_string()
    }

    fn next_value(&self) -> Value {
        if self.numeric {
            Value::from(self.advance())
        } else {
            Value::String(self.next_id())
        }
    }
}
