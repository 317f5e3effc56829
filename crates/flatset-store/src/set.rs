//! Insertion-ordered record set with hashed membership.
//!
//! Each record is kept twice: the JSON form exactly as persisted (generated
//! id included, unknown fields preserved) and the typed item decoded from
//! it. Membership is by JSON record, looked up through a key-order
//! independent canonical encoding.

use std::collections::HashSet;

use serde_json::{Map, Value};

#[derive(Debug)]
pub(crate) struct Record<T> {
    pub(crate) value: Value,
    pub(crate) item: T,
}

#[derive(Debug)]
pub(crate) struct RecordSet<T> {
    records: Vec<Record<T>>,
    seen: HashSet<String>,
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T> RecordSet<T> {
    /// Append a record unless an equal one is present. Returns `true` if added.
    pub(crate) fn insert(&mut self, value: Value, item: T) -> bool {
        if !self.seen.insert(canonical(&value)) {
            return false;
        }
        self.records.push(Record { value, item });
        true
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Record<T>> {
        self.records.iter()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.records.iter().map(|record| &record.value)
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.records.iter().map(|record| &record.item)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Compact JSON with object keys sorted at every level.
fn canonical(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sorted(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
