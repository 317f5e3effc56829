//! Admission predicates over the untyped JSON form of an item.
//!
//! A [`Validator`] sees the item exactly as it will be persisted (after id
//! assignment) and answers yes or no. The collection never inspects items
//! beyond this and the `id` field.

use std::sync::Arc;

use serde_json::Value;

/// Admission predicate: `true` admits the item.
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Wrap a closure as a [`Validator`].
pub fn from_fn<F>(f: F) -> Validator
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Admit every item.
pub fn accept_all() -> Validator {
    Arc::new(|_| true)
}

/// Admit JSON objects that contain every one of `keys`.
///
/// Presence is all that is checked; a key holding `null` still counts.
pub fn required_keys<I, S>(keys: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    Arc::new(move |value| match value {
        Value::Object(map) => keys.iter().all(|key| map.contains_key(key)),
        _ => false,
    })
}
