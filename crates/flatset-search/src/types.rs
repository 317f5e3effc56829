use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Secondary filter over a candidate match: `(value, path) -> keep?`.
pub type Predicate = Arc<dyn Fn(&Value, &[String]) -> bool + Send + Sync>;

/// Which side of an entry is compared against the search term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindBy {
    /// Compare object keys.
    #[default]
    Key,
    /// Compare string and number values.
    Value,
}

/// Knobs for a single search call.
#[derive(Clone, Default)]
pub struct SearchOptions {
    pub find_by: FindBy,
    /// Substring (case-insensitive) or regex matching instead of equality.
    pub match_partial: bool,
    /// Halt the whole traversal after the first match.
    pub stop_on_first_match: bool,
    /// Extra condition that must hold alongside the `find_by` rule.
    pub predicate: Option<Predicate>,
}

impl SearchOptions {
    /// Options matching on keys (the default).
    pub fn by_key() -> Self {
        Self::default()
    }

    /// Options matching on primitive values.
    pub fn by_value() -> Self {
        Self {
            find_by: FindBy::Value,
            ..Self::default()
        }
    }

    pub fn partial(mut self, match_partial: bool) -> Self {
        self.match_partial = match_partial;
        self
    }

    pub fn first_only(mut self, stop_on_first_match: bool) -> Self {
        self.stop_on_first_match = stop_on_first_match;
        self
    }

    /// Attach a predicate that every match must also satisfy.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &[String]) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("find_by", &self.find_by)
            .field("match_partial", &self.match_partial)
            .field("stop_on_first_match", &self.stop_on_first_match)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// One match: where it was found and what was there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Keys and stringified array indices from the traversal root.
    pub path: Vec<String>,
    /// The matched entry's value.
    pub value: Value,
}

impl SearchResult {
    /// The path as a dotted string, e.g. `friends.0.name`.
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// The path as an RFC 6901 JSON pointer, usable with [`Value::pointer`].
    pub fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_by_exact_key() {
        let opts = SearchOptions::default();
        assert_eq!(opts.find_by, FindBy::Key);
        assert!(!opts.match_partial);
        assert!(!opts.stop_on_first_match);
        assert!(opts.predicate.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let opts = SearchOptions::by_value()
            .partial(true)
            .first_only(true)
            .with_predicate(|v, _| v.is_string());
        assert_eq!(opts.find_by, FindBy::Value);
        assert!(opts.match_partial);
        assert!(opts.stop_on_first_match);
        let predicate = opts.predicate.as_ref().unwrap();
        assert!(predicate(&json!("x"), &[]));
        assert!(!predicate(&json!(1), &[]));
    }

    #[test]
    fn find_by_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&FindBy::Value).unwrap(), "\"value\"");
        let parsed: FindBy = serde_json::from_str("\"key\"").unwrap();
        assert_eq!(parsed, FindBy::Key);
    }

    #[test]
    fn pointer_resolves_against_document() {
        let doc = json!({ "a/b": [ { "c~d": 1 } ] });
        let result = SearchResult {
            path: vec!["a/b".into(), "0".into(), "c~d".into()],
            value: json!(1),
        };
        assert_eq!(result.pointer(), "/a~1b/0/c~0d");
        assert_eq!(doc.pointer(&result.pointer()), Some(&json!(1)));
        assert_eq!(result.dotted_path(), "a/b.0.c~d");
    }
}
