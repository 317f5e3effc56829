//! Depth-first traversal producing [`SearchResult`]s.
//!
//! The walker visits container entries in document order (object keys as
//! inserted, array elements by index). An entry's own match is recorded
//! before its children are visited. With `stop_on_first_match` the walk
//! breaks out of every level as soon as one result exists.
//!
//! `serde_json::Value` is an owned tree, so the walk always terminates.

use std::ops::ControlFlow;

use serde_json::Value;
use tracing::trace;

use crate::term::{number_text, SearchTerm};
use crate::types::{FindBy, SearchOptions, SearchResult};

/// Search `root` for entries matching `term`.
///
/// The root itself is never a match; only entries inside containers are.
/// A scalar root therefore yields no results.
pub fn search(root: &Value, term: &SearchTerm, options: &SearchOptions) -> Vec<SearchResult> {
    let mut walker = Walker {
        term,
        options,
        path: Vec::new(),
        results: Vec::new(),
    };
    let _ = walker.visit(root);
    trace!(term = %term, hits = walker.results.len(), "search finished");
    walker.results
}

/// Return the first match in traversal order, if any.
pub fn find_first(root: &Value, term: &SearchTerm, options: &SearchOptions) -> Option<SearchResult> {
    let options = options.clone().first_only(true);
    search(root, term, &options).into_iter().next()
}

#[derive(Clone, Copy)]
enum EntryKey<'a> {
    Field(&'a str),
    Index(usize),
}

impl EntryKey<'_> {
    fn segment(self) -> String {
        match self {
            EntryKey::Field(key) => key.to_string(),
            EntryKey::Index(index) => index.to_string(),
        }
    }
}

struct Walker<'a> {
    term: &'a SearchTerm,
    options: &'a SearchOptions,
    path: Vec<String>,
    results: Vec<SearchResult>,
}

impl Walker<'_> {
    fn visit(&mut self, node: &Value) -> ControlFlow<()> {
        match node {
            Value::Object(map) => {
                for (key, value) in map {
                    let flow = self.entry(EntryKey::Field(key), value);
                    if flow.is_break() {
                        return flow;
                    }
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    let flow = self.entry(EntryKey::Index(index), value);
                    if flow.is_break() {
                        return flow;
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn entry(&mut self, key: EntryKey<'_>, value: &Value) -> ControlFlow<()> {
        self.path.push(key.segment());
        let flow = self.check_then_descend(key, value);
        self.path.pop();
        flow
    }

    fn check_then_descend(&mut self, key: EntryKey<'_>, value: &Value) -> ControlFlow<()> {
        if self.is_match(key, value) {
            self.results.push(SearchResult {
                path: self.path.clone(),
                value: value.clone(),
            });
            if self.options.stop_on_first_match {
                return ControlFlow::Break(());
            }
        }
        self.visit(value)
    }

    fn is_match(&self, key: EntryKey<'_>, value: &Value) -> bool {
        let hit = match self.options.find_by {
            FindBy::Key => match key {
                EntryKey::Field(name) => self.matches_text(name, || self.term.equals_key(name)),
                EntryKey::Index(_) => false,
            },
            FindBy::Value => match value {
                Value::String(s) => self.matches_text(s, || self.term.equals_value(value)),
                Value::Number(n) => {
                    self.matches_text(&number_text(n), || self.term.equals_value(value))
                }
                _ => false,
            },
        };

        hit && self
            .options
            .predicate
            .as_ref()
            .map_or(true, |predicate| predicate(value, &self.path))
    }

    /// Partial mode tests containment; exact mode defers to `exact`.
    fn matches_text(&self, target: &str, exact: impl FnOnce() -> bool) -> bool {
        if self.options.match_partial {
            self.term.is_contained_in(target)
        } else {
            exact()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn user_data() -> Value {
        json!({
            "id": 1,
            "name": "Alice",
            "address": { "street": "123 Main St", "city": "Wonderland", "zip": "12345" },
            "events": [
                { "id": 1, "title": "Tea Party", "date": "2024-03-20", "location": "Garden", "attendees": 5 },
                { "id": 2, "title": "Croquet Game", "date": "2024-03-21", "location": "Palace Grounds", "attendees": 8 }
            ],
            "friends": [
                {
                    "id": 2,
                    "name": "Bob",
                    "address": { "street": "456 Elm St", "city": "Wonderland", "zip": "12345" },
                    "events": [],
                    "friends": []
                }
            ]
        })
    }

    fn paths(results: &[SearchResult]) -> Vec<String> {
        results.iter().map(SearchResult::dotted_path).collect()
    }

    #[test]
    fn nested_key_lookup() {
        let doc = json!({ "a": { "b": { "c": "X" } } });
        let results = search(&doc, &"c".into(), &SearchOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, ["a", "b", "c"]);
        assert_eq!(results[0].value, json!("X"));
    }

    #[test]
    fn exact_key_across_arrays() {
        let results = search(&user_data(), &"name".into(), &SearchOptions::default());
        assert_eq!(paths(&results), ["name", "friends.0.name"]);
        assert_eq!(results[0].value, json!("Alice"));
        assert_eq!(results[1].value, json!("Bob"));
    }

    #[test]
    fn partial_value_finds_both_variants() {
        let doc = json!([{ "text": "findme" }, { "text": "findmetoo" }]);
        let opts = SearchOptions::by_value().partial(true);
        let results = search(&doc, &"findme".into(), &opts);
        assert_eq!(paths(&results), ["0.text", "1.text"]);

        let first = search(&doc, &"findme".into(), &opts.first_only(true));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].value, json!("findme"));
    }

    #[test]
    fn partial_value_is_case_insensitive() {
        let opts = SearchOptions::by_value().partial(true);
        let results = search(&user_data(), &"elm".into(), &opts);
        assert_eq!(paths(&results), ["friends.0.address.street"]);
    }

    #[test]
    fn exact_value_is_case_sensitive() {
        let opts = SearchOptions::by_value();
        assert!(search(&user_data(), &"alice".into(), &opts).is_empty());
        assert_eq!(search(&user_data(), &"Alice".into(), &opts).len(), 1);
    }

    #[test]
    fn exact_value_does_not_coerce_types() {
        let opts = SearchOptions::by_value();
        // zip codes are strings
        assert!(search(&user_data(), &12345.into(), &opts).is_empty());
        assert_eq!(search(&user_data(), &"12345".into(), &opts).len(), 2);
        // attendees are numbers
        assert!(search(&user_data(), &"8".into(), &opts).is_empty());
        let eight = search(&user_data(), &8.into(), &opts);
        assert_eq!(paths(&eight), ["events.1.attendees"]);
    }

    #[test]
    fn partial_number_matches_text_form() {
        let opts = SearchOptions::by_value().partial(true);
        let results = search(&json!({ "n": 2024, "s": "x" }), &20.into(), &opts);
        assert_eq!(paths(&results), ["n"]);
    }

    #[test]
    fn partial_whole_float_reads_as_integer() {
        let doc = json!({ "a": 1.0, "b": 2.5, "c": 10 });
        let opts = SearchOptions::by_value().partial(true);
        assert!(search(&doc, &"1.0".into(), &opts).is_empty());
        assert_eq!(paths(&search(&doc, &"1".into(), &opts)), ["a", "c"]);
        assert_eq!(paths(&search(&doc, &"2.5".into(), &opts)), ["b"]);
    }

    #[test]
    fn regex_key_search() {
        let term = SearchTerm::pattern("^na").unwrap();
        let results = search(&user_data(), &term, &SearchOptions::by_key().partial(true));
        assert_eq!(paths(&results), ["name", "friends.0.name"]);
    }

    #[test]
    fn regex_is_ignored_in_exact_mode() {
        let term = SearchTerm::pattern("name").unwrap();
        assert!(search(&user_data(), &term, &SearchOptions::by_key()).is_empty());
    }

    #[test]
    fn containers_are_never_matched_by_value() {
        let doc = json!({ "a": { "b": "x" }, "c": ["x"] });
        let results = search(&doc, &"x".into(), &SearchOptions::by_value());
        assert_eq!(paths(&results), ["a.b", "c.0"]);
    }

    #[test]
    fn array_indices_are_not_keys() {
        let doc = json!({ "list": ["a", "b"], "0": "zero" });
        let results = search(&doc, &"0".into(), &SearchOptions::by_key());
        assert_eq!(paths(&results), ["0"]);
    }

    #[test]
    fn pre_order_records_parent_before_children() {
        let doc = json!({ "address": { "address_line": "x" } });
        let results = search(&doc, &"address".into(), &SearchOptions::by_key().partial(true));
        assert_eq!(paths(&results), ["address", "address.address_line"]);
        assert_eq!(results[0].value, json!({ "address_line": "x" }));
    }

    #[test]
    fn stop_on_first_match_halts_whole_walk() {
        let opts = SearchOptions::by_value().first_only(true);
        let results = search(&user_data(), &"Wonderland".into(), &opts);
        assert_eq!(paths(&results), ["address.city"]);
    }

    #[test]
    fn predicate_is_an_additional_condition() {
        let opts = SearchOptions::by_key().with_predicate(|_, path| path.iter().any(|p| p == "friends"));
        let results = search(&user_data(), &"city".into(), &opts);
        assert_eq!(paths(&results), ["friends.0.address.city"]);

        let busy = SearchOptions::by_key()
            .with_predicate(|value, _| value.as_f64().is_some_and(|n| n > 5.0));
        let results = search(&user_data(), &"attendees".into(), &busy);
        assert_eq!(paths(&results), ["events.1.attendees"]);
    }

    #[test]
    fn predicate_alone_does_not_match() {
        let opts = SearchOptions::by_key().with_predicate(|_, _| true);
        assert!(search(&user_data(), &"missing".into(), &opts).is_empty());
    }

    #[test]
    fn scalar_root_has_no_results() {
        assert!(search(&json!("c"), &"c".into(), &SearchOptions::by_value()).is_empty());
        assert!(search(&Value::Null, &"c".into(), &SearchOptions::default()).is_empty());
    }

    #[test]
    fn find_first_returns_earliest() {
        let first = find_first(&user_data(), &"zip".into(), &SearchOptions::default()).unwrap();
        assert_eq!(first.dotted_path(), "address.zip");
        assert!(find_first(&user_data(), &"nope".into(), &SearchOptions::default()).is_none());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-50i64..50).prop_map(Value::from),
            "[a-c]{0,3}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-c]{1,2}", inner), 0..4)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    fn arb_options() -> impl Strategy<Value = SearchOptions> {
        (any::<bool>(), any::<bool>()).prop_map(|(by_value, partial)| {
            let opts = if by_value {
                SearchOptions::by_value()
            } else {
                SearchOptions::by_key()
            };
            opts.partial(partial)
        })
    }

    proptest! {
        #[test]
        fn first_match_is_head_of_full_walk(doc in arb_json(), term in "[a-c]{1,2}", opts in arb_options()) {
            let term = SearchTerm::from(term);
            let all = search(&doc, &term, &opts);
            let first = search(&doc, &term, &opts.clone().first_only(true));
            prop_assert!(first.len() <= 1);
            prop_assert_eq!(first.first(), all.first());
        }

        #[test]
        fn every_path_points_at_its_value(doc in arb_json(), term in "[a-c]{1,2}", opts in arb_options()) {
            let term = SearchTerm::from(term);
            for result in search(&doc, &term, &opts) {
                prop_assert_eq!(doc.pointer(&result.pointer()), Some(&result.value));
            }
        }
    }
}
