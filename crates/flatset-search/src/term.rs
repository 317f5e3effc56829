use std::fmt;

use regex::Regex;
use serde_json::{Number, Value};

/// What a search compares against: a string, a number, or a regex.
#[derive(Clone, Debug)]
pub enum SearchTerm {
    /// Literal text. Exact matches are case-sensitive.
    Text(String),
    /// A number. Only ever equal to JSON numbers, never to strings.
    Number(f64),
    /// A regular expression, tested only when matching partially.
    Pattern(Regex),
}

impl SearchTerm {
    /// Compile `pattern` into a [`SearchTerm::Pattern`].
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Exact key comparison. Only text terms can equal a key.
    pub(crate) fn equals_key(&self, key: &str) -> bool {
        matches!(self, Self::Text(text) if text == key)
    }

    /// Exact value comparison, with no coercion between strings and numbers.
    pub(crate) fn equals_value(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text(text), Value::String(s)) => text == s,
            (Self::Number(n), Value::Number(v)) => v.as_f64() == Some(*n),
            _ => false,
        }
    }

    /// Partial comparison: regex test, or case-insensitive containment of the
    /// term's text form.
    pub(crate) fn is_contained_in(&self, target: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(target),
            other => target
                .to_lowercase()
                .contains(&other.to_string().to_lowercase()),
        }
    }
}

/// Text form of a JSON number for partial matching. Floats print through
/// `f64`'s `Display`, so a whole-valued `1.0` reads as `1`.
pub(crate) fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for SearchTerm {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SearchTerm {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for SearchTerm {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for SearchTerm {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for SearchTerm {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<Regex> for SearchTerm {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}
