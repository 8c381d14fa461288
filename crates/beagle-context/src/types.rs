//! Path step type shared by the context store and the expression tokenizer.

use std::borrow::Cow;
use std::fmt;

/// A single step of a context path.
///
/// The step keeps the syntax it was written with (`a.0` is a key, `a[0]` is an
/// index), but lookups are resolved by the runtime shape of the value being
/// walked: on a map an `Index(3)` reads the key `"3"`, on a list a `Key("3")`
/// reads the element at index 3.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Property access, written as `.name` or `['name']`.
    Key(String),
    /// Index access, written as `[n]`.
    Index(usize),
}

impl PathStep {
    /// The step as a map key.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathStep::Key(key) => Cow::Borrowed(key.as_str()),
            PathStep::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }

    /// The step as a list index, if it can be read as one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(idx) => Some(*idx),
            PathStep::Key(key) if is_valid_index(key) => key.parse().ok(),
            PathStep::Key(_) => None,
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Check if a string represents a valid non-negative integer list index.
///
/// Leading zeros and signs are rejected so that `"01"` and `"+1"` stay keys.
///
/// # Example
///
/// ```
/// use beagle_context::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("name"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}
