//! Ordered set of strings.
//!
//! Used for import path sets (imports, importers), revisions and remote
//! sources. Iteration order is lexicographic so anything derived from a
//! set is reproducible across runs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered set of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringSet {
    items: BTreeSet<String>,
}

impl StringSet {
    /// Create an empty set.
    pub fn new() -> Self {
        StringSet {
            items: BTreeSet::new(),
        }
    }

    /// Add a single value. Returns true if it was not already present.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        self.items.insert(value.into())
    }

    /// Add every value from an iterator.
    pub fn extend<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items.extend(values.into_iter().map(Into::into));
    }

    /// Add every member of `other` to this set.
    pub fn union(&mut self, other: &StringSet) {
        self.items.extend(other.items.iter().cloned());
    }

    /// Check membership.
    pub fn contains(&self, value: &str) -> bool {
        self.items.contains(value)
    }

    /// Iterate in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Copy the members into a sorted vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StringSet::new();
        set.extend(iter);
        set
    }
}

impl fmt::Display for StringSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}
