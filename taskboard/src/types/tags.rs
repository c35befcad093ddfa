//! Normalized tag sets.

use serde::{Deserialize, Serialize};

/// A set of tags: trimmed, lower-cased, non-empty and de-duplicated.
///
/// Insertion order is kept for display; matching ignores it. Every way of
/// building a `Tags` value normalizes, so the invariant holds for any value
/// of this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse comma-separated user input: `"UI, bug ,ui"` -> `["ui", "bug"]`
    pub fn parse(input: &str) -> Self {
        input.split(',').collect()
    }

    /// Add a tag, normalizing it. Returns false if it was empty or already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Membership test against a raw tag (normalized before comparing)
    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.0.iter().any(|t| *t == tag)
    }

    /// True if every tag in `other` is also in `self`
    pub fn contains_all(&self, other: &Tags) -> bool {
        other.iter().all(|t| self.0.iter().any(|mine| mine == t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags joined with `sep`, in display order
    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag.as_ref());
        }
        tags
    }
}

impl From<Vec<String>> for Tags {
    fn from(raw: Vec<String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}
