//! Dotted field paths.
//!
//! A [`FieldPath`] addresses a value inside a document: `"commonName"`,
//! `"taxonomy.family"`, `"ecologyAndHabitat.substrate"`. When the search
//! engine descends into an array of objects it synthesizes an index suffix on
//! the array's segment (`"uses[2].preparation"`); callers never supply those,
//! but [`Segment::parse`] understands them so synthesized paths can be resolved
//! again.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dot-separated address of a field inside a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

/// One parsed segment of a [`FieldPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Object key.
    pub key: &'a str,
    /// Array index synthesized during traversal, if any.
    pub index: Option<usize>,
}

impl<'a> Segment<'a> {
    /// Parse a raw segment, splitting off a trailing `[n]` index.
    ///
    /// A malformed suffix (`"uses[x]"`) is kept as part of the key; it will
    /// simply fail to resolve.
    pub fn parse(raw: &'a str) -> Self {
        if let Some(open) = raw.rfind('[')
            && raw.ends_with(']')
            && let Ok(index) = raw[open + 1..raw.len() - 1].parse::<usize>()
        {
            return Self {
                key: &raw[..open],
                index: Some(index),
            };
        }
        Self {
            key: raw,
            index: None,
        }
    }
}

impl FieldPath {
    /// Create a path from its dotted string form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The empty path, used as the traversal root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The dotted string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the traversal root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw segments, including any index suffixes.
    pub fn raw_segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|_| !self.0.is_empty())
    }

    /// Parsed segments.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.raw_segments().map(Segment::parse)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.raw_segments().count()
    }

    /// Returns `true` if the path has exactly one segment.
    pub fn is_single_segment(&self) -> bool {
        self.depth() == 1
    }

    /// Key of the first segment, index stripped.
    pub fn first_key(&self) -> Option<&str> {
        self.segments().next().map(|s| s.key)
    }

    /// Key of the last segment, index stripped.
    pub fn last_key(&self) -> Option<&str> {
        self.segments().last().map(|s| s.key)
    }

    /// Path of a child field.
    pub fn child(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    /// Path of an array element: `key[index]` appended as one segment.
    pub fn element(&self, key: &str, index: usize) -> Self {
        self.child(&format!("{key}[{index}]"))
    }

    /// The path with its first segment removed, if more segments follow.
    pub fn tail(&self) -> Option<Self> {
        self.0
            .split_once('.')
            .map(|(_, rest)| Self(rest.to_string()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// Tests
// ============================================================================
