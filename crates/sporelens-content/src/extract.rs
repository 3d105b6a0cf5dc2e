//! Perspective-scoped field extraction.
//!
//! [`PerspectiveExtractor::extract`] answers "what does this document say
//! about `field_path` under the current lens?". The answer is a
//! [`PerspectiveValueMap`]: each perspective (or the sentinel `"root"`) that
//! holds a value for the path, mapped to that value.
//!
//! # Resolution
//!
//! Candidate perspectives are the active ones that the taxonomy knows, in
//! taxonomy order, or every known perspective when none are active.
//!
//! | Path | Strategy |
//! |------|----------|
//! | none, `Deep` mode | every candidate's non-empty sub-tree |
//! | none, `Simple` mode | nothing |
//! | `edibility` | root key under `"root"`, plus the key at each candidate's top level |
//! | `taxonomy.family` | strictly inside the named perspective |
//! | `cap.color` | the full path inside each candidate |
//!
//! A missing segment only removes that candidate from the result; it is never
//! an error. Extraction keeps no state between calls.

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sporelens_core::{Document, FieldPath, PerspectiveTaxonomy, Segment, ROOT_KEY};

/// Extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Look up a specific field path.
    #[default]
    Simple,
    /// Without a path, return each candidate perspective's whole sub-tree.
    Deep,
}

// ============================================================================
// PerspectiveValueMap
// ============================================================================

/// Values found for one field path, keyed by originating perspective.
///
/// Ordered: `"root"` first, then perspectives in taxonomy order. Serializes
/// as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerspectiveValueMap {
    entries: Vec<(String, Value)>,
}

impl PerspectiveValueMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: &str, value: &Value) {
        self.entries.push((key.to_string(), value.clone()));
    }

    /// Value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if `key` has a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PerspectiveValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Projects documents through the perspective taxonomy.
#[derive(Debug, Clone)]
pub struct PerspectiveExtractor {
    taxonomy: Arc<PerspectiveTaxonomy>,
}

impl PerspectiveExtractor {
    /// Create an extractor over a shared taxonomy.
    pub fn new(taxonomy: Arc<PerspectiveTaxonomy>) -> Self {
        Self { taxonomy }
    }

    /// The taxonomy in use.
    pub fn taxonomy(&self) -> &PerspectiveTaxonomy {
        &self.taxonomy
    }

    /// Extract the values for `field_path` under the active perspectives.
    ///
    /// A blank `field_path` is treated as absent.
    pub fn extract<S: AsRef<str>>(
        &self,
        document: &Document,
        field_path: Option<&str>,
        active: &[S],
        mode: ExtractMode,
    ) -> PerspectiveValueMap {
        let mut found = PerspectiveValueMap::new();
        let candidates = self.taxonomy.candidates(active);

        let Some(path) = field_path.map(str::trim).filter(|p| !p.is_empty()) else {
            if mode == ExtractMode::Deep {
                for perspective in candidates {
                    if let Some(subtree) = document.get(perspective).filter(|v| !is_empty_value(v)) {
                        found.insert(perspective, subtree);
                    }
                }
            }
            return found;
        };

        let path = FieldPath::new(path);
        if path.is_single_segment() {
            self.extract_single(document, &path, &candidates, &mut found);
        } else if let Some(named) = self.named_perspective(&path) {
            // Strictly inside the named perspective, active set or not.
            if let Some(value) = path
                .tail()
                .and_then(|rest| document.get(named).and_then(|root| resolve_path(root, &rest)))
            {
                found.insert(named, value);
            }
        } else {
            for perspective in candidates {
                if let Some(value) = document
                    .get(perspective)
                    .and_then(|root| resolve_path(root, &path))
                {
                    found.insert(perspective, value);
                }
            }
        }

        log::trace!(
            "extract '{}' from '{}': {} hit(s)",
            path,
            document.id(),
            found.len()
        );
        found
    }

    fn extract_single(
        &self,
        document: &Document,
        path: &FieldPath,
        candidates: &[&str],
        found: &mut PerspectiveValueMap,
    ) {
        // A top-level perspective key is not a root-level field
        let names_perspective = path
            .first_key()
            .is_some_and(|key| self.taxonomy.is_perspective(key));
        if !names_perspective && let Some(value) = resolve_path(document.data(), path) {
            found.insert(ROOT_KEY, value);
        }
        // Every hit is kept: the same field may live in several perspectives.
        for perspective in candidates {
            if let Some(value) = document
                .get(perspective)
                .and_then(|root| resolve_path(root, path))
            {
                found.insert(perspective, value);
            }
        }
    }

    /// The perspective named by a multi-segment path's first segment.
    fn named_perspective<'p>(&self, path: &'p FieldPath) -> Option<&'p str> {
        path.raw_segments()
            .next()
            .filter(|first| self.taxonomy.is_perspective(first))
    }

    /// Field paths a document view shows: root-level fields, then each
    /// present perspective's top-level fields (`perspective.field`).
    ///
    /// These are the paths re-extracted when the active perspective set
    /// changes.
    pub fn displayable_paths(&self, document: &Document) -> Vec<FieldPath> {
        let Value::Object(root) = document.data() else {
            return Vec::new();
        };

        let mut paths: Vec<FieldPath> = root
            .keys()
            .filter(|key| !self.taxonomy.is_perspective(key))
            .map(|key| FieldPath::new(key.as_str()))
            .collect();

        for perspective in self.taxonomy.names() {
            if let Some(Value::Object(fields)) = root.get(perspective) {
                let base = FieldPath::new(perspective);
                paths.extend(fields.keys().map(|key| base.child(key)));
            }
        }
        paths
    }
}

/// Follow `path` from `root`, descending through objects and, for indexed
/// segments, arrays. `null` counts as absent.
pub fn resolve_path<'v>(root: &'v Value, path: &FieldPath) -> Option<&'v Value> {
    if path.is_root() {
        return None;
    }
    let mut current = root;
    for Segment { key, index } in path.segments() {
        if key.is_empty() {
            return None;
        }
        current = current.as_object()?.get(key)?;
        if let Some(i) = index {
            current = current.as_array()?.get(i)?;
        }
    }
    (!current.is_null()).then_some(current)
}

/// `null`, `""`, `[]`, `{}`.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
