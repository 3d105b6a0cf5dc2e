//! Immutable document records.
//!
//! A [`Document`] wraps the JSON tree of one entity (a fungus record) together
//! with a stable identifier. Documents are parsed once, at the system
//! boundary, and then passed by reference through classification, extraction,
//! and search; none of those stages mutate or re-parse them.
//!
//! # Accepted input
//!
//! ```json
//! [ { "id": "amanita-muscaria", "commonName": "Fly Agaric", "taxonomy": { ... } } ]
//! ```
//!
//! or an object wrapping the array: `{ "documents": [ ... ] }`.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// One schema-less entity record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    id: String,
    data: Value,
}

impl Document {
    /// Create a document with an explicit identifier.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Create a document from a collection element.
    ///
    /// The identifier is taken from a string or numeric `id` field; otherwise
    /// it is `#<position>`.
    pub fn from_value(position: usize, data: Value) -> Self {
        let id = match data.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("#{position}"),
        };
        Self { id, data }
    }

    /// Stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full JSON tree.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Direct root-level lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Parse a JSON document collection.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the text is not JSON, is not an array (or an
/// object with a `documents` array), or two elements share an identifier.
pub fn parse_documents(json: &str) -> Result<Vec<Document>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| Error::parse("documents", e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("documents") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::parse(
                    "documents",
                    "expected an array or an object with a `documents` array",
                ));
            }
        },
        _ => {
            return Err(Error::parse(
                "documents",
                "expected an array or an object with a `documents` array",
            ));
        }
    };

    let documents: Vec<Document> = items
        .into_iter()
        .enumerate()
        .map(|(position, data)| Document::from_value(position, data))
        .collect();

    let mut seen = HashSet::with_capacity(documents.len());
    for doc in &documents {
        if !seen.insert(doc.id()) {
            return Err(Error::parse(
                "documents",
                format!("duplicate document id '{}'", doc.id()),
            ));
        }
    }

    log::debug!("Parsed {} documents", documents.len());
    Ok(documents)
}

/// Read and parse a JSON document collection from disk.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    parse_documents(&content)
}

// ============================================================================
// Tests
// ============================================================================
