//! Value classification and perspective-scoped extraction for Sporelens.
//!
//! This crate holds the two display-side algorithms:
//!
//! - [`classify`]: infers a presentation category and display priority from
//!   a value's runtime shape alone, optionally adjusted by a field-name hint.
//! - [`extract`]: projects a document through a set of active perspectives,
//!   returning the values found for a field path grouped by the perspective
//!   (or the document root) they came from.
//!
//! Both are pure and total: any input, including `null` and malformed
//! documents, produces a result rather than an error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sporelens_content::{classify, ExtractMode, PerspectiveExtractor, PresentationCategory};
//! use sporelens_core::{Document, PerspectiveTaxonomy};
//!
//! assert_eq!(classify::classify(&json!("toxic")).category, PresentationCategory::Tag);
//!
//! let extractor = PerspectiveExtractor::new(Arc::new(PerspectiveTaxonomy::fungi()));
//! let doc = Document::new("a", json!({"taxonomy": {"genus": "Amanita"}}));
//! let none: [&str; 0] = [];
//! let found = extractor.extract(&doc, Some("taxonomy.genus"), &none, ExtractMode::Simple);
//! assert_eq!(found.get("taxonomy"), Some(&json!("Amanita")));
//! ```

pub mod classify;
pub mod extract;

mod proptests;

pub use classify::{classify_field, order_fields, Classification, ClassifiedField, PresentationCategory};
pub use extract::{resolve_path, ExtractMode, PerspectiveExtractor, PerspectiveValueMap};
