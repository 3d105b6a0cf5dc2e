//! Sporelens Core: shared types, taxonomy, configuration, and errors.
//!
//! This crate provides the foundational types used across all Sporelens crates.
//! It has no internal Sporelens dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`document`]: Immutable document records and boundary parsing
//! - [`path`]: Dotted field paths
//! - [`perspective`]: Perspective taxonomy and field-to-perspective table
//! - [`config`]: TOML configuration
//! - [`util`]: Config path resolution

#![doc = include_str!("../README.md")]

pub mod config;
pub mod document;
pub mod error;
pub mod path;
pub mod perspective;
pub mod util;

// Re-export key types at crate root for convenience
pub use config::{SearchSettings, SporelensConfig, TaxonomyConfig, WeightsConfig};
pub use document::{load_documents, parse_documents, Document};
pub use error::{Error, Result};
pub use path::{FieldPath, Segment};
pub use perspective::{PerspectiveDef, PerspectiveTaxonomy, ROOT_KEY};
pub use util::resolver::ConfigLocator;
