//! Sporelens fungus-record search, umbrella crate.
//!
//! This crate re-exports all Sporelens components for convenience.
//! Use feature flags to enable specific functionality.

#![doc = include_str!("../README.md")]

pub use sporelens_content as content;
pub use sporelens_core as core;

#[cfg(feature = "fts")]
pub use sporelens_fts as fts;

#[cfg(feature = "cli")]
pub use sporelens_cli as cli;
