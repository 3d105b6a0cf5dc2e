//! Weighted search and ranking for Sporelens.
//!
//! This crate scores schema-less documents against free-text queries, ranks
//! the results, and aggregates perspective hit counts across a collection.
//! It also provides the event-driven [`SearchService`] that drives those
//! steps from typed input events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      sporelens-fts                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  QueryMatcher (word-boundary + substring fallback)          │
//! │  FieldWeights (per-field weight table)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  WeightedSearchEngine  document, query → SearchResult       │
//! │  PerspectiveAggregator results → Ranking + summary          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchService (mpsc in; watch + broadcast + observers out) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine and aggregator are synchronous and never fail; the service is
//! a thin adapter around them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sporelens_core::{Document, PerspectiveTaxonomy};
//! use sporelens_fts::{PerspectiveAggregator, WeightedSearchEngine};
//!
//! let engine = WeightedSearchEngine::new(Arc::new(PerspectiveTaxonomy::fungi()));
//! let docs = vec![
//!     Document::new("a", json!({"ecologyAndHabitat": {"substrate": ["dead wood", "soil"]}})),
//!     Document::new("b", json!({"commonName": "Fly Agaric"})),
//! ];
//!
//! let results = engine.score_all(&docs, "wood");
//! let ranking = PerspectiveAggregator::default().rank("wood", results);
//!
//! assert_eq!(ranking.summary.visible_count, 1);
//! assert_eq!(ranking.summary.matched_perspectives, vec!["ecologyAndHabitat"]);
//! ```

pub mod aggregate;
pub mod engine;
pub mod matcher;
pub mod service;
pub mod types;
pub mod weights;

mod proptests;

pub use aggregate::{PerspectiveAggregator, RankedResult, Ranking};
pub use engine::WeightedSearchEngine;
pub use matcher::{matches_word, QueryMatcher};
pub use service::{
    DisplayedField, FieldView, InputEvent, OutputEvent, RankingSnapshot, SearchHandle,
    SearchService,
};
pub use types::{CollectionSummary, RankOptions, SearchResult, Visibility};
pub use weights::FieldWeights;
