//! Weighted recursive search over schema-less documents.
//!
//! [`WeightedSearchEngine`] scores one document against one query by
//! walking the whole document tree. Every field name and every primitive
//! value is tested with the [`QueryMatcher`]; a value match adds the field's
//! weight, a field-name match adds the weight scaled by
//! `name_match_factor`. All contributions are additive, so the score does
//! not depend on traversal order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sporelens_core::{Document, PerspectiveTaxonomy};
//! use sporelens_fts::WeightedSearchEngine;
//!
//! let engine = WeightedSearchEngine::new(Arc::new(PerspectiveTaxonomy::fungi()));
//! let doc = Document::new("fly-agaric", json!({"commonName": "Fly Agaric"}));
//!
//! let result = engine.score(&doc, "agaric");
//! assert!(result.score > 0.0);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use sporelens_core::{Document, FieldPath, PerspectiveTaxonomy, SearchSettings, SporelensConfig};

use crate::matcher::QueryMatcher;
use crate::types::SearchResult;
use crate::weights::FieldWeights;

/// Scores documents against free-text queries.
#[derive(Debug, Clone)]
pub struct WeightedSearchEngine {
    weights: FieldWeights,
    taxonomy: Arc<PerspectiveTaxonomy>,
    settings: SearchSettings,
}

/// Running totals for one document traversal.
#[derive(Default)]
struct Accumulator {
    score: f64,
    matched: BTreeSet<FieldPath>,
}

impl Accumulator {
    fn record(&mut self, amount: f64, path: &FieldPath) {
        self.score += amount;
        self.matched.insert(path.clone());
    }
}

impl WeightedSearchEngine {
    /// Create an engine with the built-in weights and settings.
    pub fn new(taxonomy: Arc<PerspectiveTaxonomy>) -> Self {
        Self {
            weights: FieldWeights::default(),
            taxonomy,
            settings: SearchSettings::default(),
        }
    }

    /// Build an engine from loaded configuration.
    pub fn from_config(config: &SporelensConfig, taxonomy: Arc<PerspectiveTaxonomy>) -> Self {
        Self {
            weights: FieldWeights::from(&config.weights),
            taxonomy,
            settings: config.search.clone(),
        }
    }

    /// Replace the weight table.
    pub fn with_weights(mut self, weights: FieldWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the search settings.
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The settings in use.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// The taxonomy used for perspective translation.
    pub fn taxonomy(&self) -> &PerspectiveTaxonomy {
        &self.taxonomy
    }

    /// Compile a query, or `None` if it is too short to filter.
    pub fn prepare(&self, query: &str) -> Option<QueryMatcher> {
        QueryMatcher::new(query, &self.settings)
    }

    /// Score one document.
    pub fn score(&self, document: &Document, query: &str) -> SearchResult {
        match self.prepare(query) {
            Some(matcher) => self.score_with(document, &matcher),
            None => SearchResult::unfiltered(document.id()),
        }
    }

    /// Score every document, compiling the query once. Results keep the
    /// input order.
    pub fn score_all(&self, documents: &[Document], query: &str) -> Vec<SearchResult> {
        match self.prepare(query) {
            Some(matcher) => documents
                .iter()
                .map(|doc| self.score_with(doc, &matcher))
                .collect(),
            None => documents
                .iter()
                .map(|doc| SearchResult::unfiltered(doc.id()))
                .collect(),
        }
    }

    /// Score one document with a compiled query.
    pub fn score_with(&self, document: &Document, matcher: &QueryMatcher) -> SearchResult {
        let mut acc = Accumulator::default();
        if let Value::Object(root) = document.data() {
            self.search_in_object(root, matcher, &FieldPath::root(), 0, &mut acc);
        }

        let matched_perspectives = self.translate(&acc.matched);
        log::trace!(
            "score '{}' for {:?}: {} ({} path(s))",
            document.id(),
            matcher.as_str(),
            acc.score,
            acc.matched.len()
        );

        SearchResult {
            doc_id: document.id().to_string(),
            score: acc.score,
            matched_field_paths: acc.matched,
            matched_perspectives,
            unfiltered: false,
        }
    }

    fn search_in_object(
        &self,
        node: &Map<String, Value>,
        matcher: &QueryMatcher,
        path: &FieldPath,
        depth: usize,
        acc: &mut Accumulator,
    ) {
        if depth >= self.settings.max_depth {
            log::debug!("Depth limit {} reached at '{path}'", self.settings.max_depth);
            return;
        }

        for (key, value) in node {
            let weight = f64::from(self.weights.get(key));
            let field_path = path.child(key);

            if matcher.matches(key) {
                acc.record(weight * self.settings.name_match_factor, &field_path);
            }

            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        match item {
                            Value::Object(child) => self.search_in_object(
                                child,
                                matcher,
                                &path.element(key, i),
                                depth + 1,
                                acc,
                            ),
                            // Nested arrays are not primitives
                            Value::Array(_) | Value::Null => {}
                            primitive => {
                                if primitive_matches(primitive, matcher) {
                                    acc.record(weight, &field_path);
                                }
                            }
                        }
                    }
                }
                Value::Object(child) => {
                    self.search_in_object(child, matcher, &field_path, depth + 1, acc);
                }
                primitive => {
                    if primitive_matches(primitive, matcher) {
                        acc.record(weight, &field_path);
                    }
                }
            }
        }
    }

    /// Perspectives reached through each path's first or last key.
    fn translate(&self, paths: &BTreeSet<FieldPath>) -> BTreeSet<String> {
        let mut perspectives = BTreeSet::new();
        for path in paths {
            for key in [path.first_key(), path.last_key()].into_iter().flatten() {
                if let Some(perspective) = self.taxonomy.perspective_for_field(key) {
                    perspectives.insert(perspective.to_string());
                }
            }
        }
        perspectives
    }
}

fn primitive_matches(value: &Value, matcher: &QueryMatcher) -> bool {
    match value {
        Value::String(s) => matcher.matches(s),
        Value::Number(n) => matcher.matches(&n.to_string()),
        Value::Bool(b) => matcher.matches(if *b { "true" } else { "false" }),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> WeightedSearchEngine {
        WeightedSearchEngine::new(Arc::new(PerspectiveTaxonomy::fungi()))
    }

    fn paths(result: &SearchResult) -> Vec<&str> {
        result
            .matched_field_paths
            .iter()
            .map(FieldPath::as_str)
            .collect()
    }

    #[test]
    fn test_common_name_word_match() {
        let doc = Document::new(
            "fly-agaric",
            json!({"commonName": "Fly Agaric", "taxonomy": {"family": "Amanitaceae"}}),
        );
        let result = engine().score(&doc, "agaric");
        assert_eq!(result.score, 10.0);
        assert_eq!(paths(&result), vec!["commonName"]);
        assert!(!result.unfiltered);
    }

    #[test]
    fn test_array_value_in_perspective() {
        let doc = Document::new(
            "turkey-tail",
            json!({"ecologyAndHabitat": {"substrate": ["dead wood", "soil"]}}),
        );
        let result = engine().score(&doc, "wood");
        assert_eq!(paths(&result), vec!["ecologyAndHabitat.substrate"]);
        assert_eq!(result.score, 3.0);
        assert!(result.matched_perspectives.contains("ecologyAndHabitat"));
    }

    #[test]
    fn test_each_matching_array_element_counts() {
        let doc = Document::new("x", json!({"habitat": ["oak wood", "beech wood", "meadow"]}));
        let result = engine().score(&doc, "wood");
        assert_eq!(result.score, 6.0);
        assert_eq!(paths(&result), vec!["habitat"]);
    }

    #[test]
    fn test_field_name_match_counts_half() {
        let doc = Document::new("x", json!({"toxicity": "none known"}));
        let result = engine().score(&doc, "toxicity");
        assert_eq!(result.score, 3.0);
        assert_eq!(paths(&result), vec!["toxicity"]);
        assert!(result.matched_perspectives.contains("edibilityAndSafety"));
    }

    #[test]
    fn test_name_and_value_both_count() {
        let doc = Document::new("x", json!({"genus": "genus incertae sedis"}));
        let result = engine().score(&doc, "genus");
        assert_eq!(result.score, 7.0 * 0.5 + 7.0);
    }

    #[test]
    fn test_configurable_name_factor() {
        let settings = SearchSettings {
            name_match_factor: 0.0,
            ..Default::default()
        };
        let doc = Document::new("x", json!({"toxicity": "none known"}));
        let result = engine().with_settings(settings).score(&doc, "toxicity");
        assert_eq!(result.score, 0.0);
        // The path is still recorded
        assert_eq!(paths(&result), vec!["toxicity"]);
    }

    #[test]
    fn test_unknown_field_uses_default_weight() {
        let doc = Document::new("x", json!({"sporePrint": "white"}));
        let result = engine().score(&doc, "white");
        assert_eq!(result.score, 1.0);
        assert!(result.matched_perspectives.is_empty());
    }

    #[test]
    fn test_object_array_elements_get_indexed_paths() {
        let doc = Document::new(
            "x",
            json!({"lookalikes": {"similarSpecies": [
                {"name": "Panther cap"},
                {"name": "Blusher"}
            ]}}),
        );
        let result = engine().score(&doc, "blusher");
        assert_eq!(paths(&result), vec!["lookalikes.similarSpecies[1].name"]);
        assert_eq!(result.score, 8.0);
        assert!(result.matched_perspectives.contains("lookalikes"));
    }

    #[test]
    fn test_last_segment_translation() {
        let doc = Document::new("x", json!({"details": {"edibility": "deadly"}}));
        let result = engine().score(&doc, "deadly");
        assert_eq!(paths(&result), vec!["details.edibility"]);
        assert!(result.matched_perspectives.contains("edibilityAndSafety"));
    }

    #[test]
    fn test_numbers_and_booleans_match_as_text() {
        let doc = Document::new("x", json!({"notes": 1987, "cultivated": true}));
        assert_eq!(engine().score(&doc, "1987").score, 1.0);
        assert_eq!(engine().score(&doc, "true").score, 1.0);
    }

    #[test]
    fn test_null_and_nested_arrays_are_skipped() {
        let doc = Document::new("x", json!({"habitat": null, "notes": [["wood"]]}));
        let result = engine().score(&doc, "wood");
        assert_eq!(result.score, 0.0);
        assert!(result.matched_field_paths.is_empty());
    }

    #[test]
    fn test_short_query_is_unfiltered() {
        let doc = Document::new("x", json!({"commonName": "A"}));
        for query in ["", "a", " a "] {
            let result = engine().score(&doc, query);
            assert!(result.unfiltered);
            assert_eq!(result.score, 0.0);
        }
    }

    #[test]
    fn test_non_object_document_scores_zero() {
        let doc = Document::new("x", json!(["agaric"]));
        let result = engine().score(&doc, "agaric");
        assert_eq!(result.score, 0.0);
        assert!(!result.unfiltered);
    }

    #[test]
    fn test_depth_limit() {
        let settings = SearchSettings {
            max_depth: 2,
            ..Default::default()
        };
        let doc = Document::new("x", json!({"a": {"b": {"c": "agaric"}}, "d": {"e": "agaric"}}));
        let result = engine().with_settings(settings).score(&doc, "agaric");
        assert_eq!(paths(&result), vec!["d.e"]);
    }

    #[test]
    fn test_score_all_keeps_order() {
        let docs = vec![
            Document::new("a", json!({"commonName": "Chanterelle"})),
            Document::new("b", json!({"commonName": "Fly Agaric"})),
        ];
        let results = engine().score_all(&docs, "agaric");
        assert_eq!(results[0].doc_id, "a");
        assert_eq!(results[0].score, 0.0);
        assert_eq!(results[1].doc_id, "b");
        assert_eq!(results[1].score, 10.0);

        let results = engine().score_all(&docs, "");
        assert!(results.iter().all(|r| r.unfiltered));
    }

    #[test]
    fn test_custom_weights() {
        let doc = Document::new("x", json!({"spores": "white"}));
        let engine = engine().with_weights(FieldWeights::new(1).with("spores", 4));
        assert_eq!(engine.score(&doc, "white").score, 4.0);
    }

    #[test]
    fn test_from_config() {
        let mut config = SporelensConfig::default();
        config.search.min_query_len = 4;
        let taxonomy = Arc::new(config.build_taxonomy().unwrap());
        let engine = WeightedSearchEngine::from_config(&config, taxonomy);

        let doc = Document::new("x", json!({"commonName": "Fly Agaric"}));
        assert!(engine.score(&doc, "fly").unfiltered);
        assert!(!engine.score(&doc, "agaric").unfiltered);
    }
}
