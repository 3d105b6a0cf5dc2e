//! Common types for search and ranking.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sporelens_core::{FieldPath, SearchSettings};

/// Relevance of one document for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Identifier of the scored document.
    pub doc_id: String,

    /// Relevance score; never negative.
    pub score: f64,

    /// Every field path that contributed to the score.
    pub matched_field_paths: BTreeSet<FieldPath>,

    /// Perspectives the matched paths translate to.
    pub matched_perspectives: BTreeSet<String>,

    /// The query was empty or too short: the document passes unfiltered.
    #[serde(default)]
    pub unfiltered: bool,
}

impl SearchResult {
    /// A zero-score result that performed no filtering.
    pub fn unfiltered(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            score: 0.0,
            matched_field_paths: BTreeSet::new(),
            matched_perspectives: BTreeSet::new(),
            unfiltered: true,
        }
    }

    /// Returns `true` if anything in the document matched.
    pub fn has_matches(&self) -> bool {
        !self.matched_field_paths.is_empty()
    }
}

/// Per-document display decision for one ranking cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Shown normally.
    Visible,
    /// Removed from view.
    Hidden,
    /// Kept in view but de-emphasized.
    Dimmed,
}

impl Visibility {
    /// Returns `true` for [`Visibility::Visible`].
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Aggregate outcome of one search cycle; the payload of the
/// "search completed" event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    /// The query as received.
    pub query: String,

    /// Number of visible documents.
    pub visible_count: usize,

    /// Number of documents ranked.
    pub total_count: usize,

    /// Perspectives with at least one visible hit, alphabetically.
    pub matched_perspectives: Vec<String>,

    /// Perspective → number of visible documents that matched in it.
    pub perspective_hit_counts: BTreeMap<String, usize>,
}

/// Ranking thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    /// Visible only if the score is strictly above this.
    #[serde(default)]
    pub min_score: f64,

    /// Non-matching documents are hidden (`true`) or dimmed (`false`).
    #[serde(default = "default_true")]
    pub hide_unmatched: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            hide_unmatched: default_true(),
        }
    }
}

impl From<&SearchSettings> for RankOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            min_score: settings.min_score,
            hide_unmatched: settings.hide_unmatched,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
