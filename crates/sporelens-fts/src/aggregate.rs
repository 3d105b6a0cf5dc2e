//! Ranking and collection-level aggregation.
//!
//! [`PerspectiveAggregator`] turns the per-document [`SearchResult`]s of one
//! search cycle into an ordered, visibility-annotated [`Ranking`] plus the
//! [`CollectionSummary`] that is published as the "search completed" event.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{CollectionSummary, RankOptions, SearchResult, Visibility};

/// One document's place in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// Position in the input before sorting.
    pub input_index: usize,

    /// Display decision for this cycle.
    pub visibility: Visibility,

    /// The scored result.
    #[serde(flatten)]
    pub result: SearchResult,
}

/// Outcome of one ranking cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    /// All results, best first; ties keep input order.
    pub ordered: Vec<RankedResult>,

    /// Collection indices of the visible documents.
    pub visible: BTreeSet<usize>,

    /// Collection-level summary.
    pub summary: CollectionSummary,
}

impl Ranking {
    /// Visibility of the document at a collection index, or `None` if it was
    /// not ranked.
    pub fn visibility_of(&self, input_index: usize) -> Option<Visibility> {
        self.ordered
            .iter()
            .find(|r| r.input_index == input_index)
            .map(|r| r.visibility)
    }

    /// Visible results, best first.
    pub fn visible_results(&self) -> impl Iterator<Item = &RankedResult> {
        self.ordered.iter().filter(|r| r.visibility.is_visible())
    }
}

/// Orders results and decides visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveAggregator {
    options: RankOptions,
}

impl PerspectiveAggregator {
    /// Create an aggregator with the given thresholds.
    pub fn new(options: RankOptions) -> Self {
        Self { options }
    }

    /// The thresholds in use.
    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Rank one cycle's results.
    pub fn rank(&self, query: &str, results: Vec<SearchResult>) -> Ranking {
        let total_count = results.len();
        let hidden = if self.options.hide_unmatched {
            Visibility::Hidden
        } else {
            Visibility::Dimmed
        };

        let mut ordered: Vec<RankedResult> = results
            .into_iter()
            .enumerate()
            .map(|(input_index, result)| {
                let visibility = if result.unfiltered || result.score > self.options.min_score {
                    Visibility::Visible
                } else {
                    hidden
                };
                RankedResult {
                    input_index,
                    visibility,
                    result,
                }
            })
            .collect();

        // `sort_by` is stable
        ordered.sort_by(|a, b| b.result.score.total_cmp(&a.result.score));

        let mut visible = BTreeSet::new();
        let mut perspective_hit_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut visible_count = 0;
        for ranked in ordered.iter().filter(|r| r.visibility.is_visible()) {
            visible_count += 1;
            visible.insert(ranked.input_index);
            for perspective in &ranked.result.matched_perspectives {
                *perspective_hit_counts.entry(perspective.clone()).or_default() += 1;
            }
        }

        let summary = CollectionSummary {
            query: query.to_string(),
            visible_count,
            total_count,
            matched_perspectives: perspective_hit_counts.keys().cloned().collect(),
            perspective_hit_counts,
        };
        log::debug!(
            "Ranked {:?}: {}/{} visible, {} perspective(s)",
            summary.query,
            summary.visible_count,
            summary.total_count,
            summary.matched_perspectives.len()
        );

        Ranking {
            ordered,
            visible,
            summary,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
