//! Query normalization and word matching.
//!
//! A [`QueryMatcher`] is built once per query and then applied to every
//! field name and primitive value of every document. Matching is
//! case-insensitive and succeeds when either:
//!
//! - the query occurs in the text starting at a word boundary, or
//! - the query is at least `substring_min_len` characters long and occurs
//!   anywhere in the text.
//!
//! # Example
//!
//! ```rust
//! use sporelens_fts::matcher::matches_word;
//!
//! assert!(matches_word("Fly Agaric", "agaric"));
//! assert!(matches_word("mushrooms", "room"));
//! assert!(!matches_word("ab", "b"));
//! ```

use regex::{Regex, RegexBuilder};
use sporelens_core::SearchSettings;

/// A normalized, compiled query.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    normalized: String,
    word_start: Option<Regex>,
    substring_fallback: bool,
}

impl QueryMatcher {
    /// Compile a query.
    ///
    /// Returns `None` when the trimmed query is shorter than
    /// `settings.min_query_len`; such queries do not filter.
    pub fn new(raw: &str, settings: &SearchSettings) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.chars().count() < settings.min_query_len {
            return None;
        }

        let pattern = format!(r"\b{}", regex::escape(&normalized));
        let word_start = match RegexBuilder::new(&pattern).unicode(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Query {normalized:?} cannot be compiled for word matching: {e}");
                None
            }
        };

        Some(Self {
            substring_fallback: normalized.chars().count() >= settings.substring_min_len,
            normalized,
            word_start,
        })
    }

    /// The trimmed, lower-cased query.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Returns `true` if `text` matches this query.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        if let Some(re) = &self.word_start
            && re.is_match(&text)
        {
            return true;
        }
        self.substring_fallback && text.contains(&self.normalized)
    }
}

/// Match one text against one query using the default settings.
///
/// Compiles the query on every call; use [`QueryMatcher`] when matching the
/// same query repeatedly.
pub fn matches_word(text: &str, query: &str) -> bool {
    QueryMatcher::new(query, &SearchSettings::default()).is_some_and(|m| m.matches(text))
}

// ============================================================================
// Tests
// ============================================================================
