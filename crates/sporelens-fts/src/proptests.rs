//! Property-based tests for scoring and ranking.
