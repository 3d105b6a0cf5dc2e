//! Property-based tests for classification and extraction.
