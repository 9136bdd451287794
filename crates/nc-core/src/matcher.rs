//! Text Matcher
//!
//! Runs on every candidate region and on every heading during region
//! selection, so it must stay allocation-free and stop at the first hit.

use crate::types::{CompiledPattern, PatternSet};

/// Tests strings against a compiled pattern set.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    patterns: &'a PatternSet,
}

impl<'a> Matcher<'a> {
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self { patterns }
    }

    /// True iff any pattern matches anywhere in `haystack`.
    ///
    /// The haystack is expected to be lower-cased already; patterns are
    /// case-insensitive anyway so mixed case only costs a little speed.
    #[inline]
    pub fn matches(&self, haystack: &str) -> bool {
        self.first_match(haystack).is_some()
    }

    /// The first pattern (in keyword order) that matches `haystack`.
    pub fn first_match(&self, haystack: &str) -> Option<&'a CompiledPattern> {
        if haystack.is_empty() || self.patterns.is_empty() {
            return None;
        }
        self.patterns.iter().find(|pattern| pattern.is_match(haystack))
    }
}

/// Convenience wrapper around [`Matcher::matches`].
#[inline]
pub fn text_matches(haystack: &str, patterns: &PatternSet) -> bool {
    Matcher::new(patterns).matches(haystack)
}
