//! Core type definitions for News Cleaner
//!
//! Compiled keyword patterns are produced by `nc-compiler` and consumed by
//! the matcher, the region selector and the scan coordinator.

use std::fmt;

use regex::Regex;

// =============================================================================
// Match Strategy
// =============================================================================

/// Inflection strategy picked for a keyword at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Strategy {
    /// Multi-word phrase matched literally
    LiteralPhrase = 0,
    /// Latin-script word with optional possessive suffix
    LatinWord = 1,
    /// Cyrillic noun with optional case endings
    CyrillicNoun = 2,
    /// Cyrillic adjective (surname) with declension endings
    CyrillicAdjective = 3,
    /// Cyrillic acronym or indeclinable word, bare literal
    CyrillicIndeclinable = 4,
    /// Anything else, bare literal
    Opaque = 5,
}

impl Strategy {
    /// Short tag used in diagnostics and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiteralPhrase => "literal-phrase",
            Self::LatinWord => "latin-word",
            Self::CyrillicNoun => "cyrillic-noun",
            Self::CyrillicAdjective => "cyrillic-adjective",
            Self::CyrillicIndeclinable => "cyrillic-indeclinable",
            Self::Opaque => "opaque",
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::LiteralPhrase),
            1 => Ok(Self::LatinWord),
            2 => Ok(Self::CyrillicNoun),
            3 => Ok(Self::CyrillicAdjective),
            4 => Ok(Self::CyrillicIndeclinable),
            5 => Ok(Self::Opaque),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// =============================================================================
// Compiled Pattern
// =============================================================================

/// A boundary-aware matcher derived from one keyword.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    keyword: String,
    strategy: Strategy,
    regex: Regex,
}

impl CompiledPattern {
    pub fn new(keyword: impl Into<String>, strategy: Strategy, regex: Regex) -> Self {
        Self {
            keyword: keyword.into(),
            strategy,
            regex,
        }
    }

    /// Keyword as configured (trimmed, original casing).
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Regex source, for diagnostics.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    #[inline]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// Ordered set of compiled patterns, one per surviving keyword.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn new(patterns: Vec<CompiledPattern>) -> Self {
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledPattern> {
        self.patterns.iter()
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a CompiledPattern;
    type IntoIter = std::slice::Iter<'a, CompiledPattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Turns a raw keyword list into a pattern set.
///
/// Implemented by `nc-compiler`; the scan coordinator holds one so it can
/// recompile in full whenever the keyword list changes.
pub trait PatternCompiler {
    fn compile_all(&self, keywords: &[String]) -> PatternSet;
}

// =============================================================================
// Display Mode
// =============================================================================

/// Visual treatment applied to a hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Region is removed from layout
    #[default]
    Hide,
    /// Region stays in layout but is blurred
    Blur,
}

impl Mode {
    /// Parse from the stored configuration value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hide" => Some(Self::Hide),
            "blur" => Some(Self::Blur),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Blur => "blur",
        }
    }

    /// CSS class the content script styles for this treatment.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Hide => "nc-hidden",
            Self::Blur => "nc-blur",
        }
    }
}
