//! News Cleaner Core Library
//!
//! This crate provides the matching and scanning engine for the News Cleaner
//! content filter. It hides or blurs page regions that mention configured
//! keywords, tolerating inflected word forms across scripts.
//!
//! # Architecture
//!
//! Keywords are compiled by `nc-compiler` into a [`PatternSet`]. The
//! [`ScanCoordinator`] walks a [`dom::Document`], asks the
//! [`region::RegionSelector`] for candidate regions, tests each one with the
//! [`Matcher`] exactly once and marks hits through the document.
//!
//! # Modules
//!
//! - `config`: persisted configuration, field deltas, store traits
//! - `dom`: document abstraction, element signatures, in-memory document
//! - `gate`: allow/block decision per hostname
//! - `host`: hostname extraction and normalization
//! - `matcher`: short-circuiting text matcher
//! - `region`: candidate region selection and relevant text
//! - `scan`: scheduling, visited set and marking
//! - `types`: shared type definitions

pub mod config;
pub mod dom;
pub mod gate;
pub mod host;
pub mod matcher;
pub mod region;
pub mod scan;
pub mod types;

// Re-export commonly used types
pub use config::{ChangeSet, Config, ConfigChange, ConfigError, ConfigField};
pub use dom::{Document, DomError, Signature};
pub use gate::{is_disabled, DomainLists, SiteStatus};
pub use host::{normalize_host, HostProvider};
pub use matcher::{text_matches, Matcher};
pub use scan::{ScanCoordinator, ScanReport, ScanState};
pub use types::{CompiledPattern, Mode, PatternCompiler, PatternSet, Strategy};

#[cfg(test)]
pub(crate) mod testing {
    use regex::Regex;

    use crate::types::{CompiledPattern, PatternCompiler, PatternSet, Strategy};

    /// Bare word-bounded literals, enough to drive selector and scan tests.
    pub struct LiteralCompiler;

    impl PatternCompiler for LiteralCompiler {
        fn compile_all(&self, keywords: &[String]) -> PatternSet {
            let patterns = keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(|k| {
                    let source = format!(
                        r"(?i)(?:^|[^\p{{L}}\p{{M}}\p{{N}}]){}(?:[^\p{{L}}\p{{M}}\p{{N}}]|$)",
                        regex::escape(&k.to_lowercase())
                    );
                    CompiledPattern::new(k, Strategy::Opaque, Regex::new(&source).unwrap())
                })
                .collect();
            PatternSet::new(patterns)
        }
    }

    pub fn literal_patterns(keywords: &[&str]) -> PatternSet {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        LiteralCompiler.compile_all(&keywords)
    }
}
