//! Pattern builder
//!
//! Turns classified keywords into boundary-aware regexes. The `regex` crate
//! has no look-around, so boundaries are expressed as consuming groups
//! `(?:^|[^W])` / `(?:[^W]|$)`; that is enough for `is_match`.

use regex::RegexBuilder;

use nc_core::types::{CompiledPattern, PatternCompiler, PatternSet, Strategy};

use crate::classify::classify;
use crate::tables::{adjective_rule, LATIN_POSSESSIVES, NOUN_ENDINGS};

/// Word characters in any script: letters, marks, digits.
const WORD_CLASS: &str = r"\p{L}\p{M}\p{N}";

/// Indeclinable words also treat hyphens as inner characters, so `сша` does
/// not match inside `сша-шный`.
const INDECLINABLE_WORD_CLASS: &str = r"\p{L}\p{M}\p{N}\-";

/// Compiled program size cap for a single keyword.
pub const DEFAULT_SIZE_LIMIT: usize = 4 << 20;

/// Error type for keyword compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Keyword is empty")]
    EmptyKeyword,
    #[error("Failed to compile '{keyword}': {source}")]
    Regex {
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// Regex source for a trimmed keyword under the given strategy.
pub fn build_source(keyword: &str, strategy: Strategy) -> String {
    let lower = keyword.to_lowercase();

    let (body, word_class) = match strategy {
        Strategy::LiteralPhrase => {
            let words: Vec<String> = lower.split_whitespace().map(regex::escape).collect();
            (words.join(r"\s+"), WORD_CLASS)
        }
        Strategy::LatinWord => (
            format!("{}{}", regex::escape(&lower), optional_group(LATIN_POSSESSIVES.iter().copied())),
            WORD_CLASS,
        ),
        Strategy::CyrillicAdjective => match adjective_rule(&lower) {
            Some(rule) => {
                let stem = &lower[..lower.len() - rule.suffix.len()];
                let endings = rule.endings.iter().flat_map(|list| list.iter().copied());
                (
                    format!("{}{}", regex::escape(stem), optional_group(endings)),
                    WORD_CLASS,
                )
            }
            None => (regex::escape(&lower), WORD_CLASS),
        },
        Strategy::CyrillicNoun => (
            format!("{}{}", regex::escape(&lower), optional_group(NOUN_ENDINGS.iter().copied())),
            WORD_CLASS,
        ),
        Strategy::CyrillicIndeclinable => (regex::escape(&lower), INDECLINABLE_WORD_CLASS),
        Strategy::Opaque => (regex::escape(&lower), WORD_CLASS),
    };

    format!(
        "(?i)(?:^|[^{w}])(?:{body})(?:[^{w}]|$)",
        w = word_class,
        body = body
    )
}

/// `(?:a|bb|c)?` with duplicates removed, longest alternative first.
fn optional_group<'a, I>(alternatives: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut items: Vec<&str> = Vec::new();
    for alt in alternatives {
        if !items.contains(&alt) {
            items.push(alt);
        }
    }
    if items.is_empty() {
        return String::new();
    }
    items.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let escaped: Vec<String> = items.into_iter().map(regex::escape).collect();
    format!("(?:{})?", escaped.join("|"))
}

/// Keyword compiler with the inflection heuristics.
#[derive(Debug, Clone, Copy)]
pub struct InflectionCompiler {
    size_limit: usize,
}

impl Default for InflectionCompiler {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl InflectionCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size_limit(size_limit: usize) -> Self {
        Self { size_limit }
    }

    /// Compile one keyword.
    pub fn compile_keyword(&self, keyword: &str) -> Result<CompiledPattern, CompileError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CompileError::EmptyKeyword);
        }

        let strategy = classify(keyword);
        let source = build_source(keyword, strategy);
        let regex = RegexBuilder::new(&source)
            .size_limit(self.size_limit)
            .build()
            .map_err(|source| CompileError::Regex {
                keyword: keyword.to_string(),
                source,
            })?;

        Ok(CompiledPattern::new(keyword, strategy, regex))
    }

    /// Compile a keyword list. Blank keywords are dropped silently, failing
    /// ones are logged and dropped; order is preserved.
    pub fn compile_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> PatternSet {
        let mut patterns = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            match self.compile_keyword(keyword.as_ref()) {
                Ok(pattern) => patterns.push(pattern),
                Err(CompileError::EmptyKeyword) => {}
                Err(e) => log::warn!("dropping keyword: {}", e),
            }
        }
        PatternSet::new(patterns)
    }
}

impl PatternCompiler for InflectionCompiler {
    fn compile_all(&self, keywords: &[String]) -> PatternSet {
        self.compile_keywords(keywords)
    }
}

/// Compile a keyword list with default limits.
pub fn compile_keywords<S: AsRef<str>>(keywords: &[S]) -> PatternSet {
    InflectionCompiler::default().compile_keywords(keywords)
}

/// Compile one keyword with default limits.
pub fn compile_keyword(keyword: &str) -> Result<CompiledPattern, CompileError> {
    InflectionCompiler::default().compile_keyword(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::matcher::text_matches;

    fn matches(keyword: &str, text: &str) -> bool {
        text_matches(&text.to_lowercase(), &compile_keywords(&[keyword]))
    }

    #[test]
    fn test_cyrillic_noun_endings() {
        assert!(matches("путин", "Путин"));
        assert!(matches("путин", "Путина"));
        assert!(matches("путин", "встреча с путиным"));
        assert!(matches("путин", "путину"));
        assert!(matches("путин", "(Путином)"));
        assert!(!matches("путин", "путиный"));
        assert!(!matches("путин", "распутин"));
        assert!(!matches("путин", "компьютин"));
    }

    #[test]
    fn test_cyrillic_adjective_paradigm() {
        assert!(matches("зеленский", "Зеленского"));
        assert!(matches("зеленский", "с зеленским"));
        assert!(matches("зеленский", "Зеленская"));
        assert!(matches("зеленский", "зеленський"));
        assert!(matches("зеленский", "Зелен"));
        assert!(!matches("зеленский", "зеленосный"));
        assert!(matches("Зеленський", "Зеленського"));
    }

    #[test]
    fn test_latin_possessive() {
        assert!(matches("trump", "Trump's tower"));
        assert!(matches("trump", "Trump\u{2019}s tower"));
        assert!(matches("trump", "TRUMP"));
        assert!(!matches("trump", "triumph"));
        assert!(!matches("trump", "trumpet"));
    }

    #[test]
    fn test_indeclinable_words() {
        assert!(matches("США", "санкции США."));
        assert!(!matches("США", "США-шный"));
        assert!(!matches("США", "сшаа"));
        assert!(matches("пикассо", "картина пикассо"));
        assert!(!matches("пикассо", "пикассом"));
    }

    #[test]
    fn test_phrase_allows_any_whitespace() {
        assert!(matches("donald trump", "Donald  Trump said"));
        assert!(matches("donald trump", "donald\ntrump"));
        assert!(!matches("donald trump", "donald trumpet"));
        assert!(matches("владимир путин", "— Владимир Путин,"));
    }

    #[test]
    fn test_opaque_is_escaped_literal() {
        assert!(matches("c++", "learning C++ today"));
        assert!(!matches("c++", "cpp"));
        assert!(matches("g7", "the G7 summit"));
        assert!(!matches("g7", "g70"));
    }

    #[test]
    fn test_keyword_surrounded_by_punctuation() {
        for keyword in ["trump", "путин", "зеленский", "США", "g7", "donald trump"] {
            for wrap in ["{}", " {} ", "«{}»", "({}).", "!{}?"] {
                let text = wrap.replace("{}", &keyword.to_uppercase());
                assert!(matches(keyword, &text), "{} in {:?}", keyword, text);
            }
        }
    }

    #[test]
    fn test_hyphen_ends_a_word() {
        for keyword in ["trump", "путин", "зеленский", "g7", "donald trump"] {
            for wrap in ["{}-x", "x-{}"] {
                let text = wrap.replace("{}", keyword);
                assert!(matches(keyword, &text), "{} in {:?}", keyword, text);
            }
        }
        assert!(matches("путин", "Саммит Путин-Байден"));
        assert!(matches("зеленский", "Встреча Зеленский-Макрон"));
        assert!(matches("путин", "встреча путина-старшего"));
        // Indeclinable words keep hyphenated derivatives out.
        assert!(!matches("США", "США-шный"));
        assert!(!matches("США", "про-США"));
    }

    #[test]
    fn test_compile_keywords_skips_blanks_and_keeps_order() {
        let set = compile_keywords(&["  trump ", "", "   ", "путин", "trump"]);
        let tags: Vec<(&str, Strategy)> = set.iter().map(|p| (p.keyword(), p.strategy())).collect();
        assert_eq!(
            tags,
            vec![
                ("trump", Strategy::LatinWord),
                ("путин", Strategy::CyrillicNoun),
                ("trump", Strategy::LatinWord),
            ]
        );
    }

    #[test]
    fn test_failed_keyword_does_not_abort_list() {
        let huge = "a".repeat(500_000);
        let set = compile_keywords(&["trump", huge.as_str(), "putin"]);
        assert_eq!(set.len(), 2);
        assert!(matches!(compile_keyword(&huge), Err(CompileError::Regex { .. })));
        assert!(matches!(compile_keyword("  "), Err(CompileError::EmptyKeyword)));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let sources = || -> Vec<String> {
            compile_keywords(&["зеленский", "trump"])
                .iter()
                .map(|p| p.source().to_string())
                .collect()
        };
        assert_eq!(sources(), sources());
    }

    #[test]
    fn test_optional_group_orders_longest_first() {
        assert_eq!(optional_group(["а", "ами", "ам", "а"]), "(?:ами|ам|а)?");
        assert_eq!(optional_group(Vec::<&str>::new()), "");
    }
}
