//! Inflection tables
//!
//! Heuristic ending lists for Russian and Ukrainian. These are tunable data:
//! supporting another paradigm means adding a table entry, not a branch.

/// Adjective paradigm keyed by the dictionary-form suffix.
///
/// The suffix is stripped from the keyword to get a stem; the stem is then
/// followed by an optional alternation of every ending in `endings`.
#[derive(Debug, Clone, Copy)]
pub struct AdjectiveRule {
    pub suffix: &'static str,
    pub endings: &'static [&'static [&'static str]],
}

const RU_SK_ENDINGS: &[&str] = &[
    "ский", "ского", "скому", "ским", "ском", "ская", "ской", "скую", "ское", "ские", "ских",
    "скими", "скою",
];

const UK_SK_ENDINGS: &[&str] = &[
    "ський", "ського", "ському", "ським", "ськім", "ська", "ської", "ській", "ську", "ською",
    "ське", "ські", "ських", "ськими",
];

const RU_ZK_ENDINGS: &[&str] = &[
    "зкий", "зкого", "зкому", "зким", "зком", "зкая", "зкой", "зкую", "зкое", "зкие", "зких",
    "зкими",
];

const UK_ZK_ENDINGS: &[&str] = &[
    "зький", "зького", "зькому", "зьким", "зькім", "зька", "зької", "зькій", "зьку", "зькою",
    "зьке", "зькі", "зьких", "зькими",
];

/// Checked in order; the first matching suffix wins.
pub const ADJECTIVE_RULES: &[AdjectiveRule] = &[
    AdjectiveRule {
        suffix: "ский",
        endings: &[RU_SK_ENDINGS, UK_SK_ENDINGS],
    },
    AdjectiveRule {
        suffix: "ський",
        endings: &[UK_SK_ENDINGS, RU_SK_ENDINGS],
    },
    AdjectiveRule {
        suffix: "зький",
        endings: &[UK_ZK_ENDINGS, RU_ZK_ENDINGS],
    },
];

/// Case endings appended to Cyrillic nouns (Russian and Ukrainian).
///
/// `ым`/`им` cover the instrumental of surnames in -ин/-ов; `ові`/`еві`
/// the Ukrainian dative.
pub const NOUN_ENDINGS: &[&str] = &[
    "а", "я", "у", "ю", "ом", "ем", "е", "і", "ы", "и", "ой", "ою", "ях", "ям", "ями", "ах",
    "ам", "ами", "ов", "ев", "ым", "им", "ові", "еві",
];

/// Final vowels typical of borrowed, indeclinable proper nouns.
pub const INDECLINABLE_VOWELS: &[char] = &['о', 'е', 'ё', 'э', 'и', 'і', 'ю', 'у'];

/// Possessive suffixes allowed after a Latin word.
pub const LATIN_POSSESSIVES: &[&str] = &["'s", "\u{2019}s"];

/// Find the adjective rule for a lower-cased word.
pub fn adjective_rule(word: &str) -> Option<&'static AdjectiveRule> {
    ADJECTIVE_RULES
        .iter()
        .find(|rule| word.ends_with(rule.suffix) && word.len() > rule.suffix.len())
}
