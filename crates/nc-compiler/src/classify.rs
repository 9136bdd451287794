//! Keyword classification
//!
//! Picks an inflection strategy per keyword from its script and shape.
//! Rule order matters: phrase, Latin, then Cyrillic adjective before the
//! indeclinable check before the generic noun fallback.

use nc_core::types::Strategy;

use crate::tables::{adjective_rule, INDECLINABLE_VOWELS};

/// Latin letters, including Latin-1 Supplement and Latin Extended blocks.
pub fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || (matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}') && c.is_alphabetic())
}

/// Cyrillic and Cyrillic Supplement letters.
pub fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{052F}') && c.is_alphabetic()
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// True for `МакДональд`, `iPhone`: an upper-case letter right after a
/// lower-case one.
pub fn has_camel_case(word: &str) -> bool {
    word.chars()
        .zip(word.chars().skip(1))
        .any(|(a, b)| a.is_lowercase() && b.is_uppercase())
}

/// Every letter upper-case, at least one letter.
pub fn is_all_upper(word: &str) -> bool {
    let mut letters = word.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// Strategy for a trimmed keyword, original casing preserved.
pub fn classify(keyword: &str) -> Strategy {
    if keyword.chars().any(char::is_whitespace) {
        return Strategy::LiteralPhrase;
    }

    let has_letter = keyword.chars().any(char::is_alphabetic);

    if has_letter
        && keyword
            .chars()
            .all(|c| is_latin_letter(c) || is_apostrophe(c) || c == '-')
    {
        return Strategy::LatinWord;
    }

    if has_letter && keyword.chars().all(|c| is_cyrillic_letter(c) || c == '-') {
        return classify_cyrillic(keyword);
    }

    Strategy::Opaque
}

fn classify_cyrillic(keyword: &str) -> Strategy {
    let lower = keyword.to_lowercase();

    if adjective_rule(&lower).is_some() {
        return Strategy::CyrillicAdjective;
    }

    if !has_camel_case(keyword) {
        let ends_in_vowel = lower
            .chars()
            .last()
            .is_some_and(|c| INDECLINABLE_VOWELS.contains(&c));
        if is_all_upper(keyword) || ends_in_vowel {
            return Strategy::CyrillicIndeclinable;
        }
    }

    Strategy::CyrillicNoun
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_wins() {
        assert_eq!(classify("donald trump"), Strategy::LiteralPhrase);
        assert_eq!(classify("владимир путин"), Strategy::LiteralPhrase);
    }

    #[test]
    fn test_latin_words() {
        assert_eq!(classify("trump"), Strategy::LatinWord);
        assert_eq!(classify("O'Neill"), Strategy::LatinWord);
        assert_eq!(classify("Zelenskyy"), Strategy::LatinWord);
        assert_eq!(classify("Macron-led"), Strategy::LatinWord);
        assert_eq!(classify("Gérard"), Strategy::LatinWord);
    }

    #[test]
    fn test_cyrillic_classes() {
        assert_eq!(classify("зеленский"), Strategy::CyrillicAdjective);
        assert_eq!(classify("Зеленський"), Strategy::CyrillicAdjective);
        assert_eq!(classify("путин"), Strategy::CyrillicNoun);
        assert_eq!(classify("Путін"), Strategy::CyrillicNoun);
        assert_eq!(classify("Украина"), Strategy::CyrillicNoun);
        assert_eq!(classify("США"), Strategy::CyrillicIndeclinable);
        assert_eq!(classify("пикассо"), Strategy::CyrillicIndeclinable);
        assert_eq!(classify("МакДональдсо"), Strategy::CyrillicNoun);
    }

    #[test]
    fn test_opaque_fallback() {
        assert_eq!(classify("g7"), Strategy::Opaque);
        assert_eq!(classify("путинtrump"), Strategy::Opaque);
        assert_eq!(classify("#tag"), Strategy::Opaque);
        assert_eq!(classify("---"), Strategy::Opaque);
    }

    #[test]
    fn test_case_helpers() {
        assert!(has_camel_case("МакДональд"));
        assert!(!has_camel_case("США"));
        assert!(is_all_upper("НАТО"));
        assert!(!is_all_upper("Нато"));
        assert!(!is_all_upper("--"));
    }
}
