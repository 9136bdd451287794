//! Element signatures
//!
//! A signature is a tiny, CSS-expressible predicate on one element. The
//! region selector works only with these tables, so new site layouts are
//! supported by extending data, not logic.

use std::fmt;

use crate::host::walk_host_suffixes;

/// Predicate on a single element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// Tag name, case-insensitive (`article`)
    Tag(&'static str),
    /// ARIA role (`[role="article"]`)
    Role(&'static str),
    /// Substring of the class attribute (`[class*="story"]`)
    ClassContains(&'static str),
    /// Tag carrying an attribute (`a[aria-label]`)
    TagWithAttr(&'static str, &'static str),
}

impl Signature {
    /// Equivalent CSS selector.
    pub fn to_css(&self) -> String {
        match self {
            Self::Tag(tag) => tag.to_string(),
            Self::Role(role) => format!("[role=\"{}\"]", role),
            Self::ClassContains(part) => format!("[class*=\"{}\"]", part),
            Self::TagWithAttr(tag, attr) => format!("{}[{}]", tag, attr),
        }
    }

    /// Test against raw element data.
    pub fn matches_element<'a, F>(&self, tag: &str, attr: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        match self {
            Self::Tag(want) => tag.eq_ignore_ascii_case(want),
            Self::Role(want) => attr("role").is_some_and(|role| role.trim() == *want),
            Self::ClassContains(part) => attr("class").is_some_and(|class| class.contains(part)),
            Self::TagWithAttr(want, name) => tag.eq_ignore_ascii_case(want) && attr(name).is_some(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Join signatures into one selector list.
pub fn selector_list(signatures: &[Signature]) -> String {
    signatures
        .iter()
        .map(Signature::to_css)
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Signature Tables
// =============================================================================

/// Content containers hidden as a unit.
pub const CONTAINER_SIGNATURES: &[Signature] = &[
    Signature::Tag("article"),
    Signature::Role("article"),
    Signature::Tag("section"),
    Signature::ClassContains("article"),
    Signature::ClassContains("story"),
    Signature::ClassContains("card"),
    Signature::ClassContains("post"),
    Signature::ClassContains("news"),
    Signature::ClassContains("teaser"),
];

/// Headings and labeled links whose own text triggers the ancestor walk.
pub const HEADING_SIGNATURES: &[Signature] = &[
    Signature::Tag("h1"),
    Signature::Tag("h2"),
    Signature::Tag("h3"),
    Signature::Tag("h4"),
    Signature::Tag("h5"),
    Signature::Tag("h6"),
    Signature::Role("heading"),
    Signature::TagWithAttr("a", "aria-label"),
    Signature::TagWithAttr("a", "title"),
];

/// Extra generic tiles scanned in aggressive mode.
pub const AGGRESSIVE_SIGNATURES: &[Signature] = &[
    Signature::Tag("li"),
    Signature::ClassContains("tile"),
    Signature::ClassContains("entry"),
    Signature::ClassContains("item"),
];

/// Site-specific containers, keyed by registrable host.
pub const SITE_SIGNATURES: &[(&str, &[Signature])] = &[
    (
        "youtube.com",
        &[
            Signature::Tag("ytd-rich-item-renderer"),
            Signature::Tag("ytd-video-renderer"),
            Signature::Tag("ytd-compact-video-renderer"),
        ],
    ),
    ("news.google.com", &[Signature::Tag("c-wiz")]),
    ("reddit.com", &[Signature::Tag("shreddit-post")]),
    ("x.com", &[Signature::TagWithAttr("article", "data-testid")]),
];

/// Extra container signatures for `host` or any of its parent domains.
pub fn site_signatures(host: &str) -> Vec<Signature> {
    let mut extra = Vec::new();
    for suffix in walk_host_suffixes(host) {
        for (site, signatures) in SITE_SIGNATURES {
            if *site == suffix {
                extra.extend_from_slice(signatures);
            }
        }
    }
    extra
}

/// Container signatures in effect for one scan.
pub fn container_signatures(host: &str, aggressive: bool) -> Vec<Signature> {
    let mut signatures = CONTAINER_SIGNATURES.to_vec();
    signatures.extend(site_signatures(host));
    if aggressive {
        signatures.extend_from_slice(AGGRESSIVE_SIGNATURES);
    }
    signatures
}
