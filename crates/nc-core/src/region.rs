//! Region Selector
//!
//! Enumerates the DOM regions worth testing under a subtree root. Two
//! heuristics are unioned: container shape (article/story/card-like
//! elements) and heading content (a matching heading pulls in its nearest
//! container ancestor). Either one alone misses hits on real news layouts.

use std::collections::HashSet;

use crate::dom::signature::{container_signatures, HEADING_SIGNATURES};
use crate::dom::{Document, DomError, Signature};
use crate::matcher::Matcher;

/// Upper bound on the ancestor walk from a matching heading.
pub const MAX_ANCESTOR_HOPS: usize = 8;

/// Cap on region text fed to the matcher.
pub const MAX_REGION_TEXT_CHARS: usize = 8000;

/// Shortest heading text that counts as a region's relevant text.
pub const MIN_HEADING_TEXT_CHARS: usize = 2;

/// Selects candidate regions for one scan pass.
pub struct RegionSelector<'a> {
    matcher: Matcher<'a>,
    containers: Vec<Signature>,
}

impl<'a> RegionSelector<'a> {
    pub fn new(matcher: Matcher<'a>, host: &str, aggressive: bool) -> Self {
        Self {
            matcher,
            containers: container_signatures(host, aggressive),
        }
    }

    pub fn containers(&self) -> &[Signature] {
        &self.containers
    }

    /// Candidate regions under `root`, deduplicated by node identity.
    pub fn select<D: Document>(&self, doc: &D, root: D::Node) -> Vec<D::Node> {
        let mut seen = HashSet::new();
        let mut regions = Vec::new();

        for node in doc.select(root, &self.containers) {
            if seen.insert(node) {
                regions.push(node);
            }
        }

        for heading in doc.select(root, HEADING_SIGNATURES) {
            let text = match heading_text(doc, heading) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("skipping heading {:?}: {}", heading, e);
                    continue;
                }
            };
            if !self.matcher.matches(&text.to_lowercase()) {
                continue;
            }
            let region = self.nearest_container(doc, heading);
            if seen.insert(region) {
                regions.push(region);
            }
        }

        regions
    }

    /// Closest container ancestor within [`MAX_ANCESTOR_HOPS`], else the
    /// immediate parent, else the node itself.
    pub fn nearest_container<D: Document>(&self, doc: &D, node: D::Node) -> D::Node {
        let mut current = doc.parent(node);
        for _ in 0..MAX_ANCESTOR_HOPS {
            let Some(ancestor) = current else {
                break;
            };
            if doc.matches_any(ancestor, &self.containers) {
                return ancestor;
            }
            current = doc.parent(ancestor);
        }
        doc.parent(node).unwrap_or(node)
    }
}

/// Own text of a heading or labeled link, trimmed.
///
/// Links without visible text fall back to `aria-label`, then `title`.
pub fn heading_text<D: Document>(doc: &D, node: D::Node) -> Result<String, DomError> {
    let text = doc.text(node)?;
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }
    let label = doc
        .attribute(node, "aria-label")
        .or_else(|| doc.attribute(node, "title"))
        .unwrap_or_default();
    Ok(label.trim().to_string())
}

/// Text a region is judged by, lower-cased.
///
/// The first heading inside the region wins if it has at least
/// [`MIN_HEADING_TEXT_CHARS`] characters; otherwise the region's full text,
/// truncated to [`MAX_REGION_TEXT_CHARS`].
pub fn relevant_text<D: Document>(doc: &D, region: D::Node) -> Result<String, DomError> {
    if let Some(&heading) = doc.select(region, HEADING_SIGNATURES).first() {
        let text = heading_text(doc, heading)?;
        if text.chars().count() >= MIN_HEADING_TEXT_CHARS {
            return Ok(text.to_lowercase());
        }
    }
    let text = doc.text(region)?;
    Ok(truncate_chars(&text, MAX_REGION_TEXT_CHARS).to_lowercase())
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => &text[..byte_pos],
        None => text,
    }
}
