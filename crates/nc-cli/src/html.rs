//! HTML loading
//!
//! Parses a page with `scraper` and copies its element tree into a
//! [`MemoryDocument`] so the scanner can run on it offline.

use scraper::{ElementRef, Html, Node};

use nc_core::dom::memory::{MemoryDocument, NodeId};
use nc_core::Document;

/// Parse `source` into a document whose root stands for `<html>`.
pub fn parse_document(source: &str) -> MemoryDocument {
    let html = Html::parse_document(source);
    let mut doc = MemoryDocument::new();
    let root = doc.root();

    let mut stack: Vec<(NodeId, ElementRef<'_>)> = vec![(root, html.root_element())];
    while let Some((parent, element)) = stack.pop() {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    doc.append_text(parent, text);
                }
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        let value = child_el.value();
                        let attrs: Vec<(&str, &str)> = value.attrs().collect();
                        let id = doc.append_element(parent, value.name(), &attrs);
                        stack.push((id, child_el));
                    }
                }
                _ => {}
            }
        }
    }
    doc
}
