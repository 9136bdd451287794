//! Arena-backed in-memory document.
//!
//! Used by unit tests and by the CLI after parsing HTML. Nodes are never
//! freed; detaching only unlinks a subtree so identity stays stable.

use super::{Document, DomError, Signature};
use crate::types::Mode;

/// Stable handle into a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    treatment: Option<Mode>,
    reveal_controls: usize,
    detached: bool,
    released: bool,
}

/// In-memory element tree.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document holding an empty `html` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    tag: "html".to_string(),
                    attrs: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
                treatment: None,
                reveal_controls: 0,
                detached: false,
            released: false,
            }],
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            treatment: None,
            reveal_controls: 0,
            detached: false,
            released: false,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
        )
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    /// Unlink `node` from its parent; its subtree becomes detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.nodes[id.0].detached = true;
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn treatment(&self, node: NodeId) -> Option<Mode> {
        self.nodes.get(node.0).and_then(|n| n.treatment)
    }

    /// Number of reveal controls attached to `node`.
    pub fn reveal_controls(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map(|n| n.reveal_controls).unwrap_or(0)
    }

    /// All nodes currently carrying a treatment, in document order.
    pub fn marked_nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.nodes[id.0].treatment.is_some())
            .collect()
    }

    /// Elements in the subtree of `root`, pre-order, root included.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(data) = self.nodes.get(id.0) else {
                continue;
            };
            if let NodeKind::Element { .. } = data.kind {
                out.push(id);
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }

    fn element_attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            NodeKind::Element { tag, .. } => {
                if matches!(tag.as_str(), "script" | "style" | "template") {
                    return;
                }
                for &child in &self.nodes[node.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn matches(&self, node: NodeId, signature: &Signature) -> bool {
        match self.tag(node) {
            Some(tag) => signature.matches_element(tag, |name| self.element_attr(node, name)),
            None => false,
        }
    }

    fn select(&self, root: NodeId, signatures: &[Signature]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.matches_any(id, signatures))
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element_attr(node, name).map(str::to_string)
    }

    fn text(&self, node: NodeId) -> Result<String, DomError> {
        let data = self
            .nodes
            .get(node.0)
            .ok_or_else(|| DomError::Unsupported(format!("unknown node {}", node.0)))?;
        if data.detached {
            return Err(DomError::Detached);
        }
        let mut out = String::new();
        self.collect_text(node, &mut out);
        Ok(out)
    }

    fn mark(&mut self, node: NodeId, mode: Mode) -> Result<(), DomError> {
        let data = self
            .nodes
            .get_mut(node.0)
            .ok_or_else(|| DomError::Unsupported(format!("unknown node {}", node.0)))?;
        if data.detached {
            return Err(DomError::Detached);
        }
        if data.treatment.is_none() {
            data.reveal_controls += 1;
        }
        data.treatment = Some(mode);
        Ok(())
    }

    fn release_detached(&mut self) -> Vec<NodeId> {
        let mut released = Vec::new();
        for (index, data) in self.nodes.iter_mut().enumerate() {
            if data.detached && !data.released {
                data.released = true;
                released.push(NodeId(index));
            }
        }
        released
    }

    fn unmark(&mut self, node: NodeId) -> Result<(), DomError> {
        let data = self
            .nodes
            .get_mut(node.0)
            .ok_or_else(|| DomError::Unsupported(format!("unknown node {}", node.0)))?;
        data.treatment = None;
        data.reveal_controls = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new();
        let body = doc.append_element(doc.root(), "body", &[]);
        let article = doc.append_element(body, "ARTICLE", &[("Class", "story")]);
        let h2 = doc.append_element(article, "h2", &[]);
        doc.append_text(h2, "Headline");
        let p = doc.append_element(article, "p", &[]);
        doc.append_text(p, "  body text ");
        let script = doc.append_element(article, "script", &[]);
        doc.append_text(script, "var x = 1;");
        (doc, article, h2)
    }

    #[test]
    fn test_text_skips_scripts_and_joins() {
        let (doc, article, _) = sample();
        assert_eq!(doc.text(article).unwrap(), "Headline body text");
    }

    #[test]
    fn test_select_includes_root_in_document_order() {
        let (doc, article, h2) = sample();
        let found = doc.select(article, &[Signature::Tag("article"), Signature::Tag("h2")]);
        assert_eq!(found, vec![article, h2]);
        assert_eq!(doc.attribute(article, "class").as_deref(), Some("story"));
        assert_eq!(doc.tag(article), Some("article"));
    }

    #[test]
    fn test_mark_attaches_single_control() {
        let (mut doc, article, _) = sample();
        doc.mark(article, Mode::Hide).unwrap();
        doc.mark(article, Mode::Blur).unwrap();
        assert_eq!(doc.treatment(article), Some(Mode::Blur));
        assert_eq!(doc.reveal_controls(article), 1);
        assert_eq!(doc.marked_nodes(), vec![article]);
        doc.unmark(article).unwrap();
        assert_eq!(doc.treatment(article), None);
        assert_eq!(doc.reveal_controls(article), 0);
    }

    #[test]
    fn test_detached_text_errors() {
        let (mut doc, article, h2) = sample();
        doc.detach(article);
        assert_eq!(doc.text(h2), Err(DomError::Detached));
        assert_eq!(doc.parent(article), None);
        assert!(doc.mark(article, Mode::Hide).is_err());
    }

    #[test]
    fn test_release_detached_reports_each_node_once() {
        let (mut doc, article, h2) = sample();
        assert!(doc.release_detached().is_empty());

        doc.detach(article);
        let released = doc.release_detached();
        assert!(released.contains(&article));
        assert!(released.contains(&h2));
        assert!(!released.contains(&doc.root()));
        assert!(doc.release_detached().is_empty());
    }
}
