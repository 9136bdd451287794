//! Document abstraction
//!
//! The core never touches a browser DOM directly. It needs subtree query by
//! signature, an ancestry walk, text extraction and reversible annotation;
//! `nc-wasm` implements this over `web-sys`, [`memory::MemoryDocument`]
//! implements it in memory for tests and offline scans.

use std::fmt::Debug;
use std::hash::Hash;

use crate::types::Mode;

pub mod memory;
pub mod signature;

pub use signature::Signature;

/// Error type for document access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node is detached from the document")]
    Detached,
    #[error("Unsupported node: {0}")]
    Unsupported(String),
    #[error("Script error: {0}")]
    Js(String),
}

/// Document-like capability the scanner runs against.
pub trait Document {
    /// Node handle; identity is what the visited set is keyed by.
    type Node: Copy + Eq + Hash + Debug;

    /// Root element of the whole document.
    fn root(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// True if the element matches one signature.
    fn matches(&self, node: Self::Node, signature: &Signature) -> bool;

    /// Elements under `root` (and `root` itself) matching any signature,
    /// in document order.
    fn select(&self, root: Self::Node, signatures: &[Signature]) -> Vec<Self::Node>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Rendered text of the subtree.
    fn text(&self, node: Self::Node) -> Result<String, DomError>;

    /// Apply a visual treatment and attach a reveal control.
    ///
    /// Marking an already marked node must not attach a second control.
    fn mark(&mut self, node: Self::Node, mode: Mode) -> Result<(), DomError>;

    /// Remove the treatment and its reveal control.
    fn unmark(&mut self, node: Self::Node) -> Result<(), DomError>;

    /// Nodes that left the document since the last call. The document drops
    /// its own references to them; their handles may be reused afterwards.
    fn release_detached(&mut self) -> Vec<Self::Node> {
        Vec::new()
    }

    fn matches_any(&self, node: Self::Node, signatures: &[Signature]) -> bool {
        signatures.iter().any(|sig| self.matches(node, sig))
    }
}
