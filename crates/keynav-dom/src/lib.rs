//! keynav DOM - Headless Document Object Model
//!
//! Arena-based, in-memory DOM used by the keyboard navigation core.
//!
//! The navigation algorithms never touch [`Document`] directly; they are
//! written against the [`DomAccess`] trait so any host (a real browser
//! bridge, a test double, a native toolkit) can drive them.

mod access;
mod attributes;
mod document;
pub mod events;
mod geometry;
mod node;
mod selectors;
mod style;
mod tree;

pub use access::{DomAccess, FocusOptions};
pub use attributes::{Attr, NamedNodeMap};
pub use document::Document;
pub use events::{keys, FocusEvent, KeyboardEvent, PointerEvent};
pub use geometry::DOMRect;
pub use node::{ElementData, Node, NodeData};
pub use selectors::{AttributeMatcher, AttributeSelector, Compound, Selector, SelectorList};
pub use style::{ComputedStyle, Display, Visibility};
pub use tree::DomTree;

/// Node identifier (index into arena)
///
/// This is the opaque element handle handed to the navigation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0} does not exist")]
    InvalidNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} cannot receive focus")]
    NotFocusable(NodeId),

    #[error("Cannot insert {child} into {parent}: hierarchy request error")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}
