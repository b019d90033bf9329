//! DOM access trait
//!
//! The element-handle interface the navigation core is written against.
//! [`Document`](crate::Document) is the in-memory implementation; a browser
//! bridge would implement the same trait over real nodes.

use crate::{ComputedStyle, DOMRect, DomError, NodeId, SelectorList};

/// Options passed to `element.focus()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Do not scroll the element into view
    pub prevent_scroll: bool,
}

impl FocusOptions {
    pub fn prevent_scroll(prevent_scroll: bool) -> Self {
        Self { prevent_scroll }
    }
}

/// Read/write access to a document
///
/// Only element nodes are ever passed to the attribute and style methods;
/// implementations return `None` / `Err` for anything else.
pub trait DomAccess {
    /// `document.body`
    fn body(&self) -> Option<NodeId>;

    /// `document.activeElement`, `None` when nothing (or the body) has focus
    fn active_element(&self) -> Option<NodeId>;

    /// `document.contains(node)`
    fn is_connected(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in document order
    fn element_children(&self, node: NodeId) -> Vec<NodeId>;

    /// Lowercase tag name, `None` for non-elements
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    /// Remove an attribute, returning its previous value
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    /// `getComputedStyle(node)`
    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle>;

    /// Computed style while the element matches `:focus`
    fn focus_style(&self, _node: NodeId) -> Option<ComputedStyle> {
        None
    }

    /// `getBoundingClientRect()`
    fn bounding_rect(&self, node: NodeId) -> Option<DOMRect>;

    fn text_content(&self, _node: NodeId) -> String {
        String::new()
    }

    /// `element.focus(options)`
    fn focus(&mut self, node: NodeId, options: FocusOptions) -> Result<(), DomError>;

    /// `document.activeElement.blur()`
    fn blur(&mut self);

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Inclusive ancestor check
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Element descendants of `root` in pre-order (root excluded)
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element_children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.element_children(node).into_iter().rev());
        }
        out
    }

    /// `root.querySelectorAll(selector)`
    fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&node| selector.matches(self, node))
            .collect()
    }

    /// `root.querySelector(selector)`
    fn query_selector(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&node| selector.matches(self, node))
    }

    /// Parse and run a selector in one go
    fn select(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.query_selector_all(root, &list))
    }

    /// `element.matches(selector)`
    fn matches(&self, node: NodeId, selector: &SelectorList) -> bool {
        selector.matches(self, node)
    }

    /// `element.closest(selector)`
    fn closest(&self, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            self.tag_name(id)?;
            if selector.matches(self, id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Parsed `tabindex` attribute; `None` when absent or not an integer
    fn tab_index(&self, node: NodeId) -> Option<i32> {
        self.attribute(node, "tabindex")?.trim().parse().ok()
    }
}
