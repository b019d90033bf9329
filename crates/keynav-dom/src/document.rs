//! Document - High-level document API
//!
//! Owns the DOM tree, the `<html>`/`<head>`/`<body>` skeleton and the
//! document's focus state.

use crate::{
    ComputedStyle, DOMRect, DomAccess, DomError, DomTree, ElementData, FocusOptions, NodeId,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    active_element: Option<NodeId>,
    last_focus_options: Option<FocusOptions>,
}

impl Document {
    /// Create a document with an empty `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under a fresh root cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: None,
            last_focus_options: None,
        }
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.tree.create_element(tag_name)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.append_child(parent, child)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.tree.insert_before(parent, child, reference)
    }

    /// Create an element with attributes and append it to `parent`
    ///
    /// If `parent` cannot hold children the element is returned detached.
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.tree.create_element(tag_name);
        if let Some(element) = self.element_mut(id) {
            for (name, value) in attrs {
                element.attrs.set(name, value);
            }
        }
        if let Err(err) = self.tree.append_child(parent, id) {
            tracing::warn!("append_element left <{}> detached: {}", tag_name, err);
        }
        id
    }

    /// Append a text node to `parent`
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let id = self.tree.create_text(content);
        if let Err(err) = self.tree.append_child(parent, id) {
            tracing::warn!("append_text left text node detached: {}", err);
        }
        id
    }

    /// Detach a node (and its subtree) from the document
    ///
    /// Removing the focused element, or one of its ancestors, moves focus
    /// back to the body.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(active) = self.active_element {
            if self.tree.contains(node, active) {
                tracing::debug!("Focused element {} removed, blurring", active);
                self.active_element = None;
            }
        }
        self.tree.detach(node);
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.tree.get(node)?.as_element()
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.tree.get_mut(node)?.as_element_mut()
    }

    fn element_or_err(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        let n = self.tree.get_mut(node).ok_or(DomError::InvalidNode(node))?;
        n.as_element_mut().ok_or(DomError::NotAnElement(node))
    }

    /// Replace an element's computed style
    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) -> Result<(), DomError> {
        self.element_or_err(node)?.style = style;
        Ok(())
    }

    /// Style applied while the element is focused
    pub fn set_focus_style(&mut self, node: NodeId, style: ComputedStyle) -> Result<(), DomError> {
        self.element_or_err(node)?.focus_style = Some(style);
        Ok(())
    }

    /// Override the element's layout box
    pub fn set_rect(&mut self, node: NodeId, rect: DOMRect) -> Result<(), DomError> {
        self.element_or_err(node)?.rect = rect;
        Ok(())
    }

    /// Get element by `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&node| self.element(node).and_then(|e| e.attrs.get("id")) == Some(id))
    }

    /// Options passed to the most recent successful `focus()`
    pub fn last_focus_options(&self) -> Option<FocusOptions> {
        self.last_focus_options
    }

    /// Element can be a focus target at all (HTML "focusable area")
    fn is_focus_area(&self, node: NodeId) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        let attrs = &element.attrs;
        if attrs.get("tabindex").is_some_and(|t| t.trim().parse::<i32>().is_ok()) {
            return true;
        }
        if attrs.get("contenteditable").is_some_and(|v| v != "false") {
            return true;
        }
        let disabled = attrs.has("disabled");
        match element.tag_name.as_str() {
            "a" | "area" => attrs.has("href"),
            "button" | "select" | "textarea" => !disabled,
            "input" => !disabled && attrs.get("type") != Some("hidden"),
            "summary" | "iframe" => true,
            "audio" | "video" => attrs.has("controls"),
            _ => false,
        }
    }

    /// Element and all its ancestors generate a visible box
    fn is_rendered(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(style) = self.computed_style(id) {
                if style.is_display_none() || style.is_invisible() {
                    return false;
                }
            }
            current = self.tree.parent(id);
        }
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl DomAccess for Document {
    fn body(&self) -> Option<NodeId> {
        self.body_element.option()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.element_children(node)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.tree
            .descendants(root)
            .filter(|&id| self.tree.get(id).is_some_and(|n| n.is_element()))
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_or_err(node)?.attrs.set(name, value);
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_or_err(node)?.attrs.remove(name))
    }

    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        let element = self.element(node)?;
        let mut style = element.style.clone();
        if element.attrs.has("hidden") {
            style.display = crate::Display::None;
        }
        Some(style)
    }

    fn focus_style(&self, node: NodeId) -> Option<ComputedStyle> {
        self.element(node)?.focus_style.clone()
    }

    fn bounding_rect(&self, node: NodeId) -> Option<DOMRect> {
        let element = self.element(node)?;
        let hidden = self.computed_style(node).is_some_and(|s| s.is_display_none());
        Some(if hidden { DOMRect::default() } else { element.rect })
    }

    fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    fn focus(&mut self, node: NodeId, options: FocusOptions) -> Result<(), DomError> {
        if self.tree.get(node).is_none() {
            return Err(DomError::InvalidNode(node));
        }
        if !self.tree.is_connected(node) || !self.is_focus_area(node) || !self.is_rendered(node) {
            return Err(DomError::NotFocusable(node));
        }
        self.active_element = Some(node);
        self.last_focus_options = Some(options);
        Ok(())
    }

    fn blur(&mut self) {
        self.active_element = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_skeleton() {
        let doc = Document::new();
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_focus_requires_focus_area() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_element(body, "div", &[]);
        let button = doc.append_element(body, "button", &[]);

        assert_eq!(
            doc.focus(div, FocusOptions::default()),
            Err(DomError::NotFocusable(div))
        );
        doc.set_attribute(div, "tabindex", "-1").unwrap();
        assert!(doc.focus(div, FocusOptions::default()).is_ok());

        assert!(doc.focus(button, FocusOptions::prevent_scroll(true)).is_ok());
        assert_eq!(doc.active_element(), Some(button));
        assert_eq!(doc.last_focus_options(), Some(FocusOptions::prevent_scroll(true)));
    }

    #[test]
    fn test_hidden_ancestor_blocks_focus() {
        let mut doc = Document::new();
        let body = doc.body();
        let wrapper = doc.append_element(body, "div", &[("hidden", "")]);
        let button = doc.append_element(wrapper, "button", &[]);

        assert!(doc.focus(button, FocusOptions::default()).is_err());
        assert!(doc.bounding_rect(wrapper).unwrap().is_empty());
    }

    #[test]
    fn test_removing_focused_subtree_blurs() {
        let mut doc = Document::new();
        let body = doc.body();
        let dialog = doc.append_element(body, "div", &[]);
        let button = doc.append_element(dialog, "button", &[]);
        doc.focus(button, FocusOptions::default()).unwrap();

        doc.remove(dialog);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.is_connected(button));
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        let body = doc.body();
        let main = doc.append_element(body, "main", &[("id", "content")]);
        assert_eq!(doc.get_element_by_id("content"), Some(main));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }
}
