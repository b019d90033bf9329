//! Focus Management
//!
//! Focusable-element discovery and a bounded focus history.
//!
//! Discovery is a two-step filter: a selector picks candidate elements
//! (links, form controls, `tabindex`, editable and media elements), then a
//! rendering predicate drops anything that is disabled, has no layout box,
//! or sits under a `display: none` / `visibility: hidden` ancestor.

use std::collections::VecDeque;
use std::sync::LazyLock;

use keynav_dom::{DomAccess, FocusOptions, NodeId, SelectorList};

/// Default number of entries kept by [`FocusHistory`]
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Candidate selector for keyboard-focusable elements
pub const FOCUSABLE_SELECTOR: &str = concat!(
    "a[href], area[href], ",
    "button:not([disabled]), ",
    "input:not([disabled]):not([type=\"hidden\"]), ",
    "select:not([disabled]), textarea:not([disabled]), ",
    "[tabindex]:not([tabindex^=\"-\"]), ",
    "[contenteditable]:not([contenteditable=\"false\"]), ",
    "audio[controls], video[controls], ",
    "[draggable=\"true\"], summary, iframe",
);

static FOCUSABLE: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::parse(FOCUSABLE_SELECTOR).unwrap_or_else(|err| {
        tracing::error!("Focusable selector rejected, no element will match: {}", err);
        SelectorList::default()
    })
});

/// Element passes the focusability selector and rendering predicate
pub fn is_focusable<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    FOCUSABLE.matches(dom, node) && is_rendered_and_enabled(dom, node)
}

/// Element is natively focusable or carries a `tabindex`, ignoring rendering
pub fn is_focus_candidate<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    FOCUSABLE.matches(dom, node) || dom.tab_index(node).is_some()
}

fn is_rendered_and_enabled<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    if dom.has_attribute(node, "disabled") {
        return false;
    }
    if dom.tab_index(node).is_some_and(|t| t < -1) {
        return false;
    }
    if dom.bounding_rect(node).is_none_or(|rect| rect.is_empty()) {
        return false;
    }
    !is_hidden_by_style(dom, node)
}

/// Element or an ancestor is `display: none` or `visibility: hidden`
pub fn is_hidden_by_style<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        let Some(style) = dom.computed_style(id) else {
            break;
        };
        if style.is_display_none() || style.is_invisible() {
            return true;
        }
        current = dom.parent(id);
    }
    false
}

/// Bounded most-recent-first stack of previously focused elements
///
/// Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct FocusHistory {
    entries: VecDeque<NodeId>,
    capacity: usize,
}

impl FocusHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, node: NodeId) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(node);
        self.entries.truncate(self.capacity);
    }

    /// Most recent entry
    pub fn pop(&mut self) -> Option<NodeId> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<NodeId> {
        self.entries.front().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, most recent first
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for FocusHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Focus manager
///
/// Moves focus inside a container and remembers where focus was so it can
/// be put back later. Each manager owns its own history.
#[derive(Debug, Default)]
pub struct FocusManager {
    history: FocusHistory,
    prevent_scroll: bool,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: FocusHistory::new(capacity),
            prevent_scroll: false,
        }
    }

    /// Pass `preventScroll` on every focus call made by this manager
    pub fn set_prevent_scroll(&mut self, prevent_scroll: bool) {
        self.prevent_scroll = prevent_scroll;
    }

    /// Focusable elements inside `container`, in document order
    pub fn focusable_elements<D: DomAccess + ?Sized>(&self, dom: &D, container: NodeId) -> Vec<NodeId> {
        dom.query_selector_all(container, &FOCUSABLE)
            .into_iter()
            .filter(|&node| is_rendered_and_enabled(dom, node))
            .collect()
    }

    /// Focus an element, reporting success
    pub fn focus<D: DomAccess + ?Sized>(&self, dom: &mut D, node: NodeId) -> bool {
        match dom.focus(node, FocusOptions::prevent_scroll(self.prevent_scroll)) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("focus({}) failed: {}", node, err);
                false
            }
        }
    }

    pub fn focus_first<D: DomAccess + ?Sized>(&self, dom: &mut D, container: NodeId) -> bool {
        match self.focusable_elements(dom, container).first() {
            Some(&first) => self.focus(dom, first),
            None => false,
        }
    }

    pub fn focus_last<D: DomAccess + ?Sized>(&self, dom: &mut D, container: NodeId) -> bool {
        match self.focusable_elements(dom, container).last() {
            Some(&last) => self.focus(dom, last),
            None => false,
        }
    }

    /// Focus the element after `current` (default: the active element)
    ///
    /// Returns `false` at the end of the list. When `current` is not one of
    /// the container's focusable elements, the first one is focused.
    pub fn focus_next<D: DomAccess + ?Sized>(
        &self,
        dom: &mut D,
        container: NodeId,
        current: Option<NodeId>,
    ) -> bool {
        let elements = self.focusable_elements(dom, container);
        let current = current.or_else(|| dom.active_element());
        let target = match current.and_then(|c| elements.iter().position(|&e| e == c)) {
            Some(pos) => elements.get(pos + 1),
            None => elements.first(),
        };
        match target {
            Some(&node) => self.focus(dom, node),
            None => false,
        }
    }

    /// Focus the element before `current` (default: the active element)
    ///
    /// Returns `false` at the start of the list. When `current` is not one
    /// of the container's focusable elements, the last one is focused.
    pub fn focus_previous<D: DomAccess + ?Sized>(
        &self,
        dom: &mut D,
        container: NodeId,
        current: Option<NodeId>,
    ) -> bool {
        let elements = self.focusable_elements(dom, container);
        let current = current.or_else(|| dom.active_element());
        let target = match current.and_then(|c| elements.iter().position(|&e| e == c)) {
            Some(0) => None,
            Some(pos) => elements.get(pos - 1),
            None => elements.last(),
        };
        match target {
            Some(&node) => self.focus(dom, node),
            None => false,
        }
    }

    /// Push `element` (default: the active element) onto the history
    pub fn save_focus<D: DomAccess + ?Sized>(&mut self, dom: &D, element: Option<NodeId>) -> bool {
        match element.or_else(|| dom.active_element()) {
            Some(node) => {
                self.history.push(node);
                true
            }
            None => false,
        }
    }

    /// Pop the most recent history entry and focus it if still attached
    pub fn restore_focus<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        let Some(node) = self.history.pop() else {
            return false;
        };
        if !dom.is_connected(node) {
            tracing::debug!("Skipping focus restore: {} is detached", node);
            return false;
        }
        self.focus(dom, node)
    }

    pub fn history(&self) -> &FocusHistory {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
