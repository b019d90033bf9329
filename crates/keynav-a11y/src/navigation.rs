//! Keyboard Navigation Manager
//!
//! Owns every focus trap and roving tabindex set on a page, routes
//! keyboard, focus, and pointer events to them, and provides F6
//! landmark and Alt+F6 heading navigation.
//!
//! Traps form an activation stack. Tab and deferred initial focus go to
//! the top trap only. After any release the remaining traps re-apply their
//! sibling isolation from the bottom of the stack up. Releasing a trap below
//! the top leaves focus alone and passes its previously active element to
//! the trap above it.

use std::collections::HashMap;

use keynav_dom::{keys, DomAccess, FocusEvent, KeyboardEvent, NodeId, PointerEvent};

use crate::aria;
use crate::config::Config;
use crate::focus::{self, FocusManager};
use crate::roving::{RovingOptions, RovingTabindex};
use crate::trap::{FocusTrap, FocusTrapOptions};
use crate::validate::{self, FocusIndicatorProbe, ValidationIssue};
use crate::A11yError;

/// Disposer for a trap created by [`KeyboardNavigationManager::trap_focus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "the trap stays active until the handle is released"]
pub struct TrapHandle {
    container: NodeId,
}

impl TrapHandle {
    pub fn container(&self) -> NodeId {
        self.container
    }
}

/// Disposer for a set created by
/// [`KeyboardNavigationManager::create_roving_tabindex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RovingHandle {
    container: NodeId,
}

impl RovingHandle {
    pub fn container(&self) -> NodeId {
        self.container
    }
}

/// Page-wide keyboard navigation
#[derive(Debug)]
pub struct KeyboardNavigationManager {
    config: Config,
    focus: FocusManager,
    traps: HashMap<NodeId, FocusTrap>,
    /// Activation order, top of stack last
    trap_stack: Vec<NodeId>,
    roving: HashMap<NodeId, RovingTabindex>,
    /// Elements given `tabindex="-1"` by landmark/heading navigation, with
    /// the value they had before
    temporary_tabindex: Vec<(NodeId, Option<String>)>,
}

impl Default for KeyboardNavigationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardNavigationManager {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut focus = FocusManager::with_capacity(config.history_capacity);
        focus.set_prevent_scroll(config.prevent_scroll);
        Self {
            config,
            focus,
            traps: HashMap::new(),
            trap_stack: Vec::new(),
            roving: HashMap::new(),
            temporary_tabindex: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Manager-owned focus history and movement helpers
    pub fn focus_manager(&self) -> &FocusManager {
        &self.focus
    }

    pub fn focus_manager_mut(&mut self) -> &mut FocusManager {
        &mut self.focus
    }

    /// Trap options seeded from the configuration
    pub fn trap_options(&self) -> FocusTrapOptions {
        self.config.trap_options()
    }

    /// Roving tabindex options seeded from the configuration
    pub fn roving_options(&self) -> RovingOptions {
        self.config.roving_options()
    }

    // ------------------------------------------------------------------
    // Focus traps
    // ------------------------------------------------------------------

    /// Trap focus in `container`, replacing any trap already on it
    ///
    /// Returns `None` when activation failed (the failure is logged).
    pub fn trap_focus<D: DomAccess + ?Sized>(
        &mut self,
        dom: &mut D,
        container: NodeId,
        options: FocusTrapOptions,
    ) -> Option<TrapHandle> {
        if self.traps.contains_key(&container) {
            tracing::debug!("Replacing focus trap on {}", container);
            let _ = self.release_trap(dom, TrapHandle { container });
        }

        let mut trap = FocusTrap::new(container, options);
        if !trap.activate(dom) {
            return None;
        }
        if let Some(below) = self.trap_stack.last().and_then(|c| self.traps.get_mut(c)) {
            if below.cancel_pending_focus() {
                tracing::debug!("Dropped deferred focus of {} under new trap", below.container());
            }
        }
        self.traps.insert(container, trap);
        self.trap_stack.push(container);
        Some(TrapHandle { container })
    }

    /// Release a trap created by [`trap_focus`](Self::trap_focus)
    pub fn release_trap<D: DomAccess + ?Sized>(&mut self, dom: &mut D, handle: TrapHandle) -> bool {
        let container = handle.container;
        let Some(position) = self.trap_stack.iter().position(|&c| c == container) else {
            return false;
        };
        let above = self.trap_stack.get(position + 1).copied();
        let Some(trap) = self.traps.get_mut(&container) else {
            return false;
        };

        let released = match above {
            None => trap.deactivate(dom),
            Some(_) => {
                tracing::warn!("Releasing focus trap on {} while another trap is on top", container);
                let previous_active = trap.previous_active();
                let containers = trap.containers(dom);
                let released = trap.release(dom, false);

                // The trap above was likely opened from inside this one
                if let Some(above) = above.and_then(|c| self.traps.get_mut(&c)) {
                    let opened_inside = above
                        .previous_active()
                        .is_none_or(|node| containers.iter().any(|&c| dom.contains(c, node)));
                    if opened_inside {
                        above.set_previous_active(previous_active);
                    }
                }
                released
            }
        };
        self.forget_trap(dom, container);
        released
    }

    /// Run `f` with focus trapped in `container`, releasing afterwards
    pub fn with_trap<D, R, F>(
        &mut self,
        dom: &mut D,
        container: NodeId,
        options: FocusTrapOptions,
        f: F,
    ) -> Option<R>
    where
        D: DomAccess + ?Sized,
        F: FnOnce(&mut Self, &mut D) -> R,
    {
        let handle = self.trap_focus(dom, container, options)?;
        let result = f(self, dom);
        self.release_trap(dom, handle);
        Some(result)
    }

    /// Drop an already-released trap and repair the isolation of the rest
    ///
    /// Markers are only ever cleared by the trap that wrote them.
    fn forget_trap<D: DomAccess + ?Sized>(&mut self, dom: &mut D, container: NodeId) {
        let token = self.traps.remove(&container).map(|trap| trap.token().to_string());
        self.trap_stack.retain(|&c| c != container);
        for container in &self.trap_stack {
            if let Some(trap) = self.traps.get_mut(container) {
                if let Some(token) = &token {
                    trap.forget_revealed_from(token);
                }
                trap.reisolate(dom);
            }
        }
    }

    /// Containers of active traps, bottom of the stack first
    pub fn active_traps(&self) -> &[NodeId] {
        &self.trap_stack
    }

    pub fn top_trap(&self) -> Option<&FocusTrap> {
        self.trap_stack.last().and_then(|c| self.traps.get(c))
    }

    pub fn trap(&self, container: NodeId) -> Option<&FocusTrap> {
        self.traps.get(&container)
    }

    pub fn is_trapped(&self, container: NodeId) -> bool {
        self.traps.contains_key(&container)
    }

    // ------------------------------------------------------------------
    // Roving tabindex
    // ------------------------------------------------------------------

    /// Roving tabindex over `container`, replacing any existing set on it
    pub fn create_roving_tabindex<D: DomAccess + ?Sized>(
        &mut self,
        dom: &mut D,
        container: NodeId,
        options: RovingOptions,
    ) -> Result<RovingHandle, A11yError> {
        if let Some(mut previous) = self.roving.remove(&container) {
            previous.destroy(dom);
        }
        let mut roving = RovingTabindex::new(container, options)?;
        roving.initialize(dom)?;
        self.roving.insert(container, roving);
        Ok(RovingHandle { container })
    }

    pub fn destroy_roving<D: DomAccess + ?Sized>(&mut self, dom: &mut D, handle: RovingHandle) -> bool {
        match self.roving.remove(&handle.container) {
            Some(mut roving) => {
                roving.destroy(dom);
                true
            }
            None => false,
        }
    }

    pub fn roving(&self, container: NodeId) -> Option<&RovingTabindex> {
        self.roving.get(&container)
    }

    pub fn roving_mut(&mut self, container: NodeId) -> Option<&mut RovingTabindex> {
        self.roving.get_mut(&container)
    }

    /// Innermost roving container holding `node`
    fn roving_container_for<D: DomAccess + ?Sized>(&self, dom: &D, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.roving.contains_key(&id) {
                return Some(id);
            }
            current = dom.parent(id);
        }
        None
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    /// Document-level keydown (capture phase)
    ///
    /// Returns `true` when the event was handled.
    pub fn handle_keydown<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        if event.key == keys::F6 && !event.ctrl_key && !event.meta_key {
            let forward = !event.shift_key;
            if event.alt_key && self.config.heading_navigation {
                event.prevent_default();
                return self.cycle_headings(dom, forward);
            }
            if !event.alt_key && self.config.landmark_navigation {
                event.prevent_default();
                return self.cycle_landmarks(dom, forward);
            }
            return false;
        }

        if let Some(&top) = self.trap_stack.last() {
            if let Some(trap) = self.traps.get_mut(&top) {
                if trap.handle_keydown(dom, event) {
                    if !trap.is_active() {
                        self.forget_trap(dom, top);
                    }
                    return true;
                }
            }
        }

        let target = event.target.or_else(|| dom.active_element());
        let container = target.and_then(|t| self.roving_container_for(dom, t));
        match container.and_then(|c| self.roving.get_mut(&c)) {
            Some(roving) => roving.handle_keydown(dom, event),
            None => false,
        }
    }

    /// Document-level focusin
    pub fn handle_focus_in<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &FocusEvent) -> bool {
        if let Some(&top) = self.trap_stack.last() {
            if let Some(trap) = self.traps.get_mut(&top) {
                if trap.handle_focus_in(dom, event.target) {
                    return true;
                }
            }
        }
        match self.roving_container_for(dom, event.target) {
            Some(container) => self
                .roving
                .get_mut(&container)
                .is_some_and(|roving| roving.handle_focus_in(dom, event.target)),
            None => false,
        }
    }

    /// Document-level pointerdown
    pub fn handle_pointer_down<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &PointerEvent) -> bool {
        let Some(&top) = self.trap_stack.last() else {
            return false;
        };
        let released = self
            .traps
            .get_mut(&top)
            .is_some_and(|trap| trap.handle_pointer_down(dom, event));
        if released {
            self.forget_trap(dom, top);
        }
        released
    }

    /// Animation-frame callback: apply the top trap's deferred initial focus
    ///
    /// Returns `true` when focus moved.
    pub fn on_animation_frame<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        let Some(&top) = self.trap_stack.last() else {
            return false;
        };
        self.traps
            .get_mut(&top)
            .is_some_and(|trap| trap.flush_pending_focus(dom))
    }

    // ------------------------------------------------------------------
    // Landmark and heading navigation
    // ------------------------------------------------------------------

    /// Subtree landmark/heading navigation searches: the top trap, or the body
    fn navigation_root<D: DomAccess + ?Sized>(&self, dom: &D) -> Option<NodeId> {
        self.trap_stack.last().copied().or_else(|| dom.body())
    }

    /// Visible landmarks in document order
    pub fn landmarks<D: DomAccess + ?Sized>(&self, dom: &D) -> Vec<NodeId> {
        let Some(root) = self.navigation_root(dom) else {
            return Vec::new();
        };
        dom.descendants(root)
            .into_iter()
            .filter(|&node| aria::is_landmark(dom, node) && !focus::is_hidden_by_style(dom, node))
            .collect()
    }

    /// Visible headings in document order
    pub fn headings<D: DomAccess + ?Sized>(&self, dom: &D) -> Vec<NodeId> {
        let Some(root) = self.navigation_root(dom) else {
            return Vec::new();
        };
        dom.descendants(root)
            .into_iter()
            .filter(|&node| aria::is_heading(dom, node) && !focus::is_hidden_by_style(dom, node))
            .collect()
    }

    fn step(current: Option<usize>, len: usize, forward: bool) -> usize {
        match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        }
    }

    /// F6 / Shift+F6
    pub fn cycle_landmarks<D: DomAccess + ?Sized>(&mut self, dom: &mut D, forward: bool) -> bool {
        self.clear_temporary_tabindex(dom);
        let landmarks = self.landmarks(dom);
        if landmarks.is_empty() {
            return false;
        }

        // Innermost landmark holding focus
        let current = dom
            .active_element()
            .and_then(|active| landmarks.iter().rposition(|&l| dom.contains(l, active)));
        let landmark = landmarks[Self::step(current, landmarks.len(), forward)];
        tracing::debug!("Landmark navigation to {}", landmark);

        if focus::is_focusable(dom, landmark) {
            return self.focus.focus(dom, landmark);
        }
        if let Some(&first) = self.focus.focusable_elements(dom, landmark).first() {
            return self.focus.focus(dom, first);
        }
        self.focus_with_temporary_tabindex(dom, landmark)
    }

    /// Alt+F6 / Alt+Shift+F6
    pub fn cycle_headings<D: DomAccess + ?Sized>(&mut self, dom: &mut D, forward: bool) -> bool {
        self.clear_temporary_tabindex(dom);
        let headings = self.headings(dom);
        if headings.is_empty() {
            return false;
        }

        let current = dom
            .active_element()
            .and_then(|active| headings.iter().position(|&h| dom.contains(h, active)));
        let heading = headings[Self::step(current, headings.len(), forward)];
        tracing::debug!("Heading navigation to {}", heading);
        self.focus_with_temporary_tabindex(dom, heading)
    }

    /// Set `tabindex="-1"` and focus; the old value comes back on the next move
    fn focus_with_temporary_tabindex<D: DomAccess + ?Sized>(&mut self, dom: &mut D, node: NodeId) -> bool {
        let previous = dom.attribute(node, "tabindex").map(str::to_string);
        if previous.as_deref() != Some("-1") {
            if let Err(err) = dom.set_attribute(node, "tabindex", "-1") {
                tracing::warn!("Could not make {} focusable: {}", node, err);
                return false;
            }
            self.temporary_tabindex.push((node, previous));
        }
        self.focus.focus(dom, node)
    }

    fn clear_temporary_tabindex<D: DomAccess + ?Sized>(&mut self, dom: &mut D) {
        for (node, previous) in self.temporary_tabindex.drain(..) {
            if dom.attribute(node, "tabindex") != Some("-1") {
                continue;
            }
            let restored = match previous {
                Some(value) => dom.set_attribute(node, "tabindex", &value),
                None => dom.remove_attribute(node, "tabindex").map(|_| ()),
            };
            if let Err(err) = restored {
                tracing::debug!("Could not restore tabindex on {}: {}", node, err);
            }
        }
    }

    // ------------------------------------------------------------------
    // Validation and teardown
    // ------------------------------------------------------------------

    /// Keyboard accessibility checks for one element
    pub fn validate_element<D: DomAccess + ?Sized>(
        &self,
        dom: &D,
        node: NodeId,
        probe: Option<&dyn FocusIndicatorProbe<D>>,
    ) -> Vec<ValidationIssue> {
        validate::validate_element(dom, node, probe)
    }

    /// Release every trap, destroy every roving set, and forget history
    pub fn destroy<D: DomAccess + ?Sized>(&mut self, dom: &mut D) {
        while let Some(container) = self.trap_stack.pop() {
            if let Some(mut trap) = self.traps.remove(&container) {
                trap.deactivate(dom);
            }
        }
        self.traps.clear();

        for (_, mut roving) in self.roving.drain() {
            roving.destroy(dom);
        }
        self.clear_temporary_tabindex(dom);
        self.focus.clear_history();
        tracing::debug!("Keyboard navigation manager destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roving::Orientation;
    use crate::trap::HIDDEN_MARKER;
    use keynav_dom::Document;

    fn landmark_page() -> (Document, Vec<NodeId>, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append_element(body, "nav", &[]);
        let link = doc.append_element(nav, "a", &[("href", "/")]);
        let main = doc.append_element(body, "main", &[]);
        let heading = doc.append_element(main, "h1", &[]);
        let button = doc.append_element(main, "button", &[]);
        let footer = doc.append_element(body, "footer", &[]);
        let h2 = doc.append_element(footer, "h2", &[]);
        (doc, vec![nav, main, footer], vec![link, button, footer, heading, h2])
    }

    fn f6(manager: &mut KeyboardNavigationManager, doc: &mut Document, event: KeyboardEvent) -> bool {
        let mut event = event;
        manager.handle_keydown(doc, &mut event)
    }

    #[test]
    fn test_f6_cycles_landmarks() {
        let (mut doc, landmarks, targets) = landmark_page();
        let mut manager = KeyboardNavigationManager::new();
        assert_eq!(manager.landmarks(&doc), landmarks);

        let mut visited = Vec::new();
        for _ in 0..4 {
            assert!(f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6)));
            visited.push(doc.active_element());
        }
        assert_eq!(
            visited,
            vec![Some(targets[0]), Some(targets[1]), Some(targets[2]), Some(targets[0])]
        );
        // Footer's temporary tabindex is gone once focus moves on
        assert!(!doc.has_attribute(landmarks[2], "tabindex"));
    }

    #[test]
    fn test_shift_f6_starts_from_end() {
        let (mut doc, landmarks, targets) = landmark_page();
        let mut manager = KeyboardNavigationManager::new();

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).shift());
        assert_eq!(doc.active_element(), Some(landmarks[2]));
        assert_eq!(doc.attribute(landmarks[2], "tabindex"), Some("-1"));
        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).shift());
        assert_eq!(doc.active_element(), Some(targets[1]));
    }

    #[test]
    fn test_alt_f6_cycles_headings() {
        let (mut doc, _, targets) = landmark_page();
        let (h1, h2) = (targets[3], targets[4]);
        let mut manager = KeyboardNavigationManager::new();

        assert!(f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).alt()));
        assert_eq!(doc.active_element(), Some(h1));
        assert_eq!(doc.attribute(h1, "tabindex"), Some("-1"));

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).alt());
        assert_eq!(doc.active_element(), Some(h2));
        assert!(!doc.has_attribute(h1, "tabindex"));

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).alt().shift());
        assert_eq!(doc.active_element(), Some(h1));
    }

    #[test]
    fn test_heading_tabindex_overridden_then_restored() {
        let (mut doc, _, targets) = landmark_page();
        let (h1, h2) = (targets[3], targets[4]);
        doc.set_attribute(h1, "tabindex", "0").unwrap();
        let mut manager = KeyboardNavigationManager::new();

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).alt());
        assert_eq!(doc.active_element(), Some(h1));
        assert_eq!(doc.attribute(h1, "tabindex"), Some("-1"));

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6).alt());
        assert_eq!(doc.active_element(), Some(h2));
        assert_eq!(doc.attribute(h1, "tabindex"), Some("0"));
        assert_eq!(doc.attribute(h2, "tabindex"), Some("-1"));

        manager.destroy(&mut doc);
        assert!(!doc.has_attribute(h2, "tabindex"));
    }

    #[test]
    fn test_no_landmarks() {
        let mut doc = Document::new();
        let mut manager = KeyboardNavigationManager::new();
        let mut event = KeyboardEvent::new(keys::F6);
        assert!(!manager.handle_keydown(&mut doc, &mut event));
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_landmark_navigation_disabled() {
        let (mut doc, _, _) = landmark_page();
        let config = Config {
            landmark_navigation: false,
            ..Default::default()
        };
        let mut manager = KeyboardNavigationManager::with_config(config);
        let mut event = KeyboardEvent::new(keys::F6);
        assert!(!manager.handle_keydown(&mut doc, &mut event));
        assert!(!event.is_default_prevented());
    }

    fn dialogs() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let main = doc.append_element(body, "main", &[]);
        doc.append_element(main, "button", &[]);
        let first = doc.append_element(body, "div", &[("role", "dialog")]);
        doc.append_element(first, "button", &[]);
        let second = doc.append_element(body, "div", &[("role", "alertdialog")]);
        doc.append_element(second, "button", &[]);
        (doc, main, first, second)
    }

    #[test]
    fn test_nested_traps_release_in_order() {
        let (mut doc, main, first, second) = dialogs();
        let mut manager = KeyboardNavigationManager::new();

        let outer = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        assert_eq!(doc.attribute(second, "aria-hidden"), Some("true"));

        let inner = manager.trap_focus(&mut doc, second, FocusTrapOptions::default()).unwrap();
        assert_eq!(manager.active_traps(), &[first, second]);
        assert!(!doc.has_attribute(second, "aria-hidden"));
        assert_eq!(doc.attribute(first, "aria-hidden"), Some("true"));
        assert_eq!(doc.attribute(main, "aria-hidden"), Some("true"));

        assert!(manager.release_trap(&mut doc, inner));
        assert!(!doc.has_attribute(first, "aria-hidden"));
        assert_eq!(doc.attribute(second, "aria-hidden"), Some("true"));
        assert_eq!(doc.attribute(main, "aria-hidden"), Some("true"));

        assert!(manager.release_trap(&mut doc, outer));
        for node in [main, first, second] {
            assert!(!doc.has_attribute(node, "aria-hidden"));
            assert!(!doc.has_attribute(node, HIDDEN_MARKER));
        }
    }

    #[test]
    fn test_releasing_bottom_trap_keeps_top_isolated() {
        let (mut doc, main, first, second) = dialogs();
        let mut manager = KeyboardNavigationManager::new();

        let outer = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        let inner = manager.trap_focus(&mut doc, second, FocusTrapOptions::default()).unwrap();

        assert!(manager.release_trap(&mut doc, outer));
        assert_eq!(manager.active_traps(), &[second]);
        assert_eq!(doc.attribute(main, "aria-hidden"), Some("true"));
        assert_eq!(doc.attribute(first, "aria-hidden"), Some("true"));
        assert!(!doc.has_attribute(second, "aria-hidden"));

        assert!(manager.release_trap(&mut doc, inner));
        for node in [main, first, second] {
            assert!(!doc.has_attribute(node, "aria-hidden"));
            assert!(!doc.has_attribute(node, HIDDEN_MARKER));
        }
        assert!(!manager.release_trap(&mut doc, inner));
    }

    #[test]
    fn test_releasing_bottom_trap_keeps_focus_in_top() {
        let (mut doc, main, first, second) = dialogs();
        let opener = doc.element_children(main)[0];
        doc.focus(opener, Default::default()).unwrap();
        let mut manager = KeyboardNavigationManager::new();

        let outer = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        let inner = manager.trap_focus(&mut doc, second, FocusTrapOptions::default()).unwrap();
        let inside = doc.active_element();
        assert!(inside.is_some_and(|a| doc.contains(second, a)));

        assert!(manager.release_trap(&mut doc, outer));
        assert_eq!(doc.active_element(), inside);
        assert_eq!(manager.top_trap().and_then(FocusTrap::previous_active), Some(opener));

        assert!(manager.release_trap(&mut doc, inner));
        assert_eq!(doc.active_element(), Some(opener));
    }

    #[test]
    fn test_standalone_trap_isolation_survives_manager_release() {
        let (mut doc, main, first, second) = dialogs();
        let mut standalone = FocusTrap::new(first, FocusTrapOptions::default());
        assert!(standalone.activate(&mut doc));

        let mut manager = KeyboardNavigationManager::new();
        let handle = manager.trap_focus(&mut doc, second, FocusTrapOptions::default()).unwrap();
        assert!(!doc.has_attribute(second, "aria-hidden"));
        assert!(manager.release_trap(&mut doc, handle));

        assert!(standalone.is_active());
        assert_eq!(doc.attribute(main, "aria-hidden"), Some("true"));
        assert_eq!(doc.attribute(main, HIDDEN_MARKER), Some(standalone.token()));
        assert_eq!(doc.attribute(second, HIDDEN_MARKER), Some(standalone.token()));
        assert!(!doc.has_attribute(first, "aria-hidden"));

        manager.destroy(&mut doc);
        assert_eq!(doc.attribute(main, HIDDEN_MARKER), Some(standalone.token()));

        assert!(standalone.deactivate(&mut doc));
        for node in [main, first, second] {
            assert!(!doc.has_attribute(node, "aria-hidden"));
            assert!(!doc.has_attribute(node, HIDDEN_MARKER));
        }
    }

    #[test]
    fn test_escape_through_manager_pops_trap() {
        let (mut doc, main, first, _) = dialogs();
        let mut manager = KeyboardNavigationManager::new();
        let _ = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();

        let mut esc = KeyboardEvent::new(keys::ESCAPE);
        assert!(manager.handle_keydown(&mut doc, &mut esc));
        assert!(manager.active_traps().is_empty());
        assert!(!doc.has_attribute(main, "aria-hidden"));
    }

    #[test]
    fn test_trap_replaced_on_same_container() {
        let (mut doc, _, first, _) = dialogs();
        let mut manager = KeyboardNavigationManager::new();
        let _ = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        let _ = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        assert_eq!(manager.active_traps(), &[first]);
    }

    #[test]
    fn test_f6_scoped_to_trap() {
        let (mut doc, landmarks, _) = landmark_page();
        let body = doc.body();
        let dialog = doc.append_element(body, "div", &[("role", "dialog")]);
        let region = doc.append_element(dialog, "section", &[("aria-label", "Details")]);
        let inside = doc.append_element(region, "button", &[]);

        let mut manager = KeyboardNavigationManager::new();
        let _ = manager.trap_focus(&mut doc, dialog, FocusTrapOptions::default()).unwrap();
        assert_eq!(manager.landmarks(&doc), vec![region]);
        assert!(!manager.landmarks(&doc).contains(&landmarks[0]));

        f6(&mut manager, &mut doc, KeyboardEvent::new(keys::F6));
        assert_eq!(doc.active_element(), Some(inside));
    }

    #[test]
    fn test_with_trap_releases() {
        let (mut doc, main, first, _) = dialogs();
        let mut manager = KeyboardNavigationManager::new();
        let seen = manager.with_trap(&mut doc, first, FocusTrapOptions::default(), |m, d| {
            (m.active_traps().to_vec(), d.attribute(main, "aria-hidden").map(str::to_string))
        });
        assert_eq!(seen, Some((vec![first], Some("true".to_string()))));
        assert!(manager.active_traps().is_empty());
        assert!(!doc.has_attribute(main, "aria-hidden"));
    }

    #[test]
    fn test_roving_routing_by_target() {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.append_element(body, "div", &[("role", "tablist")]);
        let tabs: Vec<_> = (0..3)
            .map(|_| doc.append_element(list, "button", &[("role", "tab")]))
            .collect();
        let outside = doc.append_element(body, "button", &[]);

        let mut manager = KeyboardNavigationManager::new();
        manager
            .create_roving_tabindex(&mut doc, list, RovingOptions::default().orientation(Orientation::Horizontal))
            .unwrap();

        let mut event = KeyboardEvent::new(keys::ARROW_RIGHT).with_target(tabs[0]);
        assert!(manager.handle_keydown(&mut doc, &mut event));
        assert_eq!(doc.active_element(), Some(tabs[1]));

        let mut event = KeyboardEvent::new(keys::ARROW_RIGHT).with_target(outside);
        assert!(!manager.handle_keydown(&mut doc, &mut event));

        assert!(manager.handle_focus_in(&mut doc, &FocusEvent::focus_in(tabs[2], Some(tabs[1]))));
        assert_eq!(manager.roving(list).map(|r| r.current_index()), Some(2));
    }

    #[test]
    fn test_deferred_focus_on_animation_frame() {
        let (mut doc, _, first, _) = dialogs();
        let mut manager = KeyboardNavigationManager::new();
        let options = FocusTrapOptions {
            defer_initial_focus: true,
            ..Default::default()
        };
        let _ = manager.trap_focus(&mut doc, first, options).unwrap();
        assert_eq!(doc.active_element(), None);
        assert!(manager.on_animation_frame(&mut doc));
        assert!(doc.active_element().is_some_and(|a| doc.contains(first, a)));
        assert!(!manager.on_animation_frame(&mut doc));
    }

    #[test]
    fn test_deferred_focus_dropped_under_new_trap() {
        let (mut doc, _, first, second) = dialogs();
        let mut manager = KeyboardNavigationManager::new();
        let deferred = FocusTrapOptions {
            defer_initial_focus: true,
            ..Default::default()
        };
        let _ = manager.trap_focus(&mut doc, first, deferred).unwrap();
        let _ = manager.trap_focus(&mut doc, second, FocusTrapOptions::default()).unwrap();
        let inside = doc.active_element();
        assert!(inside.is_some_and(|a| doc.contains(second, a)));
        assert!(!manager.trap(first).is_some_and(FocusTrap::has_pending_focus));

        assert!(!manager.on_animation_frame(&mut doc));
        assert_eq!(doc.active_element(), inside);
    }

    #[test]
    fn test_options_seeded_from_config() {
        let config = Config {
            click_outside_deactivates: true,
            orientation: Some(Orientation::Vertical),
            wrap: false,
            ..Default::default()
        };
        let manager = KeyboardNavigationManager::with_config(config);
        assert!(manager.trap_options().click_outside_deactivates);
        assert_eq!(manager.roving_options().orientation, Some(Orientation::Vertical));
        assert!(!manager.roving_options().wrap);
    }

    #[test]
    fn test_destroy_cleans_up() {
        let (mut doc, main, first, _) = dialogs();
        let body = doc.body();
        let list = doc.append_element(body, "div", &[]);
        let option = doc.append_element(list, "div", &[("role", "option")]);
        let mut manager = KeyboardNavigationManager::new();

        let _ = manager.trap_focus(&mut doc, first, FocusTrapOptions::default()).unwrap();
        manager.create_roving_tabindex(&mut doc, list, RovingOptions::default()).unwrap();
        manager.focus_manager_mut().save_focus(&doc, Some(main));

        manager.destroy(&mut doc);
        assert!(manager.active_traps().is_empty());
        assert!(!doc.has_attribute(main, "aria-hidden"));
        assert!(!doc.has_attribute(option, "tabindex"));
        assert_eq!(manager.focus_manager().history_len(), 0);
    }
}
