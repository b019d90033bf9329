//! Focus Trap
//!
//! Confines Tab / Shift+Tab to one container (plus optional additional
//! containers) and hides the rest of the page from assistive technology
//! while active.
//!
//! # Sibling isolation
//!
//! On activation every `<body>` child that neither is nor contains a trap
//! container gets `aria-hidden="true"` and a private
//! `data-focus-trap-hidden="<token>"` marker. Release only touches nodes
//! that still carry this trap's token, so externally applied
//! `aria-hidden` is never cleared. A body child that holds this trap but
//! was hidden by another trap is revealed for the lifetime of this trap and
//! hidden again on release.

use keynav_dom::{keys, DomAccess, KeyboardEvent, NodeId, PointerEvent, SelectorList};

use crate::focus::FocusManager;
use crate::A11yError;

/// Marker attribute written next to `aria-hidden` on isolated siblings
pub const HIDDEN_MARKER: &str = "data-focus-trap-hidden";

/// Focus target given as a selector or a concrete element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    Selector(String),
    Element(NodeId),
}

impl From<NodeId> for FocusTarget {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl From<&str> for FocusTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

/// Focus trap options
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTrapOptions {
    /// Move focus into the trap on activation
    pub auto_focus: bool,
    /// Return focus to the previously active element on release
    pub restore_focus: bool,
    /// Pass `preventScroll` when focusing
    pub prevent_scroll: bool,
    /// Preferred initial target, looked up inside the container
    pub initial_focus: Option<FocusTarget>,
    /// Target used when the container has nothing focusable, looked up
    /// document-wide
    pub fallback_focus: Option<FocusTarget>,
    /// Extra containers that belong to the trap
    pub additional_elements: Vec<FocusTarget>,
    /// Escape releases the trap
    pub escape_deactivates: bool,
    /// Pointer down outside every container releases the trap
    pub click_outside_deactivates: bool,
    /// Hold the initial focus until [`FocusTrap::flush_pending_focus`]
    /// (the next animation frame)
    pub defer_initial_focus: bool,
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self {
            auto_focus: true,
            restore_focus: true,
            prevent_scroll: true,
            initial_focus: None,
            fallback_focus: None,
            additional_elements: Vec::new(),
            escape_deactivates: true,
            click_outside_deactivates: false,
            defer_initial_focus: false,
        }
    }
}

impl FocusTrapOptions {
    pub fn initial_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.initial_focus = Some(target.into());
        self
    }

    pub fn fallback_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.fallback_focus = Some(target.into());
        self
    }

    pub fn additional_element(mut self, target: impl Into<FocusTarget>) -> Self {
        self.additional_elements.push(target.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FocusTrapState {
    first: Option<NodeId>,
    last: Option<NodeId>,
    previous_active: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct HiddenSibling {
    node: NodeId,
    previous_aria_hidden: Option<String>,
}

#[derive(Debug, Clone)]
struct RevealedSibling {
    node: NodeId,
    owner_token: String,
}

/// Focus trap for modals, drawers and popovers
#[derive(Debug)]
pub struct FocusTrap {
    container: NodeId,
    token: String,
    options: FocusTrapOptions,
    focus: FocusManager,
    state: Option<FocusTrapState>,
    hidden: Vec<HiddenSibling>,
    revealed: Vec<RevealedSibling>,
    pending_focus: Option<NodeId>,
}

impl FocusTrap {
    pub fn new(container: NodeId, options: FocusTrapOptions) -> Self {
        let mut focus = FocusManager::with_capacity(0);
        focus.set_prevent_scroll(options.prevent_scroll);
        Self {
            container,
            token: format!("trap-{}", container.index()),
            options,
            focus,
            state: None,
            hidden: Vec::new(),
            revealed: Vec::new(),
            pending_focus: None,
        }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Value written into [`HIDDEN_MARKER`] by this trap
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn options(&self) -> &FocusTrapOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// First focusable element as of the last activation or Tab press
    pub fn first(&self) -> Option<NodeId> {
        self.state.and_then(|s| s.first)
    }

    /// Last focusable element as of the last activation or Tab press
    pub fn last(&self) -> Option<NodeId> {
        self.state.and_then(|s| s.last)
    }

    /// Element that had focus when the trap was activated
    pub fn previous_active(&self) -> Option<NodeId> {
        self.state.and_then(|s| s.previous_active)
    }

    /// Nodes currently isolated by this trap
    pub fn hidden_siblings(&self) -> Vec<NodeId> {
        self.hidden.iter().map(|h| h.node).collect()
    }

    /// Container plus resolved additional containers, attached ones only
    pub fn containers<D: DomAccess + ?Sized>(&self, dom: &D) -> Vec<NodeId> {
        let mut containers = vec![self.container];
        let body = dom.body();
        for target in &self.options.additional_elements {
            let resolved = match target {
                FocusTarget::Element(node) => vec![*node],
                FocusTarget::Selector(selector) => match (body, SelectorList::parse(selector)) {
                    (Some(body), Ok(list)) => dom.query_selector_all(body, &list),
                    (_, Err(err)) => {
                        tracing::warn!("Ignoring additional trap element: {}", err);
                        Vec::new()
                    }
                    (None, _) => Vec::new(),
                },
            };
            for node in resolved {
                if dom.is_connected(node) && !containers.contains(&node) {
                    containers.push(node);
                }
            }
        }
        containers
    }

    /// Focusable elements across all containers, container order first
    pub fn focusable_elements<D: DomAccess + ?Sized>(&self, dom: &D) -> Vec<NodeId> {
        let containers = self.containers(dom);
        self.collect_focusable(dom, &containers)
    }

    fn collect_focusable<D: DomAccess + ?Sized>(&self, dom: &D, containers: &[NodeId]) -> Vec<NodeId> {
        let mut elements = Vec::new();
        for &container in containers {
            for node in self.focus.focusable_elements(dom, container) {
                if !elements.contains(&node) {
                    elements.push(node);
                }
            }
        }
        elements
    }

    fn within<D: DomAccess + ?Sized>(dom: &D, containers: &[NodeId], node: NodeId) -> bool {
        containers.iter().any(|&c| dom.contains(c, node))
    }

    fn resolve<D: DomAccess + ?Sized>(
        &self,
        dom: &D,
        target: &FocusTarget,
        scope: Option<NodeId>,
    ) -> Option<NodeId> {
        match target {
            FocusTarget::Element(node) => dom.is_connected(*node).then_some(*node),
            FocusTarget::Selector(selector) => match SelectorList::parse(selector) {
                Ok(list) => dom.query_selector(scope?, &list),
                Err(err) => {
                    tracing::warn!("Ignoring focus target: {}", err);
                    None
                }
            },
        }
    }

    /// Activate the trap
    ///
    /// Returns `true` when the trap is active afterwards. Failures are
    /// logged and leave the document untouched.
    pub fn activate<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        if self.is_active() {
            return true;
        }
        match self.try_activate(dom) {
            Ok(()) => {
                tracing::debug!(
                    "Focus trap {} active, {} sibling(s) hidden",
                    self.token,
                    self.hidden.len()
                );
                true
            }
            Err(err) => {
                tracing::warn!("Focus trap {} failed to activate: {}", self.token, err);
                self.release_isolation(dom, false);
                self.state = None;
                false
            }
        }
    }

    fn try_activate<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> Result<(), A11yError> {
        if !dom.is_connected(self.container) {
            return Err(A11yError::ContainerDetached(self.container));
        }

        let previous_active = dom.active_element();
        let containers = self.containers(dom);
        let focusable = self.collect_focusable(dom, &containers);
        self.state = Some(FocusTrapState {
            first: focusable.first().copied(),
            last: focusable.last().copied(),
            previous_active,
        });

        self.isolate(dom, &containers)?;

        if self.options.auto_focus {
            let target = self.initial_target(dom, &focusable);
            if self.options.defer_initial_focus {
                self.pending_focus = target;
            } else if let Some(target) = target {
                self.focus.focus(dom, target);
            }
        }
        Ok(())
    }

    fn initial_target<D: DomAccess + ?Sized>(&self, dom: &D, focusable: &[NodeId]) -> Option<NodeId> {
        if let Some(initial) = &self.options.initial_focus {
            if let Some(node) = self.resolve(dom, initial, Some(self.container)) {
                return Some(node);
            }
            tracing::debug!("Initial focus target not found, using first focusable");
        }
        if let Some(&first) = focusable.first() {
            return Some(first);
        }
        if dom.tab_index(self.container).is_some_and(|t| t >= 0) {
            return Some(self.container);
        }
        self.options
            .fallback_focus
            .as_ref()
            .and_then(|fallback| self.resolve(dom, fallback, dom.body()))
    }

    /// Apply an initial focus held back by `defer_initial_focus`
    pub fn flush_pending_focus<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        let Some(target) = self.pending_focus.take() else {
            return false;
        };
        if !self.is_active() || !dom.is_connected(target) {
            return false;
        }
        self.focus.focus(dom, target)
    }

    pub fn has_pending_focus(&self) -> bool {
        self.pending_focus.is_some()
    }

    /// Drop a deferred initial focus without applying it
    pub fn cancel_pending_focus(&mut self) -> bool {
        self.pending_focus.take().is_some()
    }

    /// Take over the element to restore on release
    pub(crate) fn set_previous_active(&mut self, node: Option<NodeId>) {
        if let Some(state) = self.state.as_mut() {
            state.previous_active = node;
        }
    }

    /// Stop re-hiding nodes revealed from the trap owning `token`
    ///
    /// Called once that trap has released, so no marker carrying its token
    /// is written again.
    pub(crate) fn forget_revealed_from(&mut self, token: &str) {
        self.revealed.retain(|r| r.owner_token != token);
    }

    fn isolate<D: DomAccess + ?Sized>(&mut self, dom: &mut D, containers: &[NodeId]) -> Result<(), A11yError> {
        let Some(body) = dom.body() else {
            return Ok(());
        };

        for child in dom.element_children(body) {
            if containers.iter().any(|&c| dom.contains(child, c)) {
                let owner = dom.attribute(child, HIDDEN_MARKER).map(str::to_string);
                if let Some(owner_token) = owner.filter(|t| *t != self.token) {
                    dom.remove_attribute(child, HIDDEN_MARKER)?;
                    dom.remove_attribute(child, "aria-hidden")?;
                    self.revealed.push(RevealedSibling {
                        node: child,
                        owner_token,
                    });
                }
                continue;
            }

            if dom.attribute(child, "aria-hidden") == Some("true") {
                continue;
            }
            let previous_aria_hidden = dom.attribute(child, "aria-hidden").map(str::to_string);
            dom.set_attribute(child, "aria-hidden", "true")?;
            dom.set_attribute(child, HIDDEN_MARKER, &self.token)?;
            self.hidden.push(HiddenSibling {
                node: child,
                previous_aria_hidden,
            });
        }
        Ok(())
    }

    /// Hide body children added since activation (or revealed by another
    /// trap's release). No-op when inactive.
    pub fn reisolate<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        if !self.is_active() {
            return false;
        }
        let containers = self.containers(dom);
        match self.isolate(dom, &containers) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Focus trap {} failed to re-isolate: {}", self.token, err);
                false
            }
        }
    }

    fn release_isolation<D: DomAccess + ?Sized>(&mut self, dom: &mut D, rehide_revealed: bool) {
        for hidden in self.hidden.drain(..) {
            if dom.attribute(hidden.node, HIDDEN_MARKER) != Some(self.token.as_str()) {
                continue;
            }
            let restored = match &hidden.previous_aria_hidden {
                Some(value) => dom.set_attribute(hidden.node, "aria-hidden", value),
                None => dom.remove_attribute(hidden.node, "aria-hidden").map(|_| ()),
            }
            .and_then(|_| dom.remove_attribute(hidden.node, HIDDEN_MARKER).map(|_| ()));
            if let Err(err) = restored {
                tracing::warn!("Could not un-hide {}: {}", hidden.node, err);
            }
        }

        for revealed in self.revealed.drain(..) {
            if !rehide_revealed || dom.has_attribute(revealed.node, HIDDEN_MARKER) {
                continue;
            }
            let rehidden = dom
                .set_attribute(revealed.node, "aria-hidden", "true")
                .and_then(|_| dom.set_attribute(revealed.node, HIDDEN_MARKER, &revealed.owner_token));
            if let Err(err) = rehidden {
                tracing::warn!("Could not re-hide {}: {}", revealed.node, err);
            }
        }
    }

    /// Release the trap, restoring focus if configured
    ///
    /// Returns `false` when the trap was not active.
    pub fn deactivate<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.release(dom, self.options.restore_focus)
    }

    /// Release the trap, restoring focus only when `restore_focus` is set
    pub(crate) fn release<D: DomAccess + ?Sized>(&mut self, dom: &mut D, restore_focus: bool) -> bool {
        let Some(state) = self.state.take() else {
            return false;
        };
        self.pending_focus = None;
        self.release_isolation(dom, true);

        if restore_focus {
            match state.previous_active {
                Some(previous) if dom.is_connected(previous) => {
                    self.focus.focus(dom, previous);
                }
                Some(previous) => {
                    tracing::debug!("Not restoring focus to detached {}", previous);
                }
                None => {}
            }
        }
        tracing::debug!("Focus trap {} released", self.token);
        true
    }

    /// Keydown handling: Tab wrapping and Escape release
    ///
    /// Returns `true` when the event was consumed by the trap.
    pub fn handle_keydown<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        if !self.is_active() {
            return false;
        }

        if event.key == keys::ESCAPE && self.options.escape_deactivates && !event.has_command_modifier() {
            event.prevent_default();
            self.deactivate(dom);
            return true;
        }
        if event.key != keys::TAB || event.has_command_modifier() {
            return false;
        }

        // The DOM may have changed since activation
        let containers = self.containers(dom);
        let focusable = self.collect_focusable(dom, &containers);
        let (first, last) = (focusable.first().copied(), focusable.last().copied());
        if let Some(state) = self.state.as_mut() {
            state.first = first;
            state.last = last;
        }

        let (Some(first), Some(last)) = (first, last) else {
            event.prevent_default();
            return true;
        };

        let active = dom.active_element();
        let escaping = match active {
            Some(node) => !Self::within(dom, &containers, node) || containers.contains(&node),
            None => true,
        };

        let target = if event.shift_key {
            (escaping || active == Some(first)).then_some(last)
        } else {
            (escaping || active == Some(last)).then_some(first)
        };

        match target {
            Some(target) => {
                event.prevent_default();
                self.focus.focus(dom, target);
                true
            }
            None => false,
        }
    }

    /// Pull focus back when it lands outside the trap by other means
    pub fn handle_focus_in<D: DomAccess + ?Sized>(&mut self, dom: &mut D, target: NodeId) -> bool {
        if !self.is_active() {
            return false;
        }
        let containers = self.containers(dom);
        if Self::within(dom, &containers, target) {
            return false;
        }
        let focusable = self.collect_focusable(dom, &containers);
        let fallback = dom.tab_index(self.container).is_some_and(|t| t >= 0).then_some(self.container);
        match focusable.first().copied().or(fallback) {
            Some(node) => {
                tracing::debug!("Focus escaped trap {} to {}, pulling back", self.token, target);
                self.focus.focus(dom, node)
            }
            None => false,
        }
    }

    /// Pointer-down handling for `click_outside_deactivates`
    ///
    /// Focus is left where the pointer put it.
    pub fn handle_pointer_down<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &PointerEvent) -> bool {
        if !self.is_active() || !self.options.click_outside_deactivates {
            return false;
        }
        let containers = self.containers(dom);
        if Self::within(dom, &containers, event.target) {
            return false;
        }
        self.release(dom, false)
    }
}
