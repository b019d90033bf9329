//! Roving Tabindex
//!
//! One tab stop per composite widget (tab lists, listboxes, grids, menus).
//! The current item carries `tabindex="0"`, every other item
//! `tabindex="-1"`, and arrow keys move the stop.

use keynav_dom::{keys, DomAccess, KeyboardEvent, NodeId, SelectorList};
use serde::{Deserialize, Serialize};

use crate::focus::FocusManager;
use crate::A11yError;

/// Items picked up when no selector is configured
pub const DEFAULT_ITEM_SELECTOR: &str =
    r#"[role="tab"], [role="option"], [role="gridcell"], [role="menuitem"]"#;

/// Arrow keys a composite widget responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left / Right
    Horizontal,
    /// Up / Down
    Vertical,
    /// All four arrows
    #[default]
    Both,
}

impl Orientation {
    /// Parse an `aria-orientation` value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

/// Roving tabindex options
#[derive(Debug, Clone, PartialEq)]
pub struct RovingOptions {
    /// `None` reads `aria-orientation` from the container
    pub orientation: Option<Orientation>,
    /// Wrap around at either end instead of stopping
    pub wrap: bool,
    /// Item selector, [`DEFAULT_ITEM_SELECTOR`] when unset
    pub item_selector: Option<String>,
    pub initial_index: usize,
}

impl Default for RovingOptions {
    fn default() -> Self {
        Self {
            orientation: None,
            wrap: true,
            item_selector: None,
            initial_index: 0,
        }
    }
}

impl RovingOptions {
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn item_selector(mut self, selector: &str) -> Self {
        self.item_selector = Some(selector.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Next,
    Previous,
    First,
    Last,
}

/// Roving tabindex over the items of one container
#[derive(Debug)]
pub struct RovingTabindex {
    container: NodeId,
    options: RovingOptions,
    selector: SelectorList,
    orientation: Orientation,
    items: Vec<NodeId>,
    current_index: usize,
    focus: FocusManager,
}

impl RovingTabindex {
    /// Create an uninitialized roving set; fails on a bad item selector
    pub fn new(container: NodeId, options: RovingOptions) -> Result<Self, A11yError> {
        let selector = SelectorList::parse(options.item_selector.as_deref().unwrap_or(DEFAULT_ITEM_SELECTOR))?;
        Ok(Self {
            container,
            orientation: options.orientation.unwrap_or_default(),
            current_index: options.initial_index,
            options,
            selector,
            items: Vec::new(),
            focus: FocusManager::with_capacity(0),
        })
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn options(&self) -> &RovingOptions {
        &self.options
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> Option<NodeId> {
        self.items.get(self.current_index).copied()
    }

    /// Query the items and hand out the single tab stop
    pub fn initialize<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> Result<(), A11yError> {
        if !dom.is_connected(self.container) {
            return Err(A11yError::ContainerDetached(self.container));
        }

        if self.options.orientation.is_none() {
            self.orientation = dom
                .attribute(self.container, "aria-orientation")
                .and_then(Orientation::parse)
                .unwrap_or_default();
        }

        self.items = dom.query_selector_all(self.container, &self.selector);
        self.current_index = self.clamp(self.options.initial_index);
        self.apply_tabindex(dom)?;

        tracing::debug!(
            "Roving tabindex on {}: {} item(s), {:?}",
            self.container,
            self.items.len(),
            self.orientation
        );
        Ok(())
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.items.len().saturating_sub(1))
    }

    fn apply_tabindex<D: DomAccess + ?Sized>(&self, dom: &mut D) -> Result<(), A11yError> {
        for (i, &item) in self.items.iter().enumerate() {
            let value = if i == self.current_index { "0" } else { "-1" };
            dom.set_attribute(item, "tabindex", value)?;
        }
        Ok(())
    }

    fn target(&self, step: Move) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let last = len - 1;
        Some(match step {
            Move::First => 0,
            Move::Last => last,
            Move::Next if self.current_index < last => self.current_index + 1,
            Move::Next if self.options.wrap => 0,
            Move::Next => last,
            Move::Previous if self.current_index > 0 => self.current_index - 1,
            Move::Previous if self.options.wrap => last,
            Move::Previous => 0,
        })
    }

    fn go<D: DomAccess + ?Sized>(&mut self, dom: &mut D, step: Move) -> bool {
        match self.target(step) {
            Some(index) => self.set_current(dom, index),
            None => false,
        }
    }

    pub fn move_next<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.go(dom, Move::Next)
    }

    pub fn move_previous<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.go(dom, Move::Previous)
    }

    pub fn move_first<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.go(dom, Move::First)
    }

    pub fn move_last<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.go(dom, Move::Last)
    }

    /// Make `index` the tab stop and focus it
    pub fn set_current<D: DomAccess + ?Sized>(&mut self, dom: &mut D, index: usize) -> bool {
        let Some(&item) = self.items.get(index) else {
            return false;
        };
        self.current_index = index;
        if let Err(err) = self.apply_tabindex(dom) {
            tracing::warn!("Roving tabindex update failed: {}", err);
            return false;
        }
        self.focus.focus(dom, item);
        true
    }

    /// Arrow / Home / End handling
    ///
    /// Returns `true` (and prevents default) when the key moved the stop.
    pub fn handle_keydown<D: DomAccess + ?Sized>(&mut self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        if self.items.is_empty() || event.has_command_modifier() {
            return false;
        }
        let step = match event.key.as_str() {
            keys::ARROW_RIGHT if self.orientation.is_horizontal() => Move::Next,
            keys::ARROW_LEFT if self.orientation.is_horizontal() => Move::Previous,
            keys::ARROW_DOWN if self.orientation.is_vertical() => Move::Next,
            keys::ARROW_UP if self.orientation.is_vertical() => Move::Previous,
            keys::HOME => Move::First,
            keys::END => Move::Last,
            _ => return false,
        };
        event.prevent_default();
        self.go(dom, step)
    }

    /// Follow focus that landed on (or inside) an item by other means
    pub fn handle_focus_in<D: DomAccess + ?Sized>(&mut self, dom: &mut D, target: NodeId) -> bool {
        let Some(index) = self.items.iter().position(|&item| dom.contains(item, target)) else {
            return false;
        };
        if index == self.current_index {
            return true;
        }
        self.current_index = index;
        match self.apply_tabindex(dom) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Roving tabindex update failed: {}", err);
                false
            }
        }
    }

    /// Re-query items after the container's children changed
    ///
    /// The current item keeps the tab stop if it is still present.
    pub fn refresh<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> Result<(), A11yError> {
        let current = self.current_item();
        let items = dom.query_selector_all(self.container, &self.selector);

        for &stale in self.items.iter().filter(|item| !items.contains(item)) {
            if dom.tag_name(stale).is_some() {
                dom.remove_attribute(stale, "tabindex")?;
            }
        }

        self.items = items;
        self.current_index = match current.and_then(|c| self.items.iter().position(|&i| i == c)) {
            Some(index) => index,
            None => self.clamp(self.current_index),
        };
        self.apply_tabindex(dom)
    }

    /// Strip `tabindex` from every item and forget them
    pub fn destroy<D: DomAccess + ?Sized>(&mut self, dom: &mut D) {
        for item in self.items.drain(..) {
            if let Err(err) = dom.remove_attribute(item, "tabindex") {
                tracing::debug!("Could not clear tabindex on {}: {}", item, err);
            }
        }
        self.current_index = 0;
        tracing::debug!("Roving tabindex on {} destroyed", self.container);
    }
}
