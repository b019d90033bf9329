//! DOM Events
//!
//! Keyboard, focus and pointer events routed into the navigation core.

use crate::NodeId;

/// `KeyboardEvent.key` values used by the navigation core
pub mod keys {
    pub const TAB: &str = "Tab";
    pub const ESCAPE: &str = "Escape";
    pub const ENTER: &str = "Enter";
    pub const SPACE: &str = " ";
    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";
    pub const ARROW_UP: &str = "ArrowUp";
    pub const ARROW_DOWN: &str = "ArrowDown";
    pub const HOME: &str = "Home";
    pub const END: &str = "End";
    pub const F6: &str = "F6";

    /// Keys that are modifiers themselves
    pub const MODIFIERS: [&str; 6] = ["Control", "Alt", "Shift", "Meta", "AltGraph", "OS"];
}

/// `keydown` event
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardEvent {
    /// `KeyboardEvent.key`
    pub key: String,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub meta_key: bool,
    /// Auto-repeat from a held key
    pub repeat: bool,
    /// Element the event was dispatched at (usually the active element)
    pub target: Option<NodeId>,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyboardEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl_key: false,
            alt_key: false,
            shift_key: false,
            meta_key: false,
            repeat: false,
            target: None,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Any of Ctrl, Alt or Meta held
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl_key || self.alt_key || self.meta_key
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// `focusin` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    /// Element receiving focus
    pub target: NodeId,
    /// Element losing focus
    pub related_target: Option<NodeId>,
}

impl FocusEvent {
    pub fn focus_in(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self {
            target,
            related_target,
        }
    }
}

/// `pointerdown` event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub target: NodeId,
    pub x: f64,
    pub y: f64,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn down(target: NodeId) -> Self {
        Self {
            target,
            x: 0.0,
            y: 0.0,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_event_builder() {
        let event = KeyboardEvent::new("s").ctrl().shift();
        assert!(event.ctrl_key && event.shift_key);
        assert!(!event.alt_key && !event.meta_key);
        assert!(event.has_command_modifier());
    }

    #[test]
    fn test_prevent_default_respects_cancelable() {
        let mut event = KeyboardEvent::new(keys::TAB);
        event.prevent_default();
        assert!(event.is_default_prevented());

        let mut event = KeyboardEvent::new(keys::TAB);
        event.cancelable = false;
        event.prevent_default();
        assert!(!event.is_default_prevented());
    }
}
