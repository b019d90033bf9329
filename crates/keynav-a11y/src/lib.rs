//! keynav Accessibility - Keyboard Navigation & Focus Management
//!
//! Keyboard access for dynamic interfaces built on a
//! [`DomAccess`](keynav_dom::DomAccess) document.
//!
//! Features:
//! - Focusable-element discovery and bounded focus history
//! - Focus traps with sibling isolation for modals and drawers
//! - Roving tabindex for composite widgets
//! - F6 landmark and Alt+F6 heading navigation
//! - Chorded keyboard shortcuts with per-platform modifiers
//! - Element-level keyboard accessibility checks

pub mod aria;
pub mod config;
pub mod focus;
pub mod navigation;
pub mod roving;
pub mod shortcuts;
pub mod trap;
pub mod validate;

pub use aria::AriaRole;
pub use config::Config;
pub use focus::{FocusHistory, FocusManager, is_focusable};
pub use navigation::{KeyboardNavigationManager, RovingHandle, TrapHandle};
pub use roving::{Orientation, RovingOptions, RovingTabindex};
pub use shortcuts::{
    Chord, KeyboardShortcutsManager, Modifier, Platform, Shortcut, ShortcutInfo, ShortcutRegistration,
};
pub use trap::{FocusTarget, FocusTrap, FocusTrapOptions};
pub use validate::{FocusIndicatorProbe, StyleDiffProbe, ValidationIssue, validate_element};

use keynav_dom::{DomError, NodeId};

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("Container {0} is not attached to the document")]
    ContainerDetached(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Shortcut '{0}' is already registered")]
    DuplicateShortcut(String),

    #[error("Invalid key chord: {0}")]
    InvalidChord(String),

    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
