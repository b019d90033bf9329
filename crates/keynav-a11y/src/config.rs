//! Navigation Configuration

use serde::{Deserialize, Serialize};

use crate::focus::DEFAULT_HISTORY_CAPACITY;
use crate::roving::{Orientation, RovingOptions};
use crate::shortcuts::Platform;
use crate::trap::FocusTrapOptions;
use crate::A11yError;

/// Keyboard navigation configuration
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Focus history depth
    pub history_capacity: usize,

    /// F6 / Shift+F6 cycles landmarks
    pub landmark_navigation: bool,

    /// Alt+F6 / Alt+Shift+F6 cycles headings
    pub heading_navigation: bool,

    // Focus trap defaults
    pub auto_focus: bool,
    pub restore_focus: bool,
    pub prevent_scroll: bool,
    pub escape_deactivates: bool,
    pub click_outside_deactivates: bool,
    pub defer_initial_focus: bool,

    // Roving tabindex defaults
    /// `None` reads `aria-orientation` from each container
    pub orientation: Option<Orientation>,
    pub wrap: bool,

    /// Platform used for `Mod` and shortcut labels; detected when unset
    pub platform: Option<Platform>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            landmark_navigation: true,
            heading_navigation: true,
            auto_focus: true,
            restore_focus: true,
            prevent_scroll: true,
            escape_deactivates: true,
            click_outside_deactivates: false,
            defer_initial_focus: false,
            orientation: None,
            wrap: true,
            platform: None,
        }
    }
}

impl Config {
    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, A11yError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, A11yError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Focus trap options seeded from this configuration
    pub fn trap_options(&self) -> FocusTrapOptions {
        FocusTrapOptions {
            auto_focus: self.auto_focus,
            restore_focus: self.restore_focus,
            prevent_scroll: self.prevent_scroll,
            escape_deactivates: self.escape_deactivates,
            click_outside_deactivates: self.click_outside_deactivates,
            defer_initial_focus: self.defer_initial_focus,
            ..Default::default()
        }
    }

    /// Roving tabindex options seeded from this configuration
    pub fn roving_options(&self) -> RovingOptions {
        RovingOptions {
            orientation: self.orientation,
            wrap: self.wrap,
            ..Default::default()
        }
    }

    /// Configured platform, or the one this build targets
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}
