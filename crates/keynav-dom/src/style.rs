//! Computed style
//!
//! The handful of computed properties the navigation core inspects.

/// `display` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
}

/// `visibility` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// Computed style snapshot for one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    /// Outline width in CSS pixels
    pub outline_width: f32,
    pub box_shadow: Option<String>,
    pub background_color: Option<String>,
}

impl ComputedStyle {
    pub fn hidden() -> Self {
        Self {
            display: Display::None,
            ..Self::default()
        }
    }

    pub fn invisible() -> Self {
        Self {
            visibility: Visibility::Hidden,
            ..Self::default()
        }
    }

    /// Element generates no box (`display: none`)
    #[inline]
    pub fn is_display_none(&self) -> bool {
        self.display == Display::None
    }

    /// Element is not painted (`visibility: hidden | collapse`)
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.visibility != Visibility::Visible
    }

    /// True if any property that draws a focus ring differs from `other`
    pub fn differs_visually(&self, other: &ComputedStyle) -> bool {
        self.outline_width != other.outline_width
            || self.box_shadow != other.box_shadow
            || self.background_color != other.background_color
    }
}
