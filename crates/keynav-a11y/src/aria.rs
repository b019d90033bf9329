//! ARIA Support
//!
//! Role resolution for landmark, heading and composite-widget queries.

use keynav_dom::{DomAccess, NodeId};

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    // Landmark roles
    Banner,
    Complementary,
    ContentInfo,
    Form,
    Main,
    Navigation,
    Region,
    Search,

    // Widget roles
    Button,
    Checkbox,
    Combobox,
    GridCell,
    Link,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    Option,
    Radio,
    Scrollbar,
    SearchBox,
    Slider,
    SpinButton,
    Switch,
    Tab,
    TextBox,
    TreeItem,

    // Composite containers
    Grid,
    Listbox,
    Menu,
    MenuBar,
    RadioGroup,
    TabList,
    Tree,

    // Document structure
    Dialog,
    AlertDialog,
    Heading,
    None,
    Presentation,
    Generic,
}

impl AriaRole {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "banner" => Self::Banner,
            "complementary" => Self::Complementary,
            "contentinfo" => Self::ContentInfo,
            "form" => Self::Form,
            "main" => Self::Main,
            "navigation" => Self::Navigation,
            "region" => Self::Region,
            "search" => Self::Search,
            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "combobox" => Self::Combobox,
            "gridcell" => Self::GridCell,
            "link" => Self::Link,
            "menuitem" => Self::MenuItem,
            "menuitemcheckbox" => Self::MenuItemCheckbox,
            "menuitemradio" => Self::MenuItemRadio,
            "option" => Self::Option,
            "radio" => Self::Radio,
            "scrollbar" => Self::Scrollbar,
            "searchbox" => Self::SearchBox,
            "slider" => Self::Slider,
            "spinbutton" => Self::SpinButton,
            "switch" => Self::Switch,
            "tab" => Self::Tab,
            "textbox" => Self::TextBox,
            "treeitem" => Self::TreeItem,
            "grid" => Self::Grid,
            "listbox" => Self::Listbox,
            "menu" => Self::Menu,
            "menubar" => Self::MenuBar,
            "radiogroup" => Self::RadioGroup,
            "tablist" => Self::TabList,
            "tree" => Self::Tree,
            "dialog" => Self::Dialog,
            "alertdialog" => Self::AlertDialog,
            "heading" => Self::Heading,
            "none" => Self::None,
            "presentation" => Self::Presentation,
            "generic" => Self::Generic,
            _ => return None,
        })
    }

    pub fn is_landmark(&self) -> bool {
        matches!(
            self,
            Self::Banner
                | Self::Complementary
                | Self::ContentInfo
                | Self::Form
                | Self::Main
                | Self::Navigation
                | Self::Region
                | Self::Search
        )
    }

    /// Roles a user is expected to operate with the keyboard
    pub fn is_widget(&self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Checkbox
                | Self::Combobox
                | Self::Link
                | Self::Radio
                | Self::Scrollbar
                | Self::SearchBox
                | Self::Slider
                | Self::SpinButton
                | Self::Switch
                | Self::TextBox
        ) || self.is_composite_item()
    }

    /// Items managed by a roving tabindex inside a composite widget
    pub fn is_composite_item(&self) -> bool {
        matches!(
            self,
            Self::Tab
                | Self::Option
                | Self::GridCell
                | Self::MenuItem
                | Self::MenuItemCheckbox
                | Self::MenuItemRadio
                | Self::TreeItem
        )
    }
}

/// Explicit role: first recognised token of the `role` attribute
pub fn explicit_role<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> Option<AriaRole> {
    dom.attribute(node, "role")?
        .split_ascii_whitespace()
        .find_map(AriaRole::parse)
}

/// Accessible name from `aria-label`, `aria-labelledby` or `title`
///
/// `aria-labelledby` is only checked for presence; resolving the
/// referenced elements is left to the host.
pub fn has_explicit_name<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|attr| dom.attribute(node, attr).is_some_and(|v| !v.trim().is_empty()))
}

/// Landmark region: explicit landmark role, or a sectioning tag
pub fn is_landmark<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    if let Some(role) = explicit_role(dom, node) {
        return role.is_landmark();
    }
    match dom.tag_name(node) {
        Some("main" | "nav" | "header" | "footer" | "aside") => true,
        Some("section") => has_explicit_name(dom, node),
        _ => false,
    }
}

/// `h1`-`h6` or `role="heading"`
pub fn is_heading<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    if explicit_role(dom, node) == Some(AriaRole::Heading) {
        return true;
    }
    matches!(
        dom.tag_name(node),
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    )
}
