//! Keyboard accessibility checks for single elements

use std::fmt;

use keynav_dom::{DomAccess, NodeId};

use crate::aria;
use crate::focus;

/// Problem found by [`validate_element`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Interactive element Tab can never reach
    Unreachable,
    /// Focusing the element changes nothing visible
    MissingFocusIndicator,
    /// Interactive element without a name for assistive technology
    MissingAccessibleName,
    /// `tabindex` above zero reorders the page's tab sequence
    PositiveTabindex(i32),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "interactive element is not keyboard reachable"),
            Self::MissingFocusIndicator => write!(f, "no visible focus indicator"),
            Self::MissingAccessibleName => write!(f, "interactive element has no accessible name"),
            Self::PositiveTabindex(value) => write!(f, "positive tabindex ({value}) overrides document order"),
        }
    }
}

/// Decides whether an element shows a visible focus indicator
pub trait FocusIndicatorProbe<D: DomAccess + ?Sized> {
    fn has_focus_indicator(&self, dom: &D, node: NodeId) -> bool;
}

/// Compares the element's base style with its `:focus` style
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleDiffProbe;

impl<D: DomAccess + ?Sized> FocusIndicatorProbe<D> for StyleDiffProbe {
    fn has_focus_indicator(&self, dom: &D, node: NodeId) -> bool {
        match (dom.computed_style(node), dom.focus_style(node)) {
            (Some(base), Some(focused)) => base.differs_visually(&focused),
            _ => false,
        }
    }
}

/// Native control, widget role, or click handler
pub fn is_interactive<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    if dom.has_attribute(node, "disabled") {
        return false;
    }
    let native = match dom.tag_name(node) {
        Some("a" | "area") => dom.has_attribute(node, "href"),
        Some("input") => dom.attribute(node, "type") != Some("hidden"),
        Some("button" | "select" | "textarea" | "summary") => true,
        _ => false,
    };
    native
        || aria::explicit_role(dom, node).is_some_and(|role| role.is_widget())
        || dom.has_attribute(node, "onclick")
}

fn is_unreachable<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    // Composite items are reached through their widget's roving tab stop
    let roving_item = aria::explicit_role(dom, node).is_some_and(|role| role.is_composite_item())
        && dom.tab_index(node).is_some_and(|t| t >= -1);
    if roving_item {
        return false;
    }
    !focus::is_focusable(dom, node) || dom.tab_index(node).is_some_and(|t| t < 0)
}

/// Name from ARIA attributes, text content, `alt`, or an associated `<label>`
pub fn has_accessible_name<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    if aria::has_explicit_name(dom, node) {
        return true;
    }
    if !dom.text_content(node).trim().is_empty() {
        return true;
    }
    if dom.attribute(node, "alt").is_some_and(|alt| !alt.trim().is_empty()) {
        return true;
    }
    if matches!(dom.tag_name(node), Some("input"))
        && matches!(dom.attribute(node, "type"), Some("submit" | "reset" | "button"))
        && dom.attribute(node, "value").is_some_and(|v| !v.trim().is_empty())
    {
        return true;
    }

    // Wrapping label
    let mut current = dom.parent(node);
    while let Some(id) = current {
        if dom.tag_name(id) == Some("label") {
            return true;
        }
        current = dom.parent(id);
    }

    // <label for="id">
    match (dom.attribute(node, "id"), dom.body()) {
        (Some(id), Some(body)) => dom
            .select(body, "label[for]")
            .unwrap_or_default()
            .into_iter()
            .any(|label| dom.attribute(label, "for") == Some(id)),
        _ => false,
    }
}

/// Run the keyboard accessibility checks on one element
///
/// The focus indicator check only runs when a probe is given and the
/// element is reachable.
pub fn validate_element<D: DomAccess + ?Sized>(
    dom: &D,
    node: NodeId,
    probe: Option<&dyn FocusIndicatorProbe<D>>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(value) = dom.tab_index(node).filter(|&t| t > 0) {
        issues.push(ValidationIssue::PositiveTabindex(value));
    }

    if !is_interactive(dom, node) || focus::is_hidden_by_style(dom, node) {
        return issues;
    }

    let unreachable = is_unreachable(dom, node);
    if unreachable {
        issues.push(ValidationIssue::Unreachable);
    }
    if !has_accessible_name(dom, node) {
        issues.push(ValidationIssue::MissingAccessibleName);
    }
    if let Some(probe) = probe {
        if !unreachable && !probe.has_focus_indicator(dom, node) {
            issues.push(ValidationIssue::MissingFocusIndicator);
        }
    }

    if !issues.is_empty() {
        tracing::debug!("{} failed {} keyboard check(s)", node, issues.len());
    }
    issues
}
