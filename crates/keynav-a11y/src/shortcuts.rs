//! Keyboard Shortcuts
//!
//! Chorded application shortcuts dispatched from one keydown entry point.
//!
//! Chords are written as key lists (`["Ctrl", "s"]`) or strings
//! (`"Ctrl+Shift+K"`). Modifier aliases are normalized per platform, so
//! `Mod+K` means Cmd+K on macOS and Ctrl+K elsewhere.
//!
//! Matching is exact, with one allowance: a punctuation key that needs
//! Shift to type (`?`, `!`, `+`) also matches a registration without
//! Shift, since the event's key already reflects it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use keynav_dom::{keys, DomAccess, KeyboardEvent, NodeId};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::A11yError;

/// Category used when a shortcut doesn't name one
pub const DEFAULT_CATEGORY: &str = "General";

/// Modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    /// Resolve a modifier name or alias
    pub fn parse(name: &str, platform: Platform) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Self::Ctrl,
            "alt" | "option" | "opt" => Self::Alt,
            "shift" => Self::Shift,
            "meta" | "cmd" | "command" | "super" | "win" => Self::Meta,
            "mod" if platform == Platform::MacOs => Self::Meta,
            "mod" => Self::Ctrl,
            _ => return None,
        })
    }
}

/// Host platform, decides `Mod` and how chords are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    /// Platform this crate was built for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Modifier set plus normalized key, matched exactly
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Chord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl Chord {
    /// Build from a key list such as `["Ctrl", "Shift", "k"]`
    pub fn from_keys<S: AsRef<str>>(parts: &[S], platform: Platform) -> Result<Self, A11yError> {
        let display = parts.iter().map(|p| p.as_ref()).collect::<Vec<&str>>().join("+");
        let mut chord = Chord::default();

        for part in parts {
            let part = part.as_ref();
            match Modifier::parse(part, platform) {
                Some(modifier) => chord.set(modifier),
                None if chord.key.is_empty() => chord.key = normalize_key(part),
                None => return Err(A11yError::InvalidChord(display)),
            }
        }

        if chord.key.is_empty() {
            return Err(A11yError::InvalidChord(display));
        }
        Ok(chord)
    }

    /// Parse `"Ctrl+Shift+K"`; `"Ctrl++"` binds the plus key
    pub fn parse(s: &str, platform: Platform) -> Result<Self, A11yError> {
        let s = s.trim();
        let mut parts: Vec<&str> = match s.strip_suffix("++") {
            Some(rest) => rest.split('+').collect(),
            None if s == "+" => Vec::new(),
            None => s.split('+').collect(),
        };
        if s.ends_with("++") || s == "+" {
            parts.retain(|p| !p.is_empty());
            parts.push("+");
        }
        Self::from_keys(&parts, platform)
    }

    /// Chord pressed by a keydown, `None` for a bare modifier press
    pub fn from_event(event: &KeyboardEvent) -> Option<Self> {
        if event.key.is_empty() || keys::MODIFIERS.contains(&event.key.as_str()) {
            return None;
        }
        Some(Self {
            ctrl: event.ctrl_key,
            alt: event.alt_key,
            shift: event.shift_key,
            meta: event.meta_key,
            key: normalize_key(&event.key),
        })
    }

    fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
            Modifier::Meta => self.meta = true,
        }
    }

    pub fn modifiers(&self) -> Vec<Modifier> {
        [
            (self.ctrl, Modifier::Ctrl),
            (self.alt, Modifier::Alt),
            (self.shift, Modifier::Shift),
            (self.meta, Modifier::Meta),
        ]
        .into_iter()
        .filter_map(|(held, m)| held.then_some(m))
        .collect()
    }

    /// Ctrl, Alt or Meta held; plain typing never has one
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// Same chord without Shift when the key is a single punctuation
    /// character, whose value already carries the Shift
    pub fn without_implied_shift(&self) -> Option<Self> {
        let mut chars = self.key.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if !self.shift || c.is_alphanumeric() || c.is_whitespace() {
            return None;
        }
        Some(Self {
            shift: false,
            ..self.clone()
        })
    }

    /// Canonical form, `Ctrl+Alt+Shift+Meta+key`
    pub fn canonical(&self) -> String {
        let mut parts: Vec<&str> = self
            .modifiers()
            .into_iter()
            .map(|m| match m {
                Modifier::Ctrl => "Ctrl",
                Modifier::Alt => "Alt",
                Modifier::Shift => "Shift",
                Modifier::Meta => "Meta",
            })
            .collect();
        parts.push(&self.key);
        parts.join("+")
    }

    /// Human-readable label for help overlays
    pub fn display(&self, platform: Platform) -> String {
        let key = if self.key.chars().count() == 1 {
            self.key.to_uppercase()
        } else {
            self.key.clone()
        };

        if platform == Platform::MacOs {
            let mut label: String = self
                .modifiers()
                .into_iter()
                .map(|m| match m {
                    Modifier::Ctrl => '⌃',
                    Modifier::Alt => '⌥',
                    Modifier::Shift => '⇧',
                    Modifier::Meta => '⌘',
                })
                .collect();
            label.push_str(&key);
            return label;
        }

        let meta = if platform == Platform::Windows { "Win" } else { "Super" };
        let mut parts: Vec<&str> = self
            .modifiers()
            .into_iter()
            .map(|m| match m {
                Modifier::Ctrl => "Ctrl",
                Modifier::Alt => "Alt",
                Modifier::Shift => "Shift",
                Modifier::Meta => meta,
            })
            .collect();
        parts.push(&key);
        parts.join("+")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Normalize a key name to its `KeyboardEvent.key` spelling
fn normalize_key(key: &str) -> String {
    if key == " " {
        return "Space".to_string();
    }
    let key = key.trim();
    if key.chars().count() == 1 {
        return key.to_lowercase();
    }
    let lower = key.to_ascii_lowercase();
    let named = match lower.as_str() {
        "esc" | "escape" => "Escape",
        "enter" | "return" => "Enter",
        "tab" => "Tab",
        "space" | "spacebar" => "Space",
        "up" | "arrowup" => "ArrowUp",
        "down" | "arrowdown" => "ArrowDown",
        "left" | "arrowleft" => "ArrowLeft",
        "right" | "arrowright" => "ArrowRight",
        "del" | "delete" => "Delete",
        "backspace" => "Backspace",
        "ins" | "insert" => "Insert",
        "home" => "Home",
        "end" => "End",
        "pageup" | "pgup" => "PageUp",
        "pagedown" | "pgdn" => "PageDown",
        "plus" => "+",
        _ => {
            // Function keys: f1..f24
            if let Some(n) = lower.strip_prefix('f').filter(|n| n.parse::<u8>().is_ok()) {
                return format!("F{n}");
            }
            return key.to_string();
        }
    };
    named.to_string()
}

/// Shortcut callback
pub type ShortcutHandler = Box<dyn FnMut(&KeyboardEvent)>;

/// Application shortcut
pub struct Shortcut {
    pub id: String,
    /// Key list, e.g. `["Ctrl", "s"]`
    pub keys: Vec<String>,
    pub handler: ShortcutHandler,
    pub category: String,
    pub description: String,
    pub enabled: bool,
    /// Call `preventDefault` on the matching event
    pub prevent_default: bool,
    /// Fire modifier-less chords while typing in a text field
    pub allow_in_editable: bool,
}

impl Shortcut {
    pub fn new<F>(id: &str, keys: &[&str], handler: F) -> Self
    where
        F: FnMut(&KeyboardEvent) + 'static,
    {
        Self {
            id: id.to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            handler: Box::new(handler),
            category: DEFAULT_CATEGORY.to_string(),
            description: String::new(),
            enabled: true,
            prevent_default: true,
            allow_in_editable: false,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn prevent_default(mut self, prevent_default: bool) -> Self {
        self.prevent_default = prevent_default;
        self
    }

    pub fn allow_in_editable(mut self, allow: bool) -> Self {
        self.allow_in_editable = allow;
        self
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut")
            .field("id", &self.id)
            .field("keys", &self.keys)
            .field("category", &self.category)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Returned by [`KeyboardShortcutsManager::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutRegistration {
    id: String,
    chord: Chord,
}

impl ShortcutRegistration {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chord(&self) -> &Chord {
        &self.chord
    }
}

/// Listing entry for help overlays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
    pub id: String,
    pub label: String,
    pub description: String,
    pub enabled: bool,
}

#[derive(Debug)]
struct Entry {
    shortcut: Shortcut,
    chord: Chord,
}

/// Shortcut registry and dispatcher
///
/// Owned by the application; nothing fires until [`start`](Self::start).
#[derive(Debug)]
pub struct KeyboardShortcutsManager {
    platform: Platform,
    shortcuts: HashMap<String, Entry>,
    /// Registration order, for listings and chord hand-back
    order: Vec<String>,
    chords: HashMap<Chord, String>,
    listening: bool,
}

impl Default for KeyboardShortcutsManager {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl KeyboardShortcutsManager {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            shortcuts: HashMap::new(),
            order: Vec::new(),
            chords: HashMap::new(),
            listening: false,
        }
    }

    /// Manager for the platform named in `config`, or the current one
    pub fn with_config(config: &Config) -> Self {
        Self::new(config.platform())
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Register a shortcut
    ///
    /// A duplicate id is rejected and the original kept. A chord already
    /// bound to another shortcut is taken over by this one.
    pub fn register(&mut self, shortcut: Shortcut) -> Result<ShortcutRegistration, A11yError> {
        if self.shortcuts.contains_key(&shortcut.id) {
            tracing::warn!("Shortcut '{}' is already registered, ignoring", shortcut.id);
            return Err(A11yError::DuplicateShortcut(shortcut.id));
        }

        let chord = Chord::from_keys(&shortcut.keys, self.platform)?;
        let id = shortcut.id.clone();
        if let Some(previous) = self.chords.insert(chord.clone(), id.clone()) {
            tracing::warn!("Shortcut '{}' takes {} over from '{}'", id, chord, previous);
        }
        tracing::debug!("Registered shortcut '{}' ({})", id, chord);

        self.order.push(id.clone());
        self.shortcuts.insert(
            id.clone(),
            Entry {
                shortcut,
                chord: chord.clone(),
            },
        );
        Ok(ShortcutRegistration { id, chord })
    }

    /// Remove a shortcut; the chord falls back to the latest other holder
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(entry) = self.shortcuts.remove(id) else {
            return false;
        };
        self.order.retain(|other| other != id);

        if self.chords.get(&entry.chord).is_some_and(|owner| owner == id) {
            self.chords.remove(&entry.chord);
            let heir = self
                .order
                .iter()
                .rev()
                .find(|other| self.shortcuts.get(*other).is_some_and(|e| e.chord == entry.chord))
                .cloned();
            if let Some(heir) = heir {
                self.chords.insert(entry.chord, heir);
            }
        }
        tracing::debug!("Unregistered shortcut '{}'", id);
        true
    }

    /// Flip `enabled`, or set it when `enabled` is given; returns the new state
    pub fn toggle(&mut self, id: &str, enabled: Option<bool>) -> Result<bool, A11yError> {
        let entry = self
            .shortcuts
            .get_mut(id)
            .ok_or_else(|| A11yError::UnknownShortcut(id.to_string()))?;
        let shortcut = &mut entry.shortcut;
        shortcut.enabled = enabled.unwrap_or(!shortcut.enabled);
        Ok(shortcut.enabled)
    }

    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.shortcuts.get(id).map(|e| e.shortcut.enabled)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shortcuts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    /// Id of the shortcut a chord currently dispatches to
    pub fn lookup(&self, chord: &Chord) -> Option<&str> {
        self.chords.get(chord).map(String::as_str)
    }

    pub fn start(&mut self) {
        if !self.listening {
            self.listening = true;
            tracing::debug!("Keyboard shortcuts listening");
        }
    }

    pub fn stop(&mut self) {
        if self.listening {
            self.listening = false;
            tracing::debug!("Keyboard shortcuts stopped");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Dispatch a keydown; at most one handler runs
    ///
    /// Returns `true` when a shortcut handled the event.
    pub fn handle_keydown<D: DomAccess + ?Sized>(&mut self, dom: &D, event: &mut KeyboardEvent) -> bool {
        if !self.listening {
            return false;
        }
        let Some(chord) = Chord::from_event(event) else {
            return false;
        };
        let chord = match chord.without_implied_shift() {
            Some(unshifted) if !self.chords.contains_key(&chord) => unshifted,
            _ => chord,
        };
        let Some(id) = self.chords.get(&chord) else {
            return false;
        };
        let Some(entry) = self.shortcuts.get_mut(id) else {
            return false;
        };
        let shortcut = &mut entry.shortcut;
        if !shortcut.enabled {
            return false;
        }

        if !chord.has_command_modifier() && !shortcut.allow_in_editable {
            let target = event.target.or_else(|| dom.active_element());
            if target.is_some_and(|t| is_editable(dom, t)) {
                return false;
            }
        }

        if shortcut.prevent_default {
            event.prevent_default();
        }
        tracing::debug!("Shortcut '{}' fired ({})", shortcut.id, chord);
        (shortcut.handler)(&*event);
        true
    }

    /// Shortcuts grouped by category, registration order within a group
    pub fn shortcuts_by_category(&self) -> BTreeMap<String, Vec<ShortcutInfo>> {
        let mut groups: BTreeMap<String, Vec<ShortcutInfo>> = BTreeMap::new();
        for entry in self.order.iter().filter_map(|id| self.shortcuts.get(id)) {
            let shortcut = &entry.shortcut;
            groups
                .entry(shortcut.category.clone())
                .or_default()
                .push(ShortcutInfo {
                    id: shortcut.id.clone(),
                    label: entry.chord.display(self.platform),
                    description: shortcut.description.clone(),
                    enabled: shortcut.enabled,
                });
        }
        groups
    }
}

/// Text entry target: text-like input, textarea, or contenteditable
pub fn is_editable<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> bool {
    match dom.tag_name(node) {
        Some("textarea") => return true,
        Some("input") => {
            let kind = dom.attribute(node, "type").unwrap_or("text").to_ascii_lowercase();
            return !matches!(
                kind.as_str(),
                "button" | "checkbox" | "radio" | "submit" | "reset" | "image" | "file" | "range" | "color" | "hidden"
            );
        }
        _ => {}
    }

    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(value) = dom.attribute(id, "contenteditable") {
            return !value.eq_ignore_ascii_case("false");
        }
        current = dom.parent(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use keynav_dom::Document;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&KeyboardEvent) + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move |_: &KeyboardEvent| handle.set(handle.get() + 1))
    }

    #[test]
    fn test_chord_parsing() {
        let chord = Chord::from_keys(&["Ctrl", "Shift", "K"], Platform::Linux).unwrap();
        assert_eq!(chord.canonical(), "Ctrl+Shift+k");

        let chord = Chord::parse("shift+cmd+alt+ctrl+Esc", Platform::Linux).unwrap();
        assert_eq!(chord.canonical(), "Ctrl+Alt+Shift+Meta+Escape");

        assert_eq!(Chord::parse("Ctrl++", Platform::Linux).unwrap().key, "+");
        assert_eq!(Chord::parse("f6", Platform::Linux).unwrap().key, "F6");
        assert_eq!(Chord::parse("Space", Platform::Linux).unwrap().key, "Space");

        assert!(Chord::parse("Ctrl+Shift", Platform::Linux).is_err());
        assert!(Chord::from_keys(&["a", "b"], Platform::Linux).is_err());
    }

    #[test]
    fn test_mod_alias_per_platform() {
        let mac = Chord::parse("Mod+k", Platform::MacOs).unwrap();
        let linux = Chord::parse("Mod+k", Platform::Linux).unwrap();
        assert!(mac.meta && !mac.ctrl);
        assert!(linux.ctrl && !linux.meta);
        assert_eq!(Chord::parse("Option+x", Platform::MacOs).unwrap().canonical(), "Alt+x");
    }

    #[test]
    fn test_display() {
        let chord = Chord::parse("Ctrl+Shift+k", Platform::Linux).unwrap();
        assert_eq!(chord.display(Platform::Linux), "Ctrl+Shift+K");
        let chord = Chord::parse("Cmd+Shift+p", Platform::MacOs).unwrap();
        assert_eq!(chord.display(Platform::MacOs), "⇧⌘P");
        assert_eq!(chord.display(Platform::Windows), "Shift+Win+P");
    }

    #[test]
    fn test_from_event() {
        let event = KeyboardEvent::new("S").ctrl().shift();
        assert_eq!(Chord::from_event(&event).unwrap().canonical(), "Ctrl+Shift+s");
        assert_eq!(Chord::from_event(&KeyboardEvent::new(" ")).unwrap().key, "Space");
        assert!(Chord::from_event(&KeyboardEvent::new("Control").ctrl()).is_none());
    }

    #[test]
    fn test_save_fires_once() {
        let doc = Document::new();
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (count, handler) = counter();
        manager.register(Shortcut::new("save", &["Ctrl", "s"], handler)).unwrap();
        manager.start();

        let mut event = KeyboardEvent::new("s").ctrl();
        assert!(manager.handle_keydown(&doc, &mut event));
        assert!(event.is_default_prevented());
        assert_eq!(count.get(), 1);

        let mut shifted = KeyboardEvent::new("S").ctrl().shift();
        assert!(!manager.handle_keydown(&doc, &mut shifted));
        assert!(!shifted.is_default_prevented());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_duplicate_id_keeps_original() {
        let doc = Document::new();
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (first, handler) = counter();
        manager.register(Shortcut::new("save", &["Ctrl", "s"], handler)).unwrap();
        let (second, handler) = counter();
        let result = manager.register(Shortcut::new("save", &["Ctrl", "d"], handler));
        assert!(matches!(result, Err(A11yError::DuplicateShortcut(id)) if id == "save"));
        assert_eq!(manager.len(), 1);

        manager.start();
        manager.handle_keydown(&doc, &mut KeyboardEvent::new("s").ctrl());
        manager.handle_keydown(&doc, &mut KeyboardEvent::new("d").ctrl());
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
    }

    #[test]
    fn test_stopped_and_disabled() {
        let doc = Document::new();
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (count, handler) = counter();
        manager.register(Shortcut::new("find", &["Ctrl", "f"], handler)).unwrap();

        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("f").ctrl()));
        manager.start();
        assert!(!manager.toggle("find", None).unwrap());
        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("f").ctrl()));
        assert!(manager.toggle("find", Some(true)).unwrap());
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("f").ctrl()));
        manager.stop();
        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("f").ctrl()));
        assert_eq!(count.get(), 1);

        assert!(matches!(manager.toggle("nope", None), Err(A11yError::UnknownShortcut(_))));
    }

    #[test]
    fn test_editable_targets() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.append_element(body, "input", &[]);
        let checkbox = doc.append_element(body, "input", &[("type", "checkbox")]);
        let editor = doc.append_element(body, "div", &[("contenteditable", "")]);
        let inner = doc.append_element(editor, "p", &[]);

        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (search, handler) = counter();
        manager.register(Shortcut::new("search", &["/"], handler)).unwrap();
        let (help, handler) = counter();
        manager
            .register(Shortcut::new("help", &["?"], handler).allow_in_editable(true))
            .unwrap();
        manager.start();

        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("/").with_target(input)));
        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("/").with_target(inner)));
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("/").with_target(checkbox)));
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("?").shift().with_target(input)));
        assert_eq!(search.get(), 1);
        assert_eq!(help.get(), 1);
    }

    #[test]
    fn test_shifted_punctuation_matches_unshifted_registration() {
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (help, handler) = counter();
        manager.register(Shortcut::new("help", &["?"], handler)).unwrap();
        let (zoom, handler) = counter();
        manager.register(Shortcut::new("zoom", &["Ctrl", "+"], handler)).unwrap();
        let (bang, handler) = counter();
        manager.register(Shortcut::new("bang", &["Shift", "!"], handler)).unwrap();
        manager.start();

        let doc = Document::new();
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("?").shift()));
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("+").ctrl().shift()));
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("!").shift()));
        assert_eq!((help.get(), zoom.get(), bang.get()), (1, 1, 1));

        // Letters stay exact
        let (save, handler) = counter();
        manager.register(Shortcut::new("save", &["Ctrl", "s"], handler)).unwrap();
        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("S").ctrl().shift()));
        assert_eq!(save.get(), 0);
    }

    #[test]
    fn test_with_config_uses_configured_platform() {
        let config = Config {
            platform: Some(Platform::MacOs),
            ..Default::default()
        };
        let mut manager = KeyboardShortcutsManager::with_config(&config);
        assert_eq!(manager.platform(), Platform::MacOs);

        let (palette, handler) = counter();
        manager.register(Shortcut::new("palette", &["Mod", "k"], handler)).unwrap();
        manager.start();
        let doc = Document::new();
        assert!(!manager.handle_keydown(&doc, &mut KeyboardEvent::new("k").ctrl()));
        assert!(manager.handle_keydown(&doc, &mut KeyboardEvent::new("k").meta()));
        assert_eq!(palette.get(), 1);
    }

    #[test]
    fn test_chord_collision_and_unregister() {
        let doc = Document::new();
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (old, handler) = counter();
        manager.register(Shortcut::new("old", &["Ctrl", "k"], handler)).unwrap();
        let (new, handler) = counter();
        let registration = manager.register(Shortcut::new("new", &["Control", "K"], handler)).unwrap();
        assert_eq!(registration.chord().canonical(), "Ctrl+k");
        manager.start();

        manager.handle_keydown(&doc, &mut KeyboardEvent::new("k").ctrl());
        assert_eq!((old.get(), new.get()), (0, 1));

        assert!(manager.unregister(registration.id()));
        manager.handle_keydown(&doc, &mut KeyboardEvent::new("k").ctrl());
        assert_eq!((old.get(), new.get()), (1, 1));
        assert!(!manager.unregister("new"));
    }

    #[test]
    fn test_prevent_default_opt_out() {
        let doc = Document::new();
        let mut manager = KeyboardShortcutsManager::new(Platform::Linux);
        let (_, handler) = counter();
        manager
            .register(Shortcut::new("peek", &["Alt", "p"], handler).prevent_default(false))
            .unwrap();
        manager.start();

        let mut event = KeyboardEvent::new("p").alt();
        assert!(manager.handle_keydown(&doc, &mut event));
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_by_category() {
        let mut manager = KeyboardShortcutsManager::new(Platform::MacOs);
        manager
            .register(Shortcut::new("save", &["Mod", "s"], |_| {}).category("File").description("Save"))
            .unwrap();
        manager.register(Shortcut::new("open", &["Mod", "o"], |_| {}).category("File")).unwrap();
        manager.register(Shortcut::new("help", &["?"], |_| {})).unwrap();

        let groups = manager.shortcuts_by_category();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["File", DEFAULT_CATEGORY]);
        let file: Vec<_> = groups["File"].iter().map(|s| s.label.as_str()).collect();
        assert_eq!(file, vec!["⌘S", "⌘O"]);
        assert_eq!(groups["File"][0].description, "Save");
    }
}
