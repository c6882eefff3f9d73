// Keybindings for the mediasort triage queue
// Turns physical key presses into queue actions and drives rebinding
//
// Keybindings:
// - next / prev / delete: remappable, ArrowRight / ArrowLeft / Delete by default
// - 1..N: move to destination N (fixed)
// - Ctrl+Z / Meta+Z: undo (fixed)

use crate::models::{ShortcutAction, ShortcutMap};

/// Keys that never bind on their own.
pub const MODIFIER_KEYS: [&str; 5] = ["Control", "Ctrl", "Shift", "Alt", "Meta"];

/// A key identifier plus the modifiers that matter for shortcuts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    /// Parses `Ctrl+z`, `Meta+z` or a bare key identifier.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        let mut press = Self::plain("");
        let mut rest = token;
        loop {
            if let Some(tail) = strip_prefix_ci(rest, "ctrl+") {
                press.ctrl = true;
                rest = tail;
            } else if let Some(tail) = strip_prefix_ci(rest, "meta+") {
                press.meta = true;
                rest = tail;
            } else {
                break;
            }
        }
        if rest.is_empty() {
            return None;
        }
        press.key = rest.to_string();
        Some(press)
    }

    pub fn is_modifier(&self) -> bool {
        MODIFIER_KEYS.iter().any(|m| m.eq_ignore_ascii_case(&self.key))
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Queue actions reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Next,
    Prev,
    Delete,
    Undo,
    /// 1-based destination slot
    MoveTo(usize),
}

impl From<ShortcutAction> for KeyAction {
    fn from(action: ShortcutAction) -> Self {
        match action {
            ShortcutAction::Next => Self::Next,
            ShortcutAction::Prev => Self::Prev,
            ShortcutAction::Delete => Self::Delete,
        }
    }
}

/// Maps a key press to an action.
///
/// Undo works on an empty queue; everything else is ignored there.
pub fn resolve(
    press: &KeyPress,
    shortcuts: &ShortcutMap,
    destination_count: usize,
    queue_empty: bool,
) -> Option<KeyAction> {
    if (press.ctrl || press.meta) && press.key.eq_ignore_ascii_case("z") {
        return Some(KeyAction::Undo);
    }

    if queue_empty {
        return None;
    }

    if let Some(action) = shortcuts.action_for(&press.key) {
        return Some(action.into());
    }

    match press.key.parse::<usize>() {
        Ok(slot) if slot >= 1 && slot <= destination_count => Some(KeyAction::MoveTo(slot)),
        _ => None,
    }
}

/// Waits for the one key press that rebinds an action.
#[derive(Debug, Default)]
pub struct RebindCapture {
    listening: Option<ShortcutAction>,
}

impl RebindCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, action: ShortcutAction) {
        self.listening = Some(action);
    }

    pub fn cancel(&mut self) {
        self.listening = None;
    }

    pub fn is_active(&self) -> bool {
        self.listening.is_some()
    }

    pub fn listening(&self) -> Option<ShortcutAction> {
        self.listening
    }

    /// Commits `press` into `shortcuts` unless it is a bare modifier or a
    /// chord. Shortcuts hold a single key, so Ctrl/Meta combinations are refused
    /// and capture keeps listening. Returns the action that was rebound.
    pub fn capture(&mut self, press: &KeyPress, shortcuts: &mut ShortcutMap) -> Option<ShortcutAction> {
        let action = self.listening?;
        if press.is_modifier() || press.ctrl || press.meta {
            return None;
        }
        shortcuts.set(action, press.key.clone());
        self.listening = None;
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> KeyPress {
        KeyPress::plain(k)
    }

    #[test]
    fn test_default_bindings() {
        let map = ShortcutMap::default();
        assert_eq!(resolve(&key("ArrowRight"), &map, 0, false), Some(KeyAction::Next));
        assert_eq!(resolve(&key("ArrowLeft"), &map, 0, false), Some(KeyAction::Prev));
        assert_eq!(resolve(&key("Delete"), &map, 0, false), Some(KeyAction::Delete));
        assert_eq!(resolve(&key("x"), &map, 0, false), None);
    }

    #[test]
    fn test_numeric_slots() {
        let map = ShortcutMap::default();
        assert_eq!(resolve(&key("1"), &map, 2, false), Some(KeyAction::MoveTo(1)));
        assert_eq!(resolve(&key("2"), &map, 2, false), Some(KeyAction::MoveTo(2)));
        assert_eq!(resolve(&key("3"), &map, 2, false), None);
        assert_eq!(resolve(&key("0"), &map, 2, false), None);
    }

    #[test]
    fn test_undo_on_empty_queue() {
        let map = ShortcutMap::default();
        let undo = KeyPress::parse("Ctrl+z").unwrap();
        assert_eq!(resolve(&undo, &map, 0, true), Some(KeyAction::Undo));
        assert_eq!(resolve(&key("ArrowRight"), &map, 3, true), None);
        assert_eq!(resolve(&key("1"), &map, 3, true), None);

        let undo = KeyPress::parse("meta+Z").unwrap();
        assert!(undo.meta);
        assert_eq!(resolve(&undo, &map, 0, false), Some(KeyAction::Undo));
    }

    #[test]
    fn test_plain_z_is_not_undo() {
        let map = ShortcutMap::default();
        assert_eq!(resolve(&key("z"), &map, 0, false), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(KeyPress::parse("  ArrowUp "), Some(key("ArrowUp")));
        assert_eq!(KeyPress::parse(""), None);
        assert_eq!(KeyPress::parse("Ctrl+"), None);
        let press = KeyPress::parse("Ctrl+Meta+z").unwrap();
        assert!(press.ctrl && press.meta);
        assert_eq!(press.key, "z");
    }

    #[test]
    fn test_rebind_ignores_modifiers() {
        let mut map = ShortcutMap::default();
        let mut capture = RebindCapture::new();
        capture.begin(ShortcutAction::Next);

        assert_eq!(capture.capture(&key("Shift"), &mut map), None);
        assert!(capture.is_active());
        assert_eq!(map.next, "ArrowRight");

        assert_eq!(capture.capture(&key("d"), &mut map), Some(ShortcutAction::Next));
        assert!(!capture.is_active());
        assert_eq!(resolve(&key("d"), &map, 0, false), Some(KeyAction::Next));
        assert_eq!(resolve(&key("ArrowRight"), &map, 0, false), None);
    }

    #[test]
    fn test_rebind_refuses_chords() {
        let mut map = ShortcutMap::default();
        let mut capture = RebindCapture::new();
        capture.begin(ShortcutAction::Delete);

        for token in ["Ctrl+d", "Meta+x", "Ctrl", "ctrl", "Control"] {
            let press = KeyPress::parse(token).unwrap();
            assert_eq!(capture.capture(&press, &mut map), None, "{token}");
        }
        assert_eq!(capture.listening(), Some(ShortcutAction::Delete));
        assert_eq!(map.delete, "Delete");

        assert_eq!(capture.capture(&key("x"), &mut map), Some(ShortcutAction::Delete));
        assert_eq!(map.delete, "x");
    }

    #[test]
    fn test_capture_without_begin() {
        let mut map = ShortcutMap::default();
        let mut capture = RebindCapture::new();
        assert_eq!(capture.capture(&key("d"), &mut map), None);
        assert_eq!(map, ShortcutMap::default());
    }

    #[test]
    fn test_custom_binding_shadows_slot() {
        let mut map = ShortcutMap::default();
        map.set(ShortcutAction::Delete, "1");
        assert_eq!(resolve(&key("1"), &map, 3, false), Some(KeyAction::Delete));
    }
}
