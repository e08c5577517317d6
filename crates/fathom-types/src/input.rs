//! Platform-agnostic input event types.
//!
//! Front ends map their native input to these enums. The orchestrator never
//! sees raw terminal or window-system input.

use serde::{Deserialize, Serialize};

/// A platform-agnostic input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key pressed, possibly with modifiers held.
    KeyPress(KeyChord),
    /// Character typed into the focused field.
    TextInput(char),
}

/// Keys the facility terminal distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    /// Function key F1..F12.
    F(u8),
}

/// A key plus the modifiers held while it was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyChord {
    /// A bare key with no modifiers.
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    /// The global warm-reboot chord (Ctrl+Alt+Delete).
    pub const REBOOT: KeyChord = KeyChord {
        key: Key::Delete,
        ctrl: true,
        alt: true,
        shift: false,
    };

    /// Parse a chord written as `ctrl+alt+delete`, `f5`, `shift+a`, ...
    ///
    /// Modifier and key names are case-insensitive. Returns `None` for
    /// unknown key names or an empty key.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chord = Self::plain(Key::Enter);
        let mut key = None;
        for part in text.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "alt" => chord.alt = true,
                "shift" => chord.shift = true,
                "enter" | "return" => key = Some(Key::Enter),
                "esc" | "escape" => key = Some(Key::Escape),
                "backspace" => key = Some(Key::Backspace),
                "del" | "delete" => key = Some(Key::Delete),
                "tab" => key = Some(Key::Tab),
                other => {
                    if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                        if (1..=12).contains(&n) {
                            key = Some(Key::F(n));
                            continue;
                        }
                        return None;
                    }
                    let mut chars = part.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => key = Some(Key::Char(c.to_ascii_lowercase())),
                        _ => return None,
                    }
                },
            }
        }
        chord.key = key?;
        Some(chord)
    }
}
