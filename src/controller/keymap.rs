//! Keyboard shortcuts scoped to a view.
//!
//! Each view owns a [`Keymap`]; leaving the view drops it, so its shortcuts
//! stop firing.

use std::{fmt, str::FromStr};

/// A key with its modifiers, written like `n`, `ctrl+s` or `ctrl+shift+a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    key: char,
    ctrl: bool,
    shift: bool,
}

impl KeyChord {
    /// A key without modifiers.
    #[must_use]
    pub const fn plain(key: char) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            ctrl: false,
            shift: false,
        }
    }

    /// The key held with control.
    #[must_use]
    pub const fn ctrl(self) -> Self {
        Self { ctrl: true, ..self }
    }

    /// The key held with shift.
    #[must_use]
    pub const fn shift(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }
}

/// Errors raised when parsing a [`KeyChord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseChordError {
    /// The chord has no key, e.g. `ctrl+`.
    #[error("missing key in '{0}'")]
    MissingKey(String),
    /// A modifier other than `ctrl` or `shift`, or a key longer than one
    /// character.
    #[error("unrecognised key '{0}'")]
    Unrecognised(String),
}

impl FromStr for KeyChord {
    type Err = ParseChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let mut parts: Vec<&str> = normalized.split('+').collect();
        let key = parts
            .pop()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ParseChordError::MissingKey(s.to_string()))?;

        let mut chars = key.chars();
        let (Some(key), None) = (chars.next(), chars.next()) else {
            return Err(ParseChordError::Unrecognised(key.to_string()));
        };

        let mut chord = Self::plain(key);
        for modifier in parts {
            chord = match modifier {
                "ctrl" | "control" => chord.ctrl(),
                "shift" => chord.shift(),
                other => return Err(ParseChordError::Unrecognised(other.to_string())),
            };
        }
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a new review.
    Add,
    /// Save the draft.
    Save,
    /// Fill the draft's blank fields with `na`.
    FillBlanks,
}

/// Whether a key press was consumed by a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A shortcut fired; default handling of the key is suppressed.
    Handled(Action),
    /// No shortcut is bound to the key in the active view.
    Ignored,
}

impl KeyOutcome {
    /// Whether default handling of the key should be suppressed.
    #[must_use]
    pub const fn suppresses_default(self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// The shortcuts of one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<(KeyChord, Action)>,
}

impl Keymap {
    /// Shortcuts of the review list.
    #[must_use]
    pub fn list_view() -> Self {
        Self {
            bindings: vec![(KeyChord::plain('n'), Action::Add)],
        }
    }

    /// Shortcuts of the review editor.
    #[must_use]
    pub fn edit_view() -> Self {
        Self {
            bindings: vec![
                (KeyChord::plain('s').ctrl(), Action::Save),
                (KeyChord::plain('a').ctrl().shift(), Action::FillBlanks),
            ],
        }
    }

    /// Looks up the action bound to a chord.
    #[must_use]
    pub fn resolve(&self, chord: KeyChord) -> KeyOutcome {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == chord)
            .map_or(KeyOutcome::Ignored, |&(_, action)| KeyOutcome::Handled(action))
    }

    /// The bindings, for display.
    pub fn bindings(&self) -> impl Iterator<Item = (KeyChord, Action)> + '_ {
        self.bindings.iter().copied()
    }
}
