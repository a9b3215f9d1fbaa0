//! Keyboard routing for inline editing.
//!
//! While a cell is being edited the grid intercepts four keys:
//!
//! | key        | phase | command                         |
//! |------------|-------|---------------------------------|
//! | Tab        | down  | edit next editable cell         |
//! | Shift+Tab  | down  | edit previous editable cell     |
//! | Enter      | up    | commit, edit same column below  |
//! | Escape     | up    | cancel the edit                 |
//!
//! Tab presses suppress the host's default focus traversal. Everything else
//! passes through untouched.

/// Keys the grid distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKey {
    Tab,
    Enter,
    Escape,
    /// Any other key.
    Other,
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A key event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: GridKey,
    pub phase: KeyPhase,
    pub shift: bool,
}

impl KeyEvent {
    /// A key-down event.
    pub fn down(key: GridKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
            shift: false,
        }
    }

    /// A key-up event.
    pub fn up(key: GridKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Up,
            shift: false,
        }
    }

    /// The same event with Shift held.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Editing commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    NextCell,
    PrevCell,
    NextRowCell,
    Cancel,
}

/// How the grid handled a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The command that ran, if any.
    pub command: Option<KeyCommand>,
    /// Whether the host should suppress its default handling.
    pub prevent_default: bool,
}

impl KeyOutcome {
    /// The event was not handled.
    pub fn ignored() -> Self {
        Self::default()
    }
}

/// Maps a key event to an editing command.
pub fn route_key(event: KeyEvent) -> KeyOutcome {
    let command = match (event.key, event.phase) {
        (GridKey::Tab, KeyPhase::Down) if event.shift => KeyCommand::PrevCell,
        (GridKey::Tab, KeyPhase::Down) => KeyCommand::NextCell,
        (GridKey::Enter, KeyPhase::Up) => KeyCommand::NextRowCell,
        (GridKey::Escape, KeyPhase::Up) => KeyCommand::Cancel,
        _ => return KeyOutcome::ignored(),
    };
    KeyOutcome {
        command: Some(command),
        prevent_default: event.key == GridKey::Tab,
    }
}
