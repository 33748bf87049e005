//! Keyboard shortcut registry.

/// What a key does in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Delete the selected text-box unless it is being edited.
    DeleteTextBox,
    /// Leave text editing.
    ExitEditing,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub action: KeyAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, action: KeyAction, description: &'static str) -> Self {
        Self {
            key,
            action,
            description,
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", KeyAction::DeleteTextBox, "Delete selected text-box"),
            Shortcut::new("Backspace", KeyAction::DeleteTextBox, "Delete selected text-box"),
            Shortcut::new("Escape", KeyAction::ExitEditing, "Stop editing text"),
        ]
    }

    /// Action bound to a key name (DOM `KeyboardEvent.key` spelling).
    pub fn action(key: &str) -> Option<KeyAction> {
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key))
            .map(|s| s.action)
    }

    /// One `key  description` line per shortcut, for a help overlay.
    pub fn describe() -> Vec<String> {
        Self::all()
            .into_iter()
            .map(|s| format!("{:12} {}", s.key, s.description))
            .collect()
    }
}
