//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::LayerId;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// What a pointer event landed on.
///
/// Hosts resolve targets with the renderer's hit test (or their own DOM) so
/// the state machine never guesses layer extents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PointerTarget {
    /// A layer's hit area.
    Layer(LayerId),
    /// The resize affordance of a selected layer.
    ResizeHandle(LayerId),
    /// Empty canvas surface.
    Canvas,
}

/// A pointer (mouse, pen, or primary touch) event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event phase.
    pub phase: PointerPhase,
    /// X in canvas units.
    pub x: f32,
    /// Y in canvas units.
    pub y: f32,
    /// Timestamp in milliseconds since an arbitrary origin.
    pub timestamp_ms: u64,
    /// Hit target, `None` when outside the canvas.
    #[serde(default)]
    pub target: Option<PointerTarget>,
}

impl PointerEvent {
    /// Pointer-down on a target.
    #[must_use]
    pub fn down(x: f32, y: f32, timestamp_ms: u64, target: PointerTarget) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
            timestamp_ms,
            target: Some(target),
        }
    }

    /// Pointer-move; the target is irrelevant while a gesture is active.
    #[must_use]
    pub fn moved(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
            timestamp_ms,
            target: None,
        }
    }

    /// Pointer-up anywhere.
    #[must_use]
    pub fn up(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
            timestamp_ms,
            target: None,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    #[serde(default)]
    pub shift: bool,
    /// Control key pressed.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt/Option key pressed.
    #[serde(default)]
    pub alt: bool,
    /// Meta/Command key pressed.
    #[serde(default)]
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Editor commands recognised from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Force every interaction back to idle.
    Cancel,
    /// Undo the last commit.
    Undo,
    /// Redo the last undone commit.
    Redo,
    /// Remove the selected layer.
    Delete,
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer event.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key {
        /// Key name as reported by the host (`"Escape"`, `"z"`, ...).
        key: String,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },

    /// The in-place text editor's value changed.
    TextInput {
        /// Full current text.
        text: String,
    },

    /// The in-place text editor lost focus.
    Blur,
}

impl InputEvent {
    /// Map a key event to an editor command.
    #[must_use]
    pub fn key_command(&self) -> Option<KeyCommand> {
        let Self::Key { key, modifiers } = self else {
            return None;
        };
        match key.as_str() {
            "Escape" | "Esc" => Some(KeyCommand::Cancel),
            "z" | "Z" if modifiers.command() && modifiers.shift => Some(KeyCommand::Redo),
            "z" | "Z" if modifiers.command() => Some(KeyCommand::Undo),
            "y" | "Y" if modifiers.ctrl => Some(KeyCommand::Redo),
            "Delete" | "Backspace" if !modifiers.command() => Some(KeyCommand::Delete),
            _ => None,
        }
    }
}
