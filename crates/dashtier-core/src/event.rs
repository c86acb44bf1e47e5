//! Input events delivered to widgets between frames.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Input event in terminal cell coordinates.
///
/// Pointer events carry the cell under the pointer; routing uses it to pick
/// the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Pointer motion with no button held.
    MouseMove { position: Point },
    /// Button press; charts start a drag here.
    MouseDown { position: Point, button: MouseButton },
    /// Button release; ends a drag.
    MouseUp { position: Point, button: MouseButton },
    /// Pointer motion with a button held.
    MouseDrag { position: Point, button: MouseButton },
    /// Wheel step. `delta_y` is negative when scrolling up.
    Scroll {
        position: Point,
        delta_x: f32,
        delta_y: f32,
    },
    KeyDown { key: Key },
    /// Bracketed paste.
    TextInput { text: String },
    FocusIn,
    FocusOut,
    /// New terminal size in cells.
    Resize { width: f32, height: f32 },
}

impl Event {
    /// Pointer position carried by mouse events.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::MouseMove { position }
            | Self::MouseDown { position, .. }
            | Self::MouseUp { position, .. }
            | Self::MouseDrag { position, .. }
            | Self::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Whether this is a keyboard event.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        matches!(self, Self::KeyDown { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keys the dashboard reacts to. Anything printable is [`Key::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// `F1` through `F12`.
    F(u8),
}
