//! Crossterm event conversion and key bindings.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton as CtMouseButton, MouseEvent,
    MouseEventKind,
};
use dashtier_core::{Event, Key, MouseButton, Point};

/// Key binding configuration.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// Key code.
    pub code: KeyCode,
    /// Required modifiers.
    pub modifiers: KeyModifiers,
    /// Action name.
    pub action: String,
}

impl KeyBinding {
    /// Create a new key binding.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers, action: impl Into<String>) -> Self {
        Self {
            code,
            modifiers,
            action: action.into(),
        }
    }

    /// Create a simple key binding without modifiers.
    #[must_use]
    pub fn simple(code: KeyCode, action: impl Into<String>) -> Self {
        Self::new(code, KeyModifiers::NONE, action)
    }

    /// Check if this binding matches a key event.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.code == self.code && event.modifiers.contains(self.modifiers)
    }
}

/// Converts crossterm events into dashboard events.
#[derive(Debug, Default)]
pub struct InputHandler {
    bindings: Vec<KeyBinding>,
}

impl InputHandler {
    /// Create a new input handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler with the standard quit bindings: `q`, Esc and Ctrl-C.
    #[must_use]
    pub fn with_quit_bindings() -> Self {
        let mut handler = Self::new();
        handler.add_binding(KeyBinding::simple(KeyCode::Char('q'), "quit"));
        handler.add_binding(KeyBinding::simple(KeyCode::Esc, "quit"));
        handler.add_binding(KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL, "quit"));
        handler
    }

    /// Add a key binding.
    pub fn add_binding(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
    }

    /// Convert a crossterm event; releases, repeats-as-release and unknown keys give `None`.
    #[must_use]
    pub fn convert(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key) => Self::convert_key(key),
            CrosstermEvent::Mouse(mouse) => Some(Self::convert_mouse(mouse)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize {
                width: f32::from(width),
                height: f32::from(height),
            }),
            CrosstermEvent::FocusGained => Some(Event::FocusIn),
            CrosstermEvent::FocusLost => Some(Event::FocusOut),
            CrosstermEvent::Paste(text) => Some(Event::TextInput { text }),
        }
    }

    fn convert_key(key: KeyEvent) -> Option<Event> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let key = match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            // Unknown keys are ignored
            _ => return None,
        };
        Some(Event::KeyDown { key })
    }

    fn convert_button(button: CtMouseButton) -> MouseButton {
        match button {
            CtMouseButton::Left => MouseButton::Left,
            CtMouseButton::Right => MouseButton::Right,
            CtMouseButton::Middle => MouseButton::Middle,
        }
    }

    fn convert_mouse(mouse: MouseEvent) -> Event {
        let position = Point::new(f32::from(mouse.column), f32::from(mouse.row));
        let scroll = |delta_x: f32, delta_y: f32| Event::Scroll {
            position,
            delta_x,
            delta_y,
        };

        match mouse.kind {
            MouseEventKind::Down(button) => Event::MouseDown {
                position,
                button: Self::convert_button(button),
            },
            MouseEventKind::Up(button) => Event::MouseUp {
                position,
                button: Self::convert_button(button),
            },
            MouseEventKind::Drag(button) => Event::MouseDrag {
                position,
                button: Self::convert_button(button),
            },
            MouseEventKind::Moved => Event::MouseMove { position },
            MouseEventKind::ScrollUp => scroll(0.0, -1.0),
            MouseEventKind::ScrollDown => scroll(0.0, 1.0),
            MouseEventKind::ScrollLeft => scroll(-1.0, 0.0),
            MouseEventKind::ScrollRight => scroll(1.0, 0.0),
        }
    }

    /// Find a matching binding for a key event.
    #[must_use]
    pub fn find_binding(&self, event: &KeyEvent) -> Option<&KeyBinding> {
        self.bindings.iter().find(|b| b.matches(event))
    }

    /// Action bound to a crossterm event, if it is a bound key press.
    #[must_use]
    pub fn action_for(&self, event: &CrosstermEvent) -> Option<&str> {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                self.find_binding(key).map(|b| b.action.as_str())
            }
            _ => None,
        }
    }
}
