//! Raw input events and translating window events into them.

use glamour::Point2;
use smol_str::SmolStr;
use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{Key, NamedKey},
};

/// Kind of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum MouseKind {
    /// Cursor moved.
    Move,
    /// Button pressed.
    Down,
    /// Button released.
    Up,
}

/// Kind of keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum KeyKind {
    /// Key pressed, repeats while held.
    Down,
    /// Key released.
    Up,
}

impl From<ElementState> for KeyKind {
    #[inline]
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => Self::Down,
            ElementState::Released => Self::Up,
        }
    }
}

/// Input as raised by the host, before it's mapped to the logical coordinate system.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum InputEvent {
    /// Mouse event in device pixels.
    Mouse {
        /// What happened.
        kind: MouseKind,
        /// Horizontal position on the screen.
        x: f32,
        /// Vertical position on the screen.
        y: f32,
    },
    /// Keyboard event.
    Key {
        /// What happened.
        kind: KeyKind,
        /// Platform key identifier, such as `"a"`, `"Enter"` or `"ArrowUp"`.
        key: SmolStr,
    },
}

/// Translates winit window events to [`InputEvent`]s.
#[derive(Debug, Default)]
pub(crate) struct Input {
    /// Last known cursor position in device pixels.
    ///
    /// `None` if not on screen.
    mouse: Option<Point2>,
}

impl Input {
    /// Translate a window event, `None` if it's not an input event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            // Handle mouse cursor position
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse = None;

                None
            }
            // Handle mouse buttons, all buttons are treated the same
            WindowEvent::MouseInput { state, .. } => self.mouse_button(*state),
            // Handle keyboard buttons
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = key_name(&event.logical_key) else {
                    log::warn!("Dropping unidentified key {:?}", event.logical_key);

                    return None;
                };

                Some(InputEvent::Key {
                    kind: event.state.into(),
                    key,
                })
            }
            _ => None,
        }
    }

    /// Remember the cursor position and create a move event.
    fn cursor_moved(&mut self, x: f32, y: f32) -> InputEvent {
        self.mouse = Some(Point2::new(x, y));

        InputEvent::Mouse {
            kind: MouseKind::Move,
            x,
            y,
        }
    }

    /// Create a button event at the last known cursor position.
    fn mouse_button(&self, state: ElementState) -> Option<InputEvent> {
        let Some(mouse) = self.mouse else {
            log::warn!("Dropping mouse button event, cursor position is unknown");

            return None;
        };

        let kind = match state {
            ElementState::Pressed => MouseKind::Down,
            ElementState::Released => MouseKind::Up,
        };

        Some(InputEvent::Mouse {
            kind,
            x: mouse.x,
            y: mouse.y,
        })
    }
}

/// Platform identifier of a logical key, matching the names used by browsers.
fn key_name(key: &Key) -> Option<SmolStr> {
    match key {
        Key::Character(character) => Some(character.clone()),
        // Browsers report the space bar as the character it types
        Key::Named(NamedKey::Space) => Some(SmolStr::new_inline(" ")),
        Key::Named(named) => Some(SmolStr::new(format!("{named:?}"))),
        Key::Unidentified(..) | Key::Dead(..) => None,
    }
}
