//! Input events.
//!
//! The host polls its windowing library and forwards what happened as
//! [`InputEvent`]s to [`Entity::handle_event`](crate::entity::Entity::handle_event).
//! Positions are in view space, the same space as
//! [`Transform`](crate::components::transform::Transform) bounds.

use serde::{Deserialize, Serialize};

use crate::primitives::Vector2f;

/// Mouse buttons the widgets react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keys with editing meaning; everything else arrives as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Backspace,
    Enter,
    Escape,
    Other,
}

/// Event emitted by the host for one input occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer moved to `position`.
    MouseMoved { position: Vector2f },
    MousePressed {
        button: MouseButton,
        position: Vector2f,
    },
    MouseReleased {
        button: MouseButton,
        position: Vector2f,
    },
    /// A printable character was typed.
    TextEntered(char),
    KeyPressed(Key),
}

impl InputEvent {
    /// Pointer position carried by mouse events.
    pub fn position(&self) -> Option<Vector2f> {
        match *self {
            InputEvent::MouseMoved { position }
            | InputEvent::MousePressed { position, .. }
            | InputEvent::MouseReleased { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn click(position: Vector2f) -> [InputEvent; 2] {
        [
            InputEvent::MousePressed {
                button: MouseButton::Left,
                position,
            },
            InputEvent::MouseReleased {
                button: MouseButton::Left,
                position,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_only_for_mouse_events() {
        let p = Vector2f::new(3.0, 4.0);
        assert_eq!(InputEvent::MouseMoved { position: p }.position(), Some(p));
        assert_eq!(InputEvent::TextEntered('a').position(), None);
        assert_eq!(InputEvent::KeyPressed(Key::Enter).position(), None);
    }

    #[test]
    fn test_click_is_press_then_release() {
        let [press, release] = InputEvent::click(Vector2f::ZERO);
        assert!(matches!(press, InputEvent::MousePressed { button: MouseButton::Left, .. }));
        assert!(matches!(release, InputEvent::MouseReleased { button: MouseButton::Left, .. }));
    }
}
