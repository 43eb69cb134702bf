//! Button component and the pointer state machine shared with
//! [`CheckBox`](crate::components::checkbox::CheckBox).
//!
//! The state follows the pointer over the entity's [`Transform`]:
//!
//! | Event | From | To |
//! |---|---|---|
//! | move inside | Idle/Hover | Hover |
//! | move outside | Idle/Hover | Idle |
//! | left press inside | any | Click |
//! | left release | Click | Hover if inside (a click), else Idle |
//!
//! Each tick the sibling [`Sprite`] is tinted with the color of the current
//! state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::components::sprite::Sprite;
use crate::components::transform::Transform;
use crate::components::{Component, ComponentBase, ComponentKind, ComponentType, Siblings};
use crate::error::{SerializeError, SerializeResult};
use crate::events::input::{InputEvent, MouseButton};
use crate::primitives::{Color, Vector2f};
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Pointer state of a clickable widget; also the index into its color array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    #[default]
    Idle = 0,
    Hover = 1,
    Click = 2,
}

impl ButtonState {
    pub const ALL: [ButtonState; 3] = [ButtonState::Idle, ButtonState::Hover, ButtonState::Click];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ButtonState::Idle => "Idle",
            ButtonState::Hover => "Hover",
            ButtonState::Click => "Click",
        }
    }

    /// Feed one event. Returns true when a press inside was released inside.
    pub fn track(&mut self, event: &InputEvent, contains: impl Fn(Vector2f) -> bool) -> bool {
        match *event {
            InputEvent::MouseMoved { position } if *self != ButtonState::Click => {
                *self = if contains(position) {
                    ButtonState::Hover
                } else {
                    ButtonState::Idle
                };
                false
            }
            InputEvent::MousePressed {
                button: MouseButton::Left,
                position,
            } if contains(position) => {
                *self = ButtonState::Click;
                false
            }
            InputEvent::MouseReleased {
                button: MouseButton::Left,
                position,
            } if *self == ButtonState::Click => {
                let inside = contains(position);
                *self = if inside {
                    ButtonState::Hover
                } else {
                    ButtonState::Idle
                };
                inside
            }
            _ => false,
        }
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonState {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SerializeError::invalid(format!("unknown button state '{s}'")))
    }
}

/// Default per-state tints.
pub const DEFAULT_STATE_COLORS: [Color; 3] = [Color::WHITE, Color::LIGHT_GRAY, Color::GRAY];

pub(crate) fn write_state_colors(w: &mut BinaryWriter<'_>, colors: &[Color; 3]) -> SerializeResult<()> {
    colors.iter().try_for_each(|c| w.write_color(*c))
}

pub(crate) fn read_state_colors(r: &mut BinaryReader<'_>) -> SerializeResult<[Color; 3]> {
    Ok([r.read_color()?, r.read_color()?, r.read_color()?])
}

/// `<IdleColor/>`, `<HoverColor/>`, `<ClickColor/>`.
pub(crate) fn state_color_elements(colors: &[Color; 3]) -> impl Iterator<Item = XmlElement> + '_ {
    ButtonState::ALL
        .into_iter()
        .map(|state| colors[state.index()].to_named_element(&format!("{state}Color")))
}

pub(crate) fn state_colors_from_node(node: XmlNode<'_, '_>) -> SerializeResult<[Color; 3]> {
    let read = |state: ButtonState| -> SerializeResult<Color> {
        Color::from_node(xml::child(node, &format!("{state}Color"))?)
    };
    Ok([
        read(ButtonState::Idle)?,
        read(ButtonState::Hover)?,
        read(ButtonState::Click)?,
    ])
}

/// Tint the sibling sprite with the color for `state`.
pub(crate) fn tint_sprite(siblings: &mut Siblings<'_>, colors: &[Color; 3], state: ButtonState) {
    if let Some(sprite) = siblings.get_mut::<Sprite>() {
        sprite.set_color(colors[state.index()]);
    }
}

/// Pointer-driven push button.
#[derive(Debug, Clone)]
pub struct Button {
    pub base: ComponentBase,
    /// Sprite tint per [`ButtonState`].
    pub colors: [Color; 3],
    state: ButtonState,
    clicked: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            colors: DEFAULT_STATE_COLORS,
            state: ButtonState::Idle,
            clicked: false,
        }
    }
}

impl PartialEq for Button {
    /// Pointer state is transient and not compared.
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.colors == other.colors
    }
}

impl Button {
    pub fn new(colors: [Color; 3]) -> Self {
        Self {
            colors,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn color(&self, state: ButtonState) -> Color {
        self.colors[state.index()]
    }

    pub fn set_color(&mut self, state: ButtonState, color: Color) {
        self.colors[state.index()] = color;
    }

    /// Whether a click completed since the last call.
    pub fn take_clicked(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }
}

impl BinarySerializable for Button {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        write_state_colors(w, &self.colors)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            colors: read_state_colors(r)?,
            ..Self::default()
        })
    }
}

impl XmlSerializable for Button {
    const ELEMENT: &'static str = "Button";

    fn to_element(&self) -> XmlElement {
        let mut element = self.base.element(Self::ELEMENT);
        for child in state_color_elements(&self.colors) {
            element.push(child);
        }
        element
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            colors: state_colors_from_node(node)?,
            ..Self::default()
        })
    }
}

impl_xml_display!(Button);

impl ComponentType for Button {
    const KIND: ComponentKind = ComponentKind::Button;
}

impl Component for Button {
    super::component_boilerplate!(Button);

    fn handle_event(&mut self, event: &InputEvent, siblings: &mut Siblings<'_>) {
        let Some(transform) = siblings.get::<Transform>() else {
            return;
        };
        if self.state.track(event, |p| transform.contains(p)) {
            self.clicked = true;
        }
    }

    fn update(&mut self, _dt: Duration, siblings: &mut Siblings<'_>) {
        tint_sprite(siblings, &self.colors, self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(p: Vector2f) -> bool {
        p.x < 10.0
    }

    const IN: Vector2f = Vector2f::new(5.0, 0.0);
    const OUT: Vector2f = Vector2f::new(50.0, 0.0);

    #[test]
    fn test_hover_follows_pointer() {
        let mut state = ButtonState::Idle;
        state.track(&InputEvent::MouseMoved { position: IN }, inside);
        assert_eq!(state, ButtonState::Hover);
        state.track(&InputEvent::MouseMoved { position: OUT }, inside);
        assert_eq!(state, ButtonState::Idle);
    }

    #[test]
    fn test_press_and_release_inside_is_a_click() {
        let mut state = ButtonState::Idle;
        let [press, release] = InputEvent::click(IN);
        assert!(!state.track(&press, inside));
        assert_eq!(state, ButtonState::Click);
        assert!(state.track(&release, inside));
        assert_eq!(state, ButtonState::Hover);
    }

    #[test]
    fn test_release_outside_cancels() {
        let mut state = ButtonState::Idle;
        let [press, _] = InputEvent::click(IN);
        state.track(&press, inside);
        state.track(&InputEvent::MouseMoved { position: OUT }, inside);
        assert_eq!(state, ButtonState::Click);
        let [_, release] = InputEvent::click(OUT);
        assert!(!state.track(&release, inside));
        assert_eq!(state, ButtonState::Idle);
    }

    #[test]
    fn test_right_button_ignored() {
        let mut state = ButtonState::Idle;
        let press = InputEvent::MousePressed {
            button: MouseButton::Right,
            position: IN,
        };
        state.track(&press, inside);
        assert_eq!(state, ButtonState::Idle);
    }

    #[test]
    fn test_click_is_one_shot_and_tints_sprite() {
        let mut components: Vec<Box<dyn Component>> = vec![
            Box::new(Transform::new(Vector2f::ZERO, Vector2f::new(10.0, 10.0))),
            Box::new(Sprite::default()),
            Box::new(Button::default()),
        ];
        let (current, mut siblings) = Siblings::split(&mut components, 2).unwrap();
        let [press, release] = InputEvent::click(Vector2f::new(5.0, 5.0));
        current.handle_event(&press, &mut siblings);
        current.update(Duration::ZERO, &mut siblings);
        assert_eq!(siblings.get::<Sprite>().unwrap().image().color, Color::GRAY);
        current.handle_event(&release, &mut siblings);
        let button = current.as_any_mut().downcast_mut::<Button>().unwrap();
        assert!(button.take_clicked());
        assert!(!button.take_clicked());
        assert_eq!(button.state(), ButtonState::Hover);
    }

    #[test]
    fn test_round_trips_colors() {
        let mut button = Button::default();
        button.set_color(ButtonState::Hover, Color::new(1, 2, 3, 4));
        assert_eq!(Button::from_bytes(&button.to_bytes().unwrap()).unwrap(), button);
        let xml = button.to_xml();
        assert!(xml.contains("<HoverColor"));
        assert_eq!(Button::from_xml_str(&xml).unwrap(), button);
    }
}
