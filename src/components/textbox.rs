//! TextBox component.
//!
//! Turns the sibling [`Label`] into an editable field. A left press inside
//! the transform focuses the box and a press outside unfocuses it. While
//! focused, typed characters are appended to the label text, Backspace
//! deletes the last character, Escape unfocuses and Enter unfocuses and
//! raises the one-shot `submitted` flag.

use std::time::Duration;

use log::debug;

use crate::components::label::Label;
use crate::components::transform::Transform;
use crate::components::{
    Component, ComponentBase, ComponentKind, ComponentType, DrawContext, Siblings,
};
use crate::error::SerializeResult;
use crate::events::input::{InputEvent, Key, MouseButton};
use crate::primitives::{Color, Rect};
use crate::resources::rendertarget::DrawCommand;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

const DEFAULT_BLINK_PERIOD: Duration = Duration::from_millis(500);
const CURSOR_WIDTH: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct TextBox {
    pub base: ComponentBase,
    /// Maximum number of characters; 0 means unlimited.
    pub max_length: usize,
    pub cursor_color: Color,
    /// Time the cursor stays shown (then hidden) while blinking.
    pub blink_period: Duration,
    focused: bool,
    submitted: bool,
    cursor_shown: bool,
    blink_elapsed: Duration,
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            max_length: 0,
            cursor_color: Color::WHITE,
            blink_period: DEFAULT_BLINK_PERIOD,
            focused: false,
            submitted: false,
            cursor_shown: true,
            blink_elapsed: Duration::ZERO,
        }
    }
}

impl PartialEq for TextBox {
    /// Focus and cursor blink are transient and not compared.
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.max_length == other.max_length
            && self.cursor_color == other.cursor_color
            && self.blink_period == other.blink_period
    }
}

impl TextBox {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            debug!("TextBox focus {}", if focused { "gained" } else { "lost" });
        }
        self.focused = focused;
        self.cursor_shown = true;
        self.blink_elapsed = Duration::ZERO;
    }

    /// Whether Enter was pressed since the last call.
    pub fn take_submitted(&mut self) -> bool {
        std::mem::take(&mut self.submitted)
    }

    fn accepts_more(&self, text: &str) -> bool {
        self.max_length == 0 || text.chars().count() < self.max_length
    }

    /// Cursor rectangle after the text. Glyph widths are not known here, so
    /// half the character size per character is assumed.
    fn cursor_rect(bounds: Rect, label: &Label) -> Rect {
        let size = label.style.size() as f32;
        let advance = label.text.chars().count() as f32 * size * 0.5;
        Rect::new(bounds.left + advance, bounds.top, CURSOR_WIDTH, size)
    }
}

impl BinarySerializable for TextBox {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write_len(self.max_length)?;
        w.write_color(self.cursor_color)?;
        w.write_duration(self.blink_period)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            max_length: r.read_len()?,
            cursor_color: r.read_color()?,
            blink_period: r.read_duration()?,
            ..Self::default()
        })
    }
}

impl XmlSerializable for TextBox {
    const ELEMENT: &'static str = "TextBox";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .attr("MaxLength", self.max_length)
            .attr("BlinkPeriod", xml::format_duration(self.blink_period))
            .child(self.cursor_color.to_named_element("CursorColor"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            max_length: xml::attr(node, "MaxLength")?,
            blink_period: xml::duration_attr(node, "BlinkPeriod")?,
            cursor_color: Color::from_node(xml::child(node, "CursorColor")?)?,
            ..Self::default()
        })
    }
}

impl_xml_display!(TextBox);

impl ComponentType for TextBox {
    const KIND: ComponentKind = ComponentKind::TextBox;
}

impl Component for TextBox {
    super::component_boilerplate!(TextBox);

    fn handle_event(&mut self, event: &InputEvent, siblings: &mut Siblings<'_>) {
        match *event {
            InputEvent::MousePressed {
                button: MouseButton::Left,
                position,
            } => {
                let inside = siblings
                    .get::<Transform>()
                    .is_some_and(|t| t.contains(position));
                self.set_focused(inside);
            }
            _ if !self.focused => {}
            InputEvent::TextEntered(ch) if !ch.is_control() => {
                if let Some(label) = siblings.get_mut::<Label>()
                    && self.accepts_more(&label.text)
                {
                    label.text.push(ch);
                }
            }
            InputEvent::KeyPressed(Key::Backspace) => {
                if let Some(label) = siblings.get_mut::<Label>() {
                    label.text.pop();
                }
            }
            InputEvent::KeyPressed(Key::Enter) => {
                self.set_focused(false);
                self.submitted = true;
            }
            InputEvent::KeyPressed(Key::Escape) => self.set_focused(false),
            _ => {}
        }
    }

    fn update(&mut self, dt: Duration, _siblings: &mut Siblings<'_>) {
        if !self.focused || self.blink_period.is_zero() {
            return;
        }
        self.blink_elapsed += dt;
        if self.blink_elapsed >= self.blink_period {
            self.blink_elapsed = Duration::ZERO;
            self.cursor_shown = !self.cursor_shown;
        }
    }

    fn draw(&self, cx: &mut DrawContext<'_>) {
        if !self.focused || !self.cursor_shown {
            return;
        }
        let (Some(transform), Some(label)) = (cx.sibling::<Transform>(), cx.sibling::<Label>())
        else {
            return;
        };
        cx.target.draw(DrawCommand::Rectangle {
            bounds: Self::cursor_rect(transform.bounds(), label),
            color: self.cursor_color,
        });
    }
}
