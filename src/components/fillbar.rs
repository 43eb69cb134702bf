//! FillBar component.
//!
//! Draws the filled fraction of the entity's transform bounds as a solid
//! rectangle on top of the sibling sprite. `direction` is the way the bar
//! grows: `Right` fills from the left edge, `Up` from the bottom edge.

use log::warn;

use crate::components::transform::Transform;
use crate::components::{Component, ComponentBase, ComponentKind, ComponentType, DrawContext};
use crate::error::{SerializeError, SerializeResult};
use crate::primitives::{Color, Direction, Rect};
use crate::resources::rendertarget::DrawCommand;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FillBar {
    pub base: ComponentBase,
    fill: f32,
    pub fill_color: Color,
    pub direction: Direction,
}

impl Default for FillBar {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            fill: 0.0,
            fill_color: Color::GREEN,
            direction: Direction::Right,
        }
    }
}

impl FillBar {
    pub fn new(fill: f32, fill_color: Color, direction: Direction) -> Self {
        let mut bar = Self {
            fill_color,
            direction,
            ..Self::default()
        };
        bar.set_fill(fill);
        bar
    }

    pub fn fill(&self) -> f32 {
        self.fill
    }

    /// Clamped to `[0, 1]`; NaN counts as empty.
    pub fn set_fill(&mut self, fill: f32) {
        if fill.is_nan() {
            warn!("FillBar fill is NaN, using 0");
            self.fill = 0.0;
        } else {
            self.fill = fill.clamp(0.0, 1.0);
        }
    }

    /// Filled part of `bounds`.
    pub fn filled_rect(&self, bounds: Rect) -> Rect {
        let w = bounds.width * self.fill;
        let h = bounds.height * self.fill;
        match self.direction {
            Direction::Right => Rect::new(bounds.left, bounds.top, w, bounds.height),
            Direction::Left => Rect::new(bounds.right() - w, bounds.top, w, bounds.height),
            Direction::Down => Rect::new(bounds.left, bounds.top, bounds.width, h),
            Direction::Up => Rect::new(bounds.left, bounds.bottom() - h, bounds.width, h),
        }
    }
}

fn validate_fill(fill: f32) -> SerializeResult<f32> {
    if (0.0..=1.0).contains(&fill) {
        Ok(fill)
    } else {
        Err(SerializeError::invalid(format!("fill {fill} outside [0, 1]")))
    }
}

impl BinarySerializable for FillBar {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write_f32(self.fill)?;
        w.write_color(self.fill_color)?;
        w.write(&self.direction)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            fill: validate_fill(r.read_f32()?)?,
            fill_color: r.read_color()?,
            direction: r.read()?,
        })
    }
}

impl XmlSerializable for FillBar {
    const ELEMENT: &'static str = "FillBar";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .attr("Fill", self.fill)
            .attr("Direction", self.direction)
            .child(self.fill_color.to_named_element("FillColor"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            fill: validate_fill(xml::float_attr(node, "Fill")?)?,
            direction: xml::attr(node, "Direction")?,
            fill_color: Color::from_node(xml::child(node, "FillColor")?)?,
        })
    }
}

impl_xml_display!(FillBar);

impl ComponentType for FillBar {
    const KIND: ComponentKind = ComponentKind::FillBar;
}

impl Component for FillBar {
    super::component_boilerplate!(FillBar);

    fn draw(&self, cx: &mut DrawContext<'_>) {
        let Some(transform) = cx.sibling::<Transform>() else {
            return;
        };
        let bounds = self.filled_rect(transform.bounds());
        if bounds.is_empty() {
            return;
        }
        cx.target.draw(DrawCommand::Rectangle {
            bounds,
            color: self.fill_color,
        });
    }
}
