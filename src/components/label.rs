//! Label component and text style.
//!
//! A [`Label`] draws a line of text at the top-left of its entity's
//! [`Transform`] bounds using a [`TextStyle`].

use log::warn;

use crate::components::transform::Transform;
use crate::components::{Component, ComponentBase, ComponentKind, ComponentType, DrawContext};
use crate::error::{SerializeError, SerializeResult};
use crate::primitives::Color;
use crate::resources::assets::normalize_path;
use crate::resources::rendertarget::DrawCommand;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Character size used when none (or zero) is given.
pub const DEFAULT_TEXT_SIZE: u32 = 30;

/// Text style flags, combinable with `|`.
pub mod style {
    pub const REGULAR: u32 = 0;
    pub const BOLD: u32 = 1;
    pub const ITALIC: u32 = 2;
    pub const UNDERLINED: u32 = 4;
    pub const STRIKE_THROUGH: u32 = 8;
    pub const ALL: u32 = BOLD | ITALIC | UNDERLINED | STRIKE_THROUGH;
}

/// How text is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font path resolved through [`Assets`](crate::resources::assets::Assets).
    pub font: String,
    size: u32,
    pub fill: Color,
    pub outline: Color,
    outline_thickness: f32,
    flags: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: String::new(),
            size: DEFAULT_TEXT_SIZE,
            fill: Color::WHITE,
            outline: Color::BLACK,
            outline_thickness: 0.0,
            flags: style::REGULAR,
        }
    }
}

impl TextStyle {
    pub fn new(font: &str, size: u32) -> Self {
        let mut text_style = Self {
            font: normalize_path(font),
            ..Self::default()
        };
        text_style.set_size(size);
        text_style
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Character size in pixels; zero falls back to [`DEFAULT_TEXT_SIZE`].
    pub fn set_size(&mut self, size: u32) {
        if size == 0 {
            warn!("Text size must be positive, using {DEFAULT_TEXT_SIZE}");
            self.size = DEFAULT_TEXT_SIZE;
        } else {
            self.size = size;
        }
    }

    pub fn outline_thickness(&self) -> f32 {
        self.outline_thickness
    }

    pub fn set_outline_thickness(&mut self, thickness: f32) {
        self.outline_thickness = if thickness.is_finite() && thickness >= 0.0 {
            thickness
        } else {
            warn!("Outline thickness must be non-negative, got {thickness}");
            0.0
        };
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Unknown bits are dropped.
    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags & style::ALL;
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    fn validated(self) -> SerializeResult<Self> {
        if self.size == 0 {
            return Err(SerializeError::invalid("text size must be positive"));
        }
        if !self.outline_thickness.is_finite() || self.outline_thickness < 0.0 {
            return Err(SerializeError::invalid(format!(
                "invalid outline thickness {}",
                self.outline_thickness
            )));
        }
        if self.flags & !style::ALL != 0 {
            return Err(SerializeError::invalid(format!("invalid text style {}", self.flags)));
        }
        Ok(self)
    }
}

impl BinarySerializable for TextStyle {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.font)?;
        w.write_u32(self.size)?;
        w.write_color(self.fill)?;
        w.write_color(self.outline)?;
        w.write_f32(self.outline_thickness)?;
        w.write_u32(self.flags)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Self {
            font: r.read_string()?,
            size: r.read_u32()?,
            fill: r.read_color()?,
            outline: r.read_color()?,
            outline_thickness: r.read_f32()?,
            flags: r.read_u32()?,
        }
        .validated()
    }
}

impl XmlSerializable for TextStyle {
    const ELEMENT: &'static str = "TextStyle";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Font", &self.font)
            .attr("Size", self.size)
            .attr("OutlineThickness", self.outline_thickness)
            .attr("Style", self.flags)
            .child(self.fill.to_named_element("Fill"))
            .child(self.outline.to_named_element("Outline"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Self {
            font: xml::attr_str(node, "Font")?.to_string(),
            size: xml::attr(node, "Size")?,
            outline_thickness: xml::float_attr(node, "OutlineThickness")?,
            flags: xml::attr(node, "Style")?,
            fill: Color::from_node(xml::child(node, "Fill")?)?,
            outline: Color::from_node(xml::child(node, "Outline")?)?,
        }
        .validated()
    }
}

/// Text drawn over the entity's transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
    pub base: ComponentBase,
    pub text: String,
    pub style: TextStyle,
}

impl Label {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            base: ComponentBase::default(),
            text: text.into(),
            style,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl BinarySerializable for Label {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write_str(&self.text)?;
        w.write(&self.style)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            text: r.read_string()?,
            style: r.read()?,
        })
    }
}

impl XmlSerializable for Label {
    const ELEMENT: &'static str = "Label";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .attr("Text", &self.text)
            .child(self.style.to_element())
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            text: xml::attr_str(node, "Text")?.to_string(),
            style: TextStyle::from_element(xml::child(node, TextStyle::ELEMENT)?)?,
        })
    }
}

impl_xml_display!(TextStyle, Label);

impl ComponentType for Label {
    const KIND: ComponentKind = ComponentKind::Label;
}

impl Component for Label {
    super::component_boilerplate!(Label);

    fn draw(&self, cx: &mut DrawContext<'_>) {
        let Some(transform) = cx.sibling::<Transform>() else {
            return;
        };
        let font = cx.assets.fonts.get(&self.style.font);
        cx.target.draw(DrawCommand::Text {
            font,
            text: self.text.clone(),
            style: self.style.clone(),
            bounds: transform.bounds(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Rect, Vector2f};
    use crate::resources::assets::Assets;
    use crate::resources::rendertarget::RecordingTarget;

    #[test]
    fn test_zero_size_falls_back() {
        let s = TextStyle::new("font.ttf", 0);
        assert_eq!(s.size(), DEFAULT_TEXT_SIZE);
    }

    #[test]
    fn test_flags() {
        let mut s = TextStyle::default();
        s.set_flags(style::BOLD | style::UNDERLINED | 64);
        assert_eq!(s.flags(), 5);
        assert!(s.has_flag(style::BOLD));
        assert!(!s.has_flag(style::ITALIC));
    }

    #[test]
    fn test_xml_rejects_zero_size() {
        let text = r#"<TextStyle Font="" Size="0" OutlineThickness="0" Style="0">
            <Fill R="1" G="1" B="1" A="1"/><Outline R="1" G="1" B="1" A="1"/>
        </TextStyle>"#;
        assert!(TextStyle::from_xml_str(text).is_err());
    }

    #[test]
    fn test_draw_uses_transform_bounds() {
        let mut assets = Assets::in_memory();
        assets.insert_font("ui.ttf");
        let components: Vec<Box<dyn Component>> = vec![
            Box::new(Transform::new(Vector2f::new(4.0, 8.0), Vector2f::new(100.0, 20.0))),
            Box::new(Label::new("Start", TextStyle::new("ui.ttf", 16))),
        ];
        let mut target = RecordingTarget::new(200.0, 200.0);
        let mut cx = DrawContext {
            target: &mut target,
            assets: &mut assets,
            components: &components,
        };
        components[1].draw(&mut cx);
        match &target.commands[..] {
            [DrawCommand::Text { font, text, bounds, .. }] => {
                assert!(font.is_some());
                assert_eq!(text, "Start");
                assert_eq!(*bounds, Rect::new(4.0, 8.0, 100.0, 20.0));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_round_trips_with_markup_characters() {
        let mut text_style = TextStyle::new("fonts/ui.ttf", 18);
        text_style.set_outline_thickness(1.5);
        text_style.set_flags(style::ITALIC);
        let label = Label::new("a < b & \"c\"\nnext", text_style);
        assert_eq!(Label::from_bytes(&label.to_bytes().unwrap()).unwrap(), label);
        assert_eq!(Label::from_xml_str(&label.to_xml()).unwrap(), label);
    }
}
