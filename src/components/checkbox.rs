//! CheckBox component.
//!
//! Same pointer handling and per-state tint as [`Button`](super::button::Button);
//! a completed click toggles `checked`. While checked, the check mark image
//! is drawn over the entity's transform.

use std::time::Duration;

use crate::components::button::{
    ButtonState, DEFAULT_STATE_COLORS, read_state_colors, state_color_elements,
    state_colors_from_node, tint_sprite, write_state_colors,
};
use crate::components::sprite::SpriteInfo;
use crate::components::transform::Transform;
use crate::components::{
    Component, ComponentBase, ComponentKind, ComponentType, DrawContext, Siblings,
};
use crate::error::SerializeResult;
use crate::events::input::InputEvent;
use crate::primitives::Color;
use crate::resources::rendertarget::DrawCommand;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

#[derive(Debug, Clone)]
pub struct CheckBox {
    pub base: ComponentBase,
    pub checked: bool,
    /// Sprite tint per [`ButtonState`].
    pub colors: [Color; 3],
    /// Mark drawn while checked.
    pub check: SpriteInfo,
    state: ButtonState,
}

impl Default for CheckBox {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            checked: false,
            colors: DEFAULT_STATE_COLORS,
            check: SpriteInfo::default(),
            state: ButtonState::Idle,
        }
    }
}

impl PartialEq for CheckBox {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.checked == other.checked
            && self.colors == other.colors
            && self.check == other.check
    }
}

impl CheckBox {
    pub fn new(check: SpriteInfo) -> Self {
        Self {
            check,
            ..Self::default()
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn toggle(&mut self) {
        self.checked = !self.checked;
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
}

impl BinarySerializable for CheckBox {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write_bool(self.checked)?;
        write_state_colors(w, &self.colors)?;
        w.write(&self.check)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            checked: r.read_bool()?,
            colors: read_state_colors(r)?,
            check: r.read()?,
            state: ButtonState::Idle,
        })
    }
}

impl XmlSerializable for CheckBox {
    const ELEMENT: &'static str = "CheckBox";

    fn to_element(&self) -> XmlElement {
        let mut element = self
            .base
            .element(Self::ELEMENT)
            .attr("Checked", self.checked);
        for child in state_color_elements(&self.colors) {
            element.push(child);
        }
        element.child(self.check.to_element())
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            checked: xml::attr(node, "Checked")?,
            colors: state_colors_from_node(node)?,
            check: SpriteInfo::from_element(xml::child(node, SpriteInfo::ELEMENT)?)?,
            state: ButtonState::Idle,
        })
    }
}

impl_xml_display!(CheckBox);

impl ComponentType for CheckBox {
    const KIND: ComponentKind = ComponentKind::CheckBox;
}

impl Component for CheckBox {
    super::component_boilerplate!(CheckBox);

    fn handle_event(&mut self, event: &InputEvent, siblings: &mut Siblings<'_>) {
        let Some(transform) = siblings.get::<Transform>() else {
            return;
        };
        if self.state.track(event, |p| transform.contains(p)) {
            self.toggle();
        }
    }

    fn update(&mut self, _dt: Duration, siblings: &mut Siblings<'_>) {
        tint_sprite(siblings, &self.colors, self.state);
    }

    fn draw(&self, cx: &mut DrawContext<'_>) {
        if !self.checked {
            return;
        }
        let Some(transform) = cx.sibling::<Transform>() else {
            return;
        };
        let texture = cx.assets.textures.get(&self.check.texture);
        cx.target.draw(DrawCommand::Quad {
            texture,
            vertices: self.check.quad(transform.corners()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::sprite::Sprite;
    use crate::primitives::{Rect, Vector2f};
    use crate::resources::assets::Assets;
    use crate::resources::rendertarget::RecordingTarget;

    fn components() -> Vec<Box<dyn Component>> {
        vec![
            Box::new(Transform::new(Vector2f::ZERO, Vector2f::new(16.0, 16.0))),
            Box::new(Sprite::default()),
            Box::new(CheckBox::new(SpriteInfo::new(
                "check.png",
                Rect::new(0.0, 0.0, 16.0, 16.0),
                Color::GREEN,
            ))),
        ]
    }

    fn click(components: &mut [Box<dyn Component>], at: Vector2f) {
        let (current, mut siblings) = Siblings::split(components, 2).unwrap();
        for event in InputEvent::click(at) {
            current.handle_event(&event, &mut siblings);
        }
    }

    fn checkbox(components: &[Box<dyn Component>]) -> &CheckBox {
        components[2].as_any().downcast_ref::<CheckBox>().unwrap()
    }

    #[test]
    fn test_default_is_unchecked() {
        assert!(!CheckBox::default().is_checked());
    }

    #[test]
    fn test_click_toggles() {
        let mut components = components();
        click(&mut components, Vector2f::new(8.0, 8.0));
        assert!(checkbox(&components).is_checked());
        click(&mut components, Vector2f::new(8.0, 8.0));
        assert!(!checkbox(&components).is_checked());
    }

    #[test]
    fn test_click_outside_does_nothing() {
        let mut components = components();
        click(&mut components, Vector2f::new(40.0, 8.0));
        assert!(!checkbox(&components).is_checked());
    }

    #[test]
    fn test_draws_mark_only_when_checked() {
        let mut components = components();
        let mut assets = Assets::in_memory();
        let mut target = RecordingTarget::new(64.0, 64.0);
        {
            let mut cx = DrawContext {
                target: &mut target,
                assets: &mut assets,
                components: &components,
            };
            components[2].draw(&mut cx);
        }
        assert!(target.commands.is_empty());

        click(&mut components, Vector2f::new(8.0, 8.0));
        let mut cx = DrawContext {
            target: &mut target,
            assets: &mut assets,
            components: &components,
        };
        components[2].draw(&mut cx);
        let quad = target.quads().next().unwrap();
        assert_eq!(quad[2].position, Vector2f::new(16.0, 16.0));
        assert_eq!(quad[0].color, Color::GREEN);
    }

    #[test]
    fn test_round_trip_keeps_checked_and_colors() {
        let mut original = CheckBox::default();
        original.toggle();
        original.set_color(ButtonState::Click, Color::new(9, 8, 7, 6));
        let loaded = CheckBox::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert!(loaded.is_checked());
        assert_eq!(loaded.colors, original.colors);
        assert_eq!(CheckBox::from_xml_str(&original.to_xml()).unwrap(), original);
    }
}
