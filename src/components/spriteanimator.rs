//! SpriteAnimator component.
//!
//! Owns an [`Animator`] and, each tick, copies the current frame's region
//! and modifiers onto the sibling [`Sprite`]'s image.

use std::time::Duration;

use crate::components::sprite::Sprite;
use crate::components::transform::Transform;
use crate::components::{Component, ComponentBase, ComponentKind, ComponentType, Siblings};
use crate::error::SerializeResult;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};
use crate::systems::animation::Animator;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpriteAnimator {
    pub base: ComponentBase,
    pub animator: Animator,
}

impl SpriteAnimator {
    pub fn new(animator: Animator) -> Self {
        Self {
            base: ComponentBase::default(),
            animator,
        }
    }

    /// Push the current frame onto the sibling sprite and rebuild its quad.
    fn apply_current_frame(&mut self, siblings: &mut Siblings<'_>) {
        let Some(frame) = self.animator.current_frame().copied() else {
            return;
        };
        let transform = siblings.get::<Transform>().cloned();
        if let Some(sprite) = siblings.get_mut::<Sprite>() {
            sprite.image_mut().apply_frame(&frame);
            sprite.rebuild(transform.as_ref());
        }
    }
}

impl BinarySerializable for SpriteAnimator {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write(&self.animator)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            animator: r.read()?,
        })
    }
}

impl XmlSerializable for SpriteAnimator {
    const ELEMENT: &'static str = "SpriteAnimator";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .child(self.animator.to_element())
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            animator: Animator::from_element(xml::child(node, Animator::ELEMENT)?)?,
        })
    }
}

impl_xml_display!(SpriteAnimator);

impl ComponentType for SpriteAnimator {
    const KIND: ComponentKind = ComponentKind::SpriteAnimator;
}

impl Component for SpriteAnimator {
    super::component_boilerplate!(SpriteAnimator);

    fn refresh(&mut self, siblings: &mut Siblings<'_>) {
        self.apply_current_frame(siblings);
    }

    fn update(&mut self, dt: Duration, siblings: &mut Siblings<'_>) {
        self.animator.update(dt);
        self.apply_current_frame(siblings);
    }
}
