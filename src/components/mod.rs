//! Components attachable to an [`Entity`](crate::entity::Entity).
//!
//! Every component type has a stable [`ComponentKind`] tag and a static
//! [`ComponentDescriptor`] naming the kinds it requires and the kinds it
//! cannot coexist with. The entity validates attaches and removals against
//! this table; there is no runtime reflection.
//!
//! Components talk to peers on the same entity through the [`Siblings`] view
//! handed to their hooks (update, events, lifecycle) or through
//! [`DrawContext`] when drawing. They never hold pointers to each other.
//!
//! Submodules overview:
//! - [`transform`] – position, size, scale and rotation
//! - [`sprite`] – textured quad built from an [`ImageInfo`](sprite::ImageInfo)
//! - [`spriteanimator`] – drives a sprite from an [`Animator`](crate::systems::animation::Animator)
//! - [`label`] – text with a [`TextStyle`](label::TextStyle)
//! - [`button`] – clickable sprite with per-state colors
//! - [`checkbox`] – toggle with per-state colors and a check mark
//! - [`fillbar`] – progress bar drawn over a sprite
//! - [`textbox`] – editable label

pub mod button;
pub mod checkbox;
pub mod fillbar;
pub mod label;
pub mod sprite;
pub mod spriteanimator;
pub mod textbox;
pub mod transform;

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SerializeError, SerializeResult};
use crate::events::input::InputEvent;
use crate::resources::assets::Assets;
use crate::resources::rendertarget::RenderTarget;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{BinaryReader, BinaryWriter};

use button::Button;
use checkbox::CheckBox;
use fillbar::FillBar;
use label::Label;
use sprite::Sprite;
use spriteanimator::SpriteAnimator;
use textbox::TextBox;
use transform::Transform;

/// Stable type tag, used for lookup and for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Transform = 0,
    Sprite = 1,
    SpriteAnimator = 2,
    Label = 3,
    Button = 4,
    CheckBox = 5,
    FillBar = 6,
    TextBox = 7,
}

/// Static facts about a component type.
pub struct ComponentDescriptor {
    pub kind: ComponentKind,
    pub type_name: &'static str,
    /// Kinds that must be attached to the same entity.
    pub required: &'static [ComponentKind],
    /// Kinds that must not be attached to the same entity.
    pub incompatible: &'static [ComponentKind],
    /// Builds a default instance.
    pub factory: fn() -> Box<dyn Component>,
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("incompatible", &self.incompatible)
            .finish()
    }
}

fn create<T: ComponentType>() -> Box<dyn Component> {
    Box::new(T::default())
}

use ComponentKind as K;

/// Indexed by tag.
static REGISTRY: [ComponentDescriptor; 8] = [
    ComponentDescriptor {
        kind: K::Transform,
        type_name: "Transform",
        required: &[],
        incompatible: &[],
        factory: create::<Transform>,
    },
    ComponentDescriptor {
        kind: K::Sprite,
        type_name: "Sprite",
        required: &[K::Transform],
        incompatible: &[],
        factory: create::<Sprite>,
    },
    ComponentDescriptor {
        kind: K::SpriteAnimator,
        type_name: "SpriteAnimator",
        required: &[K::Sprite],
        incompatible: &[],
        factory: create::<SpriteAnimator>,
    },
    ComponentDescriptor {
        kind: K::Label,
        type_name: "Label",
        required: &[K::Transform],
        incompatible: &[],
        factory: create::<Label>,
    },
    ComponentDescriptor {
        kind: K::Button,
        type_name: "Button",
        required: &[K::Sprite, K::Label],
        incompatible: &[K::CheckBox, K::FillBar, K::TextBox],
        factory: create::<Button>,
    },
    ComponentDescriptor {
        kind: K::CheckBox,
        type_name: "CheckBox",
        required: &[K::Sprite],
        incompatible: &[K::Button, K::FillBar, K::TextBox],
        factory: create::<CheckBox>,
    },
    ComponentDescriptor {
        kind: K::FillBar,
        type_name: "FillBar",
        required: &[K::Sprite],
        incompatible: &[K::Button, K::CheckBox, K::TextBox],
        factory: create::<FillBar>,
    },
    ComponentDescriptor {
        kind: K::TextBox,
        type_name: "TextBox",
        required: &[K::Label],
        incompatible: &[K::Button, K::CheckBox, K::FillBar],
        factory: create::<TextBox>,
    },
];

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        K::Transform,
        K::Sprite,
        K::SpriteAnimator,
        K::Label,
        K::Button,
        K::CheckBox,
        K::FillBar,
        K::TextBox,
    ];

    pub fn descriptor(self) -> &'static ComponentDescriptor {
        &REGISTRY[self as usize]
    }

    pub fn type_name(self) -> &'static str {
        self.descriptor().type_name
    }

    pub fn required(self) -> &'static [ComponentKind] {
        self.descriptor().required
    }

    pub fn incompatible(self) -> &'static [ComponentKind] {
        self.descriptor().incompatible
    }

    /// True unless either kind declares the other incompatible.
    pub fn is_compatible_with(self, other: ComponentKind) -> bool {
        !self.incompatible().contains(&other) && !other.incompatible().contains(&self)
    }

    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    /// Default instance of this kind.
    pub fn create(self) -> Box<dyn Component> {
        (self.descriptor().factory)()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ComponentKind {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_type_name(s).ok_or_else(|| SerializeError::UnknownComponent(s.to_string()))
    }
}

/// State every component carries.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    /// Disabled components skip update and event handling.
    pub enabled: bool,
    /// Invisible components skip drawing; independent of `enabled`.
    pub visible: bool,
    /// Id of the entity this component is attached to.
    pub owner: Option<String>,
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            owner: None,
        }
    }
}

impl PartialEq for ComponentBase {
    /// Attachment is not part of a component's value.
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled && self.visible == other.visible
    }
}

impl ComponentBase {
    pub fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_bool(self.enabled)?;
        w.write_bool(self.visible)
    }

    pub fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            enabled: r.read_bool()?,
            visible: r.read_bool()?,
            owner: None,
        })
    }

    /// Component element carrying the `Enabled`/`Visible` attributes.
    pub fn element(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("Enabled", self.enabled)
            .attr("Visible", self.visible)
    }

    pub fn from_node(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        Ok(Self {
            enabled: xml::attr(node, "Enabled")?,
            visible: xml::attr(node, "Visible")?,
            owner: None,
        })
    }
}

/// A typed behavior/data unit attachable to an entity.
///
/// Only the hooks a component needs are overridden; the rest default to
/// no-ops. The boilerplate methods are generated by `component_boilerplate!`.
pub trait Component: Any + fmt::Debug {
    fn kind(&self) -> ComponentKind;
    fn base(&self) -> &ComponentBase;
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Called once right after the component is attached.
    fn on_add(&mut self, _siblings: &mut Siblings<'_>) {}

    /// Recompute derived state from siblings. Called after attach and after
    /// the entity is loaded.
    fn refresh(&mut self, _siblings: &mut Siblings<'_>) {}

    fn update(&mut self, _dt: Duration, _siblings: &mut Siblings<'_>) {}

    fn handle_event(&mut self, _event: &InputEvent, _siblings: &mut Siblings<'_>) {}

    fn draw(&self, _cx: &mut DrawContext<'_>) {}

    /// Release owned sub-resources. Called on removal and when the owning
    /// entity is dropped.
    fn dispose(&mut self) {}

    /// Deep copy with the owner cleared.
    fn clone_component(&self) -> Box<dyn Component>;

    /// Structural equality against another component of any kind.
    fn eq_component(&self, other: &dyn Component) -> bool;

    /// Write the component's payload (not its tag).
    fn write_component(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()>;

    /// Replace this component's value with one read from the stream.
    fn read_component(&mut self, r: &mut BinaryReader<'_>) -> SerializeResult<()>;

    fn component_element(&self) -> XmlElement;

    /// Replace this component's value with one read from `node`.
    fn read_component_element(&mut self, node: XmlNode<'_, '_>) -> SerializeResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().enabled = enabled;
    }

    fn is_visible(&self) -> bool {
        self.base().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.base_mut().visible = visible;
    }

    fn owner(&self) -> Option<&str> {
        self.base().owner.as_deref()
    }
}

/// Static link between a concrete component type and its kind.
pub trait ComponentType: Component + Default + Clone + PartialEq {
    const KIND: ComponentKind;
}

/// Generates the bookkeeping half of a [`Component`] impl for a type with a
/// `base: ComponentBase` field that implements both serialization traits.
macro_rules! component_boilerplate {
    ($ty:ty) => {
        fn kind(&self) -> $crate::components::ComponentKind {
            <$ty as $crate::components::ComponentType>::KIND
        }

        fn base(&self) -> &$crate::components::ComponentBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut $crate::components::ComponentBase {
            &mut self.base
        }

        fn clone_component(&self) -> Box<dyn $crate::components::Component> {
            let mut copy = self.clone();
            copy.base.owner = None;
            Box::new(copy)
        }

        fn eq_component(&self, other: &dyn $crate::components::Component) -> bool {
            other
                .as_any()
                .downcast_ref::<$ty>()
                .is_some_and(|other| other == self)
        }

        fn write_component(
            &self,
            w: &mut $crate::serialization::BinaryWriter<'_>,
        ) -> $crate::error::SerializeResult<()> {
            $crate::serialization::BinarySerializable::write_binary(self, w)
        }

        fn read_component(
            &mut self,
            r: &mut $crate::serialization::BinaryReader<'_>,
        ) -> $crate::error::SerializeResult<()> {
            let mut value: $ty = $crate::serialization::BinarySerializable::read_binary(r)?;
            value.base.owner = self.base.owner.take();
            *self = value;
            Ok(())
        }

        fn component_element(&self) -> $crate::serialization::XmlElement {
            $crate::serialization::XmlSerializable::to_element(self)
        }

        fn read_component_element(
            &mut self,
            node: $crate::serialization::XmlNode<'_, '_>,
        ) -> $crate::error::SerializeResult<()> {
            let mut value: $ty = $crate::serialization::XmlSerializable::from_element(node)?;
            value.base.owner = self.base.owner.take();
            *self = value;
            Ok(())
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}
pub(crate) use component_boilerplate;

/// Downcast the first component of type `T` in a slice.
pub fn find_component<T: ComponentType>(components: &[Box<dyn Component>]) -> Option<&T> {
    components
        .iter()
        .find(|c| c.kind() == T::KIND)
        .and_then(|c| c.as_any().downcast_ref::<T>())
}

/// Mutable variant of [`find_component`].
pub fn find_component_mut<T: ComponentType>(
    components: &mut [Box<dyn Component>],
) -> Option<&mut T> {
    components
        .iter_mut()
        .find(|c| c.kind() == T::KIND)
        .and_then(|c| c.as_any_mut().downcast_mut::<T>())
}

/// Every component on an entity except the one whose hook is running.
pub struct Siblings<'a> {
    before: &'a mut [Box<dyn Component>],
    after: &'a mut [Box<dyn Component>],
}

impl<'a> Siblings<'a> {
    pub fn new(before: &'a mut [Box<dyn Component>], after: &'a mut [Box<dyn Component>]) -> Self {
        Self { before, after }
    }

    /// Split `components` around `index`, returning the component at
    /// `index` and a view of the others. `None` when `index` is out of range.
    pub fn split(
        components: &'a mut [Box<dyn Component>],
        index: usize,
    ) -> Option<(&'a mut Box<dyn Component>, Siblings<'a>)> {
        if index >= components.len() {
            return None;
        }
        let (before, rest) = components.split_at_mut(index);
        let (current, after) = rest.split_first_mut()?;
        Some((current, Siblings { before, after }))
    }

    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        find_component(self.before).or_else(|| find_component(self.after))
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        match find_component_mut(self.before) {
            Some(found) => Some(found),
            None => find_component_mut(self.after),
        }
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.iter().any(|c| c.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|c| c.as_ref())
    }
}

/// Everything a draw hook may touch.
pub struct DrawContext<'a> {
    pub target: &'a mut dyn RenderTarget,
    pub assets: &'a mut Assets,
    /// All components of the entity being drawn, the drawing one included.
    pub components: &'a [Box<dyn Component>],
}

impl<'a> DrawContext<'a> {
    pub fn sibling<T: ComponentType>(&self) -> Option<&'a T> {
        find_component(self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_indexed_by_tag() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
            assert_eq!(ComponentKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(ComponentKind::from_type_name(kind.type_name()), Some(kind));
            assert_eq!(kind.create().kind(), kind);
        }
        assert_eq!(ComponentKind::from_tag(99), None);
    }

    #[test]
    fn test_incompatibility_is_symmetric() {
        for a in ComponentKind::ALL {
            for b in ComponentKind::ALL {
                assert_eq!(
                    a.incompatible().contains(&b),
                    b.incompatible().contains(&a),
                    "{a} / {b}"
                );
            }
        }
    }

    #[test]
    fn test_no_kind_requires_an_incompatible_kind() {
        for kind in ComponentKind::ALL {
            for req in kind.required() {
                assert!(kind.is_compatible_with(*req));
            }
        }
    }

    #[test]
    fn test_clone_component_clears_owner() {
        let mut t = Transform::default();
        t.base.owner = Some("hero".into());
        let copy = t.clone_component();
        assert_eq!(copy.owner(), None);
        assert!(copy.eq_component(&t));
    }

    #[test]
    fn test_siblings_skip_current() {
        let mut components: Vec<Box<dyn Component>> = vec![
            Box::new(Transform::default()),
            Box::new(Sprite::default()),
            Box::new(Label::default()),
        ];
        let (current, mut siblings) = Siblings::split(&mut components, 1).unwrap();
        assert_eq!(current.kind(), ComponentKind::Sprite);
        assert!(siblings.get::<Sprite>().is_none());
        assert!(siblings.get_mut::<Transform>().is_some());
        assert!(siblings.contains(ComponentKind::Label));
        assert_eq!(siblings.iter().count(), 2);
    }
}
