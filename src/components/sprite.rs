//! Sprite component and image descriptors.
//!
//! A [`Sprite`] draws one textured quad covering its entity's
//! [`Transform`] bounds. What part of which texture is shown, and how it is
//! tinted, rotated and flipped, lives in its [`ImageInfo`]. The quad is
//! rebuilt in `refresh` and on every update so it follows the transform.

use arrayvec::ArrayVec;
use log::warn;

use crate::components::transform::Transform;
use crate::components::{Component, ComponentBase, ComponentKind, ComponentType, DrawContext, Siblings};
use crate::error::{ArgumentError, SerializeResult};
use crate::primitives::{Color, Direction, Rect, Vector2f, Vertex};
use crate::resources::animation::Frame;
use crate::resources::assets::{Assets, normalize_path};
use crate::resources::rendertarget::DrawCommand;
use crate::resources::tileset::Tileset;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Texture region plus display modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Texture path resolved through [`Assets`].
    pub texture: String,
    pub rect: Rect,
    pub color: Color,
    pub orientation: Direction,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self {
            texture: String::new(),
            rect: Rect::default(),
            color: Color::WHITE,
            orientation: Direction::Up,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl ImageInfo {
    pub fn new(texture: &str, rect: Rect) -> Self {
        Self {
            texture: normalize_path(texture),
            rect,
            ..Self::default()
        }
    }

    /// Take the region and modifiers of an animation frame, keeping the texture.
    pub fn apply_frame(&mut self, frame: &Frame) {
        self.rect = frame.rect;
        self.color = frame.color;
        self.orientation = frame.orientation;
        self.flip_horizontal = frame.flip_horizontal;
        self.flip_vertical = frame.flip_vertical;
    }

    /// Texture coordinates for screen corners clockwise from the top-left.
    ///
    /// Flips swap corners across the vertical (horizontal flip) or horizontal
    /// (vertical flip) axis; each quarter turn of orientation gives screen
    /// corner `i` the texture corner `i + 3` (mod 4).
    pub fn tex_coords(&self) -> [Vector2f; 4] {
        let mut corners = self.rect.corners();
        if self.flip_horizontal {
            corners = [corners[1], corners[0], corners[3], corners[2]];
        }
        if self.flip_vertical {
            corners = [corners[3], corners[2], corners[1], corners[0]];
        }
        let turns = self.orientation.quarter_turns();
        std::array::from_fn(|i| corners[(i + 3 * turns) % 4])
    }
}

impl BinarySerializable for ImageInfo {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.texture)?;
        w.write(&self.rect)?;
        w.write_color(self.color)?;
        w.write(&self.orientation)?;
        w.write_bool(self.flip_horizontal)?;
        w.write_bool(self.flip_vertical)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            texture: r.read_string()?,
            rect: r.read()?,
            color: r.read_color()?,
            orientation: r.read()?,
            flip_horizontal: r.read_bool()?,
            flip_vertical: r.read_bool()?,
        })
    }
}

impl XmlSerializable for ImageInfo {
    const ELEMENT: &'static str = "ImageInfo";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Texture", &self.texture)
            .attr("Orientation", self.orientation)
            .attr("FlipHorizontal", self.flip_horizontal)
            .attr("FlipVertical", self.flip_vertical)
            .child(self.rect.to_named_element("Rect"))
            .child(self.color.to_named_element("Color"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            texture: xml::attr_str(node, "Texture")?.to_string(),
            rect: Rect::from_node(xml::child(node, "Rect")?)?,
            color: Color::from_node(xml::child(node, "Color")?)?,
            orientation: xml::attr(node, "Orientation")?,
            flip_horizontal: xml::attr(node, "FlipHorizontal")?,
            flip_vertical: xml::attr(node, "FlipVertical")?,
        })
    }
}

/// Texture region and tint without orientation or flips (check marks,
/// decorations).
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteInfo {
    pub texture: String,
    pub rect: Rect,
    pub color: Color,
}

impl Default for SpriteInfo {
    fn default() -> Self {
        Self {
            texture: String::new(),
            rect: Rect::default(),
            color: Color::WHITE,
        }
    }
}

impl SpriteInfo {
    pub fn new(texture: &str, rect: Rect, color: Color) -> Self {
        Self {
            texture: normalize_path(texture),
            rect,
            color,
        }
    }

    /// Quad showing this image over `corners` (clockwise from the top-left).
    pub fn quad(&self, corners: [Vector2f; 4]) -> [Vertex; 4] {
        let tex = self.rect.corners();
        std::array::from_fn(|i| Vertex {
            position: corners[i],
            tex_coords: tex[i],
            color: self.color,
        })
    }
}

impl BinarySerializable for SpriteInfo {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.texture)?;
        w.write(&self.rect)?;
        w.write_color(self.color)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            texture: r.read_string()?,
            rect: r.read()?,
            color: r.read_color()?,
        })
    }
}

impl XmlSerializable for SpriteInfo {
    const ELEMENT: &'static str = "SpriteInfo";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Texture", &self.texture)
            .child(self.rect.to_named_element("Rect"))
            .child(self.color.to_named_element("Color"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            texture: xml::attr_str(node, "Texture")?.to_string(),
            rect: Rect::from_node(xml::child(node, "Rect")?)?,
            color: Color::from_node(xml::child(node, "Color")?)?,
        })
    }
}

/// Textured quad over the entity's transform.
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    pub base: ComponentBase,
    image: ImageInfo,
    vertices: ArrayVec<Vertex, 4>,
}

impl PartialEq for Sprite {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.image == other.image
    }
}

impl Sprite {
    pub fn new(image: ImageInfo) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }

    pub fn image(&self) -> &ImageInfo {
        &self.image
    }

    /// Mutable image; the quad picks up changes on the next refresh/update.
    pub fn image_mut(&mut self) -> &mut ImageInfo {
        &mut self.image
    }

    pub fn set_image(&mut self, image: ImageInfo) {
        self.image = image;
    }

    pub fn set_color(&mut self, color: Color) {
        self.image.color = color;
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
    }

    /// Current quad; empty until refreshed against a transform.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Point the sprite at a texture. With `reset_rect` the region becomes
    /// the whole texture, sized through `assets`.
    ///
    /// Returns whether the texture could be resolved.
    pub fn set_texture(&mut self, path: &str, assets: &mut Assets, reset_rect: bool) -> bool {
        self.image.texture = normalize_path(path);
        let Some(size) = assets.texture_size(&self.image.texture) else {
            warn!("Sprite texture '{}' could not be resolved", self.image.texture);
            return false;
        };
        if reset_rect {
            self.image.rect = Rect::new(0.0, 0.0, size.x as f32, size.y as f32);
        }
        true
    }

    /// Show tile `index` of `tileset`.
    pub fn use_tile(
        &mut self,
        tileset: &Tileset,
        index: u32,
        assets: &mut Assets,
    ) -> Result<(), ArgumentError> {
        let size = assets.texture_size(&tileset.texture).unwrap_or_default();
        let rect = tileset
            .tile_rect(index, size)
            .ok_or(ArgumentError::OutOfRange {
                index: index as usize,
                count: tileset.tile_count(size) as usize,
            })?;
        self.image.texture = normalize_path(&tileset.texture);
        self.image.rect = rect;
        Ok(())
    }

    /// Rebuild the quad from a transform; no transform means no quad.
    pub fn rebuild(&mut self, transform: Option<&Transform>) {
        self.vertices.clear();
        let Some(transform) = transform else {
            return;
        };
        let positions = transform.corners();
        let tex_coords = self.image.tex_coords();
        for i in 0..4 {
            self.vertices.push(Vertex {
                position: positions[i],
                tex_coords: tex_coords[i],
                color: self.image.color,
            });
        }
    }
}

impl BinarySerializable for Sprite {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write(&self.image)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            base: ComponentBase::read_binary(r)?,
            image: r.read()?,
            vertices: ArrayVec::new(),
        })
    }
}

impl XmlSerializable for Sprite {
    const ELEMENT: &'static str = "Sprite";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .child(self.image.to_element())
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            base: ComponentBase::from_node(node)?,
            image: ImageInfo::from_element(xml::child(node, ImageInfo::ELEMENT)?)?,
            vertices: ArrayVec::new(),
        })
    }
}

impl_xml_display!(ImageInfo, SpriteInfo, Sprite);

impl ComponentType for Sprite {
    const KIND: ComponentKind = ComponentKind::Sprite;
}

impl Component for Sprite {
    super::component_boilerplate!(Sprite);

    fn refresh(&mut self, siblings: &mut Siblings<'_>) {
        self.rebuild(siblings.get::<Transform>());
    }

    fn update(&mut self, _dt: std::time::Duration, siblings: &mut Siblings<'_>) {
        self.rebuild(siblings.get::<Transform>());
    }

    fn draw(&self, cx: &mut DrawContext<'_>) {
        let Ok(vertices) = <[Vertex; 4]>::try_from(self.vertices.as_slice()) else {
            return;
        };
        let texture = cx.assets.textures.get(&self.image.texture);
        cx.target.draw(DrawCommand::Quad { texture, vertices });
    }

    fn dispose(&mut self) {
        self.vertices.clear();
    }
}
