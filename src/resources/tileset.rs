//! Tileset description.
//!
//! A [`Tileset`] slices a texture into equally sized tiles laid out in rows.
//! Tiles are numbered left to right, top to bottom, starting at the
//! `offset` pixel and separated by `padding` pixels.

use crate::error::SerializeResult;
use crate::primitives::{Rect, Vector2u};
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tileset {
    /// Texture path resolved through [`Assets`](crate::resources::assets::Assets).
    pub texture: String,
    /// Size of a tile in pixels.
    pub tile_size: Vector2u,
    /// Top-left pixel of the first tile.
    pub offset: Vector2u,
    /// Gap between adjacent tiles in pixels.
    pub padding: Vector2u,
}

impl Tileset {
    pub fn new(texture: impl Into<String>, tile_size: Vector2u) -> Self {
        Self {
            texture: texture.into(),
            tile_size,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: Vector2u) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_padding(mut self, padding: Vector2u) -> Self {
        self.padding = padding;
        self
    }

    fn fit(available: u32, offset: u32, tile: u32, padding: u32) -> u32 {
        if tile == 0 || available < offset.saturating_add(tile) {
            return 0;
        }
        1 + (available - offset - tile) / (tile + padding)
    }

    /// Tiles per row and per column for a texture of the given size.
    pub fn grid(&self, texture_size: Vector2u) -> Vector2u {
        Vector2u::new(
            Self::fit(texture_size.x, self.offset.x, self.tile_size.x, self.padding.x),
            Self::fit(texture_size.y, self.offset.y, self.tile_size.y, self.padding.y),
        )
    }

    pub fn columns(&self, texture_size: Vector2u) -> u32 {
        self.grid(texture_size).x
    }

    pub fn tile_count(&self, texture_size: Vector2u) -> u32 {
        let grid = self.grid(texture_size);
        grid.x * grid.y
    }

    /// Texture region of tile `index`, or `None` past the last tile.
    pub fn tile_rect(&self, index: u32, texture_size: Vector2u) -> Option<Rect> {
        if index >= self.tile_count(texture_size) {
            return None;
        }
        let columns = self.columns(texture_size);
        let (col, row) = (index % columns, index / columns);
        Some(Rect::new(
            (self.offset.x + col * (self.tile_size.x + self.padding.x)) as f32,
            (self.offset.y + row * (self.tile_size.y + self.padding.y)) as f32,
            self.tile_size.x as f32,
            self.tile_size.y as f32,
        ))
    }
}

impl BinarySerializable for Tileset {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.texture)?;
        w.write(&self.tile_size)?;
        w.write(&self.offset)?;
        w.write(&self.padding)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            texture: r.read_string()?,
            tile_size: r.read()?,
            offset: r.read()?,
            padding: r.read()?,
        })
    }
}

impl XmlSerializable for Tileset {
    const ELEMENT: &'static str = "Tileset";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Texture", &self.texture)
            .child(self.tile_size.to_named_element("TileSize"))
            .child(self.offset.to_named_element("Offset"))
            .child(self.padding.to_named_element("Padding"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            texture: xml::attr_str(node, "Texture")?.to_string(),
            tile_size: Vector2u::from_node(xml::child(node, "TileSize")?)?,
            offset: Vector2u::from_node(xml::child(node, "Offset")?)?,
            padding: Vector2u::from_node(xml::child(node, "Padding")?)?,
        })
    }
}

impl_xml_display!(Tileset);
