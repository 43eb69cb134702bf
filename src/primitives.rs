//! Geometry and color value types shared by every component.
//!
//! These stand in for the rendering library's own vector/rect/color types so
//! that data stays serializable without a rendering backend.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SerializeError, SerializeResult};
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{BinaryReader, BinarySerializable, BinaryWriter};

/// 2D float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

impl Vector2f {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Element as `<name X=".." Y=".."/>`.
    pub fn to_named_element(self, name: &str) -> XmlElement {
        XmlElement::new(name).attr("X", self.x).attr("Y", self.y)
    }

    pub fn from_node(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        Ok(Self::new(
            xml::float_attr(node, "X")?,
            xml::float_attr(node, "Y")?,
        ))
    }
}

impl BinarySerializable for Vector2f {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_f32(self.x)?;
        w.write_f32(self.y)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self::new(r.read_f32()?, r.read_f32()?))
    }
}

/// 2D unsigned vector (texture sizes, tile sizes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Vector2u {
    pub x: u32,
    pub y: u32,
}

impl Vector2u {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn to_named_element(self, name: &str) -> XmlElement {
        XmlElement::new(name).attr("X", self.x).attr("Y", self.y)
    }

    pub fn from_node(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        Ok(Self::new(xml::attr(node, "X")?, xml::attr(node, "Y")?))
    }
}

impl BinarySerializable for Vector2u {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_u32(self.x)?;
        w.write_u32(self.y)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self::new(r.read_u32()?, r.read_u32()?))
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> Vector2f {
        Vector2f::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains(&self, point: Vector2f) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Corners clockwise from top-left.
    pub fn corners(&self) -> [Vector2f; 4] {
        [
            Vector2f::new(self.left, self.top),
            Vector2f::new(self.right(), self.top),
            Vector2f::new(self.right(), self.bottom()),
            Vector2f::new(self.left, self.bottom()),
        ]
    }

    pub fn to_named_element(self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("Left", self.left)
            .attr("Top", self.top)
            .attr("Width", self.width)
            .attr("Height", self.height)
    }

    pub fn from_node(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        Ok(Self::new(
            xml::float_attr(node, "Left")?,
            xml::float_attr(node, "Top")?,
            xml::float_attr(node, "Width")?,
            xml::float_attr(node, "Height")?,
        ))
    }
}

impl BinarySerializable for Rect {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_f32(self.left)?;
        w.write_f32(self.top)?;
        w.write_f32(self.width)?;
        w.write_f32(self.height)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self::new(
            r.read_f32()?,
            r.read_f32()?,
            r.read_f32()?,
            r.read_f32()?,
        ))
    }
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const LIGHT_GRAY: Self = Self::new(200, 200, 200, 255);
    pub const GRAY: Self = Self::new(128, 128, 128, 255);
    pub const GREEN: Self = Self::new(0, 200, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_named_element(self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("R", self.r)
            .attr("G", self.g)
            .attr("B", self.b)
            .attr("A", self.a)
    }

    pub fn from_node(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        Ok(Self::new(
            xml::attr(node, "R")?,
            xml::attr(node, "G")?,
            xml::attr(node, "B")?,
            xml::attr(node, "A")?,
        ))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl BinarySerializable for Color {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_color(*self)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        r.read_color()
    }
}

/// One of the four cardinal directions.
///
/// Used both as an image orientation (which way the top of the source image
/// faces on screen) and as a fill direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Quarter turns clockwise from [`Direction::Up`].
    pub fn quarter_turns(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Right => "Right",
            Direction::Down => "Down",
            Direction::Left => "Left",
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SerializeError::invalid(format!("unknown direction '{s}'")))
    }
}

impl BinarySerializable for Direction {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_u32(*self as u32)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let raw = r.read_u32()?;
        Self::from_u32(raw).ok_or_else(|| SerializeError::invalid(format!("unknown direction {raw}")))
    }
}

/// A textured, colored point handed to the render target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vector2f,
    pub tex_coords: Vector2f,
    pub color: Color,
}

/// Truncate a duration to the microsecond resolution used on disk.
pub fn micros_resolution(value: Duration) -> Duration {
    Duration::from_micros(u64::try_from(value.as_micros()).unwrap_or(u64::MAX))
}

/// Rotate `point` around `center` by `degrees` clockwise (screen space, y down).
pub fn rotate_around(point: Vector2f, center: Vector2f, degrees: f32) -> Vector2f {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Vector2f::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}
