//! Sprite-sheet frames and animations.
//!
//! A [`Frame`] is one cell of a sprite sheet together with how long it stays
//! on screen and how it is tinted, rotated and flipped. An [`Animation`] is a
//! named, ordered sequence of frames; insertion order is playback order.
//!
//! # XML shape
//!
//! ```xml
//! <Animation ID="walk">
//!   <Frame Length="0.25" Orientation="Up" FlipHorizontal="false" FlipVertical="false">
//!     <Rect Left="0" Top="0" Width="32" Height="32"/>
//!     <Color R="255" G="255" B="255" A="255"/>
//!   </Frame>
//! </Animation>
//! ```

use std::time::Duration;

use crate::error::{ArgumentError, SerializeResult};
use crate::primitives::{Color, Direction, Rect, micros_resolution};
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Identifier validity: not empty and not only whitespace.
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty()
}

/// Validate an identifier, returning it on success.
pub fn validate_id(id: impl Into<String>) -> Result<String, ArgumentError> {
    let id = id.into();
    if is_valid_id(&id) {
        Ok(id)
    } else {
        Err(ArgumentError::InvalidIdentifier(id))
    }
}

/// One sprite-sheet cell plus display duration and visual modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Texture region.
    pub rect: Rect,
    length: Duration,
    /// Tint.
    pub color: Color,
    /// Which way the top of the region faces when drawn.
    pub orientation: Direction,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            length: Duration::ZERO,
            color: Color::WHITE,
            orientation: Direction::Up,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl Frame {
    /// Frame showing `rect` for `length`, untinted and unflipped.
    pub fn new(rect: Rect, length: Duration) -> Self {
        Self {
            rect,
            length: micros_resolution(length),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_orientation(mut self, orientation: Direction) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_flip(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
        self
    }

    /// Display duration.
    pub fn length(&self) -> Duration {
        self.length
    }

    /// Set the display duration, truncated to microseconds.
    pub fn set_length(&mut self, length: Duration) {
        self.length = micros_resolution(length);
    }
}

impl BinarySerializable for Frame {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write(&self.rect)?;
        w.write_duration(self.length)?;
        w.write_color(self.color)?;
        w.write(&self.orientation)?;
        w.write_bool(self.flip_horizontal)?;
        w.write_bool(self.flip_vertical)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            rect: r.read()?,
            length: r.read_duration()?,
            color: r.read_color()?,
            orientation: r.read()?,
            flip_horizontal: r.read_bool()?,
            flip_vertical: r.read_bool()?,
        })
    }
}

impl XmlSerializable for Frame {
    const ELEMENT: &'static str = "Frame";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Length", xml::format_duration(self.length))
            .attr("Orientation", self.orientation)
            .attr("FlipHorizontal", self.flip_horizontal)
            .attr("FlipVertical", self.flip_vertical)
            .child(self.rect.to_named_element("Rect"))
            .child(self.color.to_named_element("Color"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            length: xml::duration_attr(node, "Length")?,
            orientation: xml::attr(node, "Orientation")?,
            flip_horizontal: xml::attr(node, "FlipHorizontal")?,
            flip_vertical: xml::attr(node, "FlipVertical")?,
            rect: Rect::from_node(xml::child(node, "Rect")?)?,
            color: Color::from_node(xml::child(node, "Color")?)?,
        })
    }
}

/// Named, ordered sequence of frames.
#[derive(Debug, Clone)]
pub struct Animation {
    id: String,
    frames: Vec<Frame>,
}

impl Animation {
    /// Empty animation; fails when `id` is not a valid identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ArgumentError> {
        Ok(Self {
            id: validate_id(id)?,
            frames: Vec::new(),
        })
    }

    /// Animation with the given frames, in playback order.
    pub fn with_frames(
        id: impl Into<String>,
        frames: impl IntoIterator<Item = Frame>,
    ) -> Result<Self, ArgumentError> {
        let mut animation = Self::new(id)?;
        animation.frames.extend(frames);
        Ok(animation)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> Result<(), ArgumentError> {
        self.id = validate_id(id)?;
        Ok(())
    }

    /// Lower-cased identifier used as the lookup key in an
    /// [`AnimationSet`](crate::resources::animationstore::AnimationSet).
    pub fn key(&self) -> String {
        self.id.to_lowercase()
    }

    pub fn count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total duration: the sum of every frame's length.
    pub fn length(&self) -> Duration {
        self.frames.iter().map(Frame::length).sum()
    }

    /// Append a frame at the end of the sequence.
    pub fn add(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Insert a frame before `index`; `index == count` appends.
    pub fn insert(&mut self, index: usize, frame: Frame) -> Result<(), ArgumentError> {
        if index > self.frames.len() {
            return Err(ArgumentError::OutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        self.frames.insert(index, frame);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&Frame, ArgumentError> {
        let count = self.frames.len();
        self.frames
            .get(index)
            .ok_or(ArgumentError::OutOfRange { index, count })
    }

    pub fn set(&mut self, index: usize, frame: Frame) -> Result<(), ArgumentError> {
        let count = self.frames.len();
        let slot = self
            .frames
            .get_mut(index)
            .ok_or(ArgumentError::OutOfRange { index, count })?;
        *slot = frame;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Frame, ArgumentError> {
        if index >= self.frames.len() {
            return Err(ArgumentError::OutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        Ok(self.frames.remove(index))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl PartialEq for Animation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.frames == other.frames
    }
}

impl<'a> IntoIterator for &'a Animation {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl BinarySerializable for Animation {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.id)?;
        w.write_len(self.frames.len())?;
        for frame in &self.frames {
            w.write(frame)?;
        }
        Ok(())
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let id = validate_id(r.read_string()?)?;
        let frames = r.read_vec()?;
        Ok(Self { id, frames })
    }
}

impl XmlSerializable for Animation {
    const ELEMENT: &'static str = "Animation";

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT).attr("ID", &self.id);
        for frame in &self.frames {
            element.push(frame.to_element());
        }
        element
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        let id = validate_id(xml::attr_str(node, "ID")?)?;
        let frames = xml::child_elements(node)
            .map(Frame::from_element)
            .collect::<SerializeResult<Vec<_>>>()?;
        Ok(Self { id, frames })
    }
}

impl_xml_display!(Frame, Animation);

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ms: u64) -> Frame {
        Frame::new(Rect::new(0.0, 0.0, 16.0, 16.0), Duration::from_millis(ms))
    }

    #[test]
    fn test_invalid_ids_rejected() {
        assert!(Animation::new("").is_err());
        assert!(Animation::new("   ").is_err());
        assert!(Animation::new("\t\n").is_err());
        assert!(Animation::new("walk").is_ok());
    }

    #[test]
    fn test_length_is_sum_of_frames() {
        let anim = Animation::with_frames("walk", [frame(100), frame(250), frame(650)]).unwrap();
        assert_eq!(anim.length(), Duration::from_secs(1));
        assert_eq!(anim.count(), 3);
    }

    #[test]
    fn test_frames_keep_insertion_order() {
        let mut anim = Animation::new("walk").unwrap();
        for ms in [30, 10, 20] {
            anim.add(frame(ms));
        }
        let lengths: Vec<_> = anim.iter().map(|f| f.length().as_millis()).collect();
        assert_eq!(lengths, vec![30, 10, 20]);
    }

    #[test]
    fn test_get_and_set_out_of_range() {
        let mut anim = Animation::with_frames("walk", [frame(10)]).unwrap();
        assert_eq!(
            anim.get(1).unwrap_err(),
            ArgumentError::OutOfRange { index: 1, count: 1 }
        );
        assert!(anim.set(1, frame(20)).is_err());
        assert!(anim.set(0, frame(20)).is_ok());
        assert_eq!(anim.get(0).unwrap().length(), Duration::from_millis(20));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut anim = Animation::with_frames("walk", [frame(10), frame(30)]).unwrap();
        anim.insert(1, frame(20)).unwrap();
        assert!(anim.insert(4, frame(40)).is_err());
        assert_eq!(anim.remove(0).unwrap().length(), Duration::from_millis(10));
        assert!(anim.remove(5).is_err());
        assert_eq!(anim.count(), 2);
    }

    #[test]
    fn test_equality_ignores_id_case() {
        let a = Animation::with_frames("Walk", [frame(10)]).unwrap();
        let b = Animation::with_frames("WALK", [frame(10)]).unwrap();
        let c = Animation::with_frames("walk", [frame(11)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = Animation::with_frames("walk", [frame(10)]).unwrap();
        let mut b = a.clone();
        b.add(frame(20));
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 2);
    }

    #[test]
    fn test_frame_xml_shape() {
        let f = frame(1500).with_orientation(Direction::Left);
        let text = f.to_xml();
        assert!(text.starts_with(r#"<Frame Length="1.5" Orientation="Left""#));
        assert!(text.contains("<Rect "));
        assert_eq!(Frame::from_xml_str(&text).unwrap(), f);
    }

    #[test]
    fn test_frame_xml_missing_rect_fails() {
        let text = r#"<Frame Length="1" Orientation="Up" FlipHorizontal="false" FlipVertical="false"><Color R="1" G="1" B="1" A="1"/></Frame>"#;
        assert!(Frame::from_xml_str(text).is_err());
    }

    #[test]
    fn test_load_failure_keeps_previous_value() {
        let mut anim = Animation::with_frames("walk", [frame(10)]).unwrap();
        let before = anim.clone();
        let doc = roxmltree::Document::parse(r#"<Animation ID=" "/>"#).unwrap();
        assert!(anim.load_from_xml(doc.root_element()).is_err());
        assert_eq!(anim, before);
    }

    #[test]
    fn test_binary_round_trip_with_modifiers() {
        let anim = Animation::with_frames(
            "attack",
            [
                frame(100).with_flip(true, false),
                frame(200).with_color(Color::new(10, 20, 30, 40)),
            ],
        )
        .unwrap();
        let bytes = anim.to_bytes().unwrap();
        assert_eq!(Animation::from_bytes(&bytes).unwrap(), anim);
    }
}
