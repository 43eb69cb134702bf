//! Transform component.
//!
//! Placement of an entity in view space: top-left position, unscaled size,
//! per-axis scale and a clockwise rotation in degrees around the center of
//! the scaled bounds.

use log::warn;

use crate::components::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::error::SerializeResult;
use crate::primitives::{Rect, Vector2f, rotate_around};
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub base: ComponentBase,
    position: Vector2f,
    size: Vector2f,
    scale: Vector2f,
    rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Vector2f::ZERO,
            size: Vector2f::ONE,
            scale: Vector2f::ONE,
            rotation: 0.0,
        }
    }
}

/// Replace non-positive or non-finite axes with 1.0.
fn positive_axes(value: Vector2f, what: &str) -> Vector2f {
    let fix = |v: f32| {
        if v.is_finite() && v > 0.0 {
            v
        } else {
            warn!("Transform {what} must be positive, got {v}, using 1.0");
            1.0
        }
    };
    Vector2f::new(fix(value.x), fix(value.y))
}

impl Transform {
    pub fn new(position: Vector2f, size: Vector2f) -> Self {
        let mut transform = Self::default();
        transform.set_position(position);
        transform.set_size(size);
        transform
    }

    pub fn position(&self) -> Vector2f {
        self.position
    }

    pub fn set_position(&mut self, position: Vector2f) {
        self.position = position;
    }

    pub fn translate(&mut self, offset: Vector2f) {
        self.position.x += offset.x;
        self.position.y += offset.y;
    }

    pub fn size(&self) -> Vector2f {
        self.size
    }

    pub fn set_size(&mut self, size: Vector2f) {
        self.size = positive_axes(size, "size");
    }

    pub fn scale(&self) -> Vector2f {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector2f) {
        self.scale = positive_axes(scale, "scale");
    }

    /// Rotation in degrees, clockwise.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Wrapped into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f32) {
        let wrapped = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        // rem_euclid rounds tiny negative angles up to exactly 360.
        self.rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }

    /// Scaled, unrotated bounds.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.x * self.scale.x,
            self.size.y * self.scale.y,
        )
    }

    /// Screen-space corners clockwise from the top-left, rotation applied.
    pub fn corners(&self) -> [Vector2f; 4] {
        let bounds = self.bounds();
        let center = bounds.center();
        bounds
            .corners()
            .map(|corner| rotate_around(corner, center, self.rotation))
    }

    /// Whether `point` lies inside the rotated bounds.
    pub fn contains(&self, point: Vector2f) -> bool {
        let bounds = self.bounds();
        let local = rotate_around(point, bounds.center(), -self.rotation);
        bounds.contains(local)
    }
}

impl BinarySerializable for Transform {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        self.base.write_binary(w)?;
        w.write(&self.position)?;
        w.write(&self.size)?;
        w.write(&self.scale)?;
        w.write_f32(self.rotation)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let base = ComponentBase::read_binary(r)?;
        let position = r.read()?;
        let size = r.read()?;
        let scale = r.read()?;
        let rotation = r.read_f32()?;
        let mut transform = Self {
            base,
            position,
            ..Self::default()
        };
        transform.set_size(size);
        transform.set_scale(scale);
        transform.set_rotation(rotation);
        Ok(transform)
    }
}

impl XmlSerializable for Transform {
    const ELEMENT: &'static str = "Transform";

    fn to_element(&self) -> XmlElement {
        self.base
            .element(Self::ELEMENT)
            .attr("Rotation", self.rotation)
            .child(self.position.to_named_element("Position"))
            .child(self.size.to_named_element("Size"))
            .child(self.scale.to_named_element("Scale"))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        let mut transform = Self {
            base: ComponentBase::from_node(node)?,
            position: Vector2f::from_node(xml::child(node, "Position")?)?,
            ..Self::default()
        };
        transform.set_size(Vector2f::from_node(xml::child(node, "Size")?)?);
        transform.set_scale(Vector2f::from_node(xml::child(node, "Scale")?)?);
        transform.set_rotation(xml::float_attr(node, "Rotation")?);
        Ok(transform)
    }
}

impl_xml_display!(Transform);

impl ComponentType for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

impl Component for Transform {
    super::component_boilerplate!(Transform);
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_bounds_apply_scale() {
        let mut t = Transform::new(Vector2f::new(10.0, 20.0), Vector2f::new(32.0, 16.0));
        t.set_scale(Vector2f::new(2.0, 0.5));
        assert_eq!(t.bounds(), Rect::new(10.0, 20.0, 64.0, 8.0));
    }

    #[test]
    fn test_non_positive_size_uses_one() {
        let mut t = Transform::default();
        t.set_size(Vector2f::new(0.0, -3.0));
        assert_eq!(t.size(), Vector2f::ONE);
        t.set_scale(Vector2f::new(2.0, f32::NAN));
        assert_eq!(t.scale(), Vector2f::new(2.0, 1.0));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut t = Transform::default();
        t.set_rotation(-90.0);
        assert!(approx_eq(t.rotation(), 270.0));
        t.set_rotation(720.0);
        assert!(approx_eq(t.rotation(), 0.0));
    }

    #[test]
    fn test_tiny_negative_rotation_wraps_below_360() {
        let mut t = Transform::default();
        t.set_rotation(-1e-6);
        assert!(t.rotation() < 360.0);
        assert_eq!(Transform::from_bytes(&t.to_bytes().unwrap()).unwrap(), t);
        assert_eq!(Transform::from_xml_str(&t.to_xml()).unwrap(), t);
    }

    #[test]
    fn test_contains_respects_rotation() {
        let mut t = Transform::new(Vector2f::ZERO, Vector2f::new(40.0, 10.0));
        assert!(t.contains(Vector2f::new(35.0, 5.0)));
        t.set_rotation(90.0);
        // Rotated around (20, 5): now spans x 15..25, y -15..25.
        assert!(!t.contains(Vector2f::new(35.0, 5.0)));
        assert!(t.contains(Vector2f::new(20.0, 20.0)));
    }

    #[test]
    fn test_corners_rotate_clockwise() {
        let mut t = Transform::new(Vector2f::ZERO, Vector2f::new(2.0, 2.0));
        t.set_rotation(90.0);
        let corners = t.corners();
        // Top-left moves to where top-right was.
        assert!(approx_eq(corners[0].x, 2.0));
        assert!(approx_eq(corners[0].y, 0.0));
    }

    #[test]
    fn test_round_trips() {
        let mut t = Transform::new(Vector2f::new(1.5, -2.0), Vector2f::new(8.0, 4.0));
        t.set_scale(Vector2f::new(3.0, 3.0));
        t.set_rotation(45.0);
        t.base.visible = false;
        assert_eq!(Transform::from_bytes(&t.to_bytes().unwrap()).unwrap(), t);
        assert_eq!(Transform::from_xml_str(&t.to_xml()).unwrap(), t);
    }

    #[test]
    fn test_xml_missing_position_fails() {
        let text = r#"<Transform Enabled="true" Visible="true" Rotation="0"><Size X="1" Y="1"/><Scale X="1" Y="1"/></Transform>"#;
        assert!(Transform::from_xml_str(text).is_err());
    }
}
