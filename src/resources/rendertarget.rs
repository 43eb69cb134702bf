//! Render-target collaborator.
//!
//! Components never rasterize anything themselves; their draw hooks emit
//! [`DrawCommand`]s into a [`RenderTarget`] implemented by the host on top of
//! its rendering library. [`RecordingTarget`] simply keeps the commands, which
//! is what the CLI and the tests use.

use std::sync::Arc;

use crate::components::label::TextStyle;
use crate::primitives::{Color, Rect, Vector2f, Vertex};
use crate::resources::assets::{Font, Texture};

/// One primitive to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad; corners clockwise from the top-left.
    Quad {
        texture: Option<Arc<Texture>>,
        vertices: [Vertex; 4],
    },
    /// Text laid out from the top-left of `bounds`.
    Text {
        font: Option<Arc<Font>>,
        text: String,
        style: TextStyle,
        bounds: Rect,
    },
    /// Untextured filled rectangle.
    Rectangle { bounds: Rect, color: Color },
}

/// Where draw commands go.
pub trait RenderTarget {
    /// Size of the current view in pixels.
    fn view_size(&self) -> Vector2f;

    /// Center of the current view in pixels.
    fn view_center(&self) -> Vector2f {
        let size = self.view_size();
        Vector2f::new(size.x / 2.0, size.y / 2.0)
    }

    fn draw(&mut self, command: DrawCommand);
}

/// Target that records every command in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    pub size: Vector2f,
    pub commands: Vec<DrawCommand>,
}

impl RecordingTarget {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vector2f::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn quads(&self) -> impl Iterator<Item = &[Vertex; 4]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Quad { vertices, .. } => Some(vertices),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl RenderTarget for RecordingTarget {
    fn view_size(&self) -> Vector2f {
        self.size
    }

    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_center_defaults_to_half_size() {
        let target = RecordingTarget::new(800.0, 600.0);
        assert_eq!(target.view_center(), Vector2f::new(400.0, 300.0));
    }

    #[test]
    fn test_records_in_order() {
        let mut target = RecordingTarget::new(10.0, 10.0);
        target.draw(DrawCommand::Rectangle {
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: Color::BLACK,
        });
        target.draw(DrawCommand::Text {
            font: None,
            text: "hi".into(),
            style: TextStyle::default(),
            bounds: Rect::default(),
        });
        assert_eq!(target.commands.len(), 2);
        assert_eq!(target.texts().collect::<Vec<_>>(), vec!["hi"]);
        assert_eq!(target.quads().count(), 0);
    }
}
