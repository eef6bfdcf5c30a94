//! Vertex type for 2D tessellation

use glam::Vec2;

use crate::scene::Color;

/// 2D vertex with position and straight (non-premultiplied) RGBA colour
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::from(self.position)
    }

    /// Colour back in 8-bit channels
    pub fn rgba(&self) -> Color {
        Color::from_f32(self.color)
    }
}
