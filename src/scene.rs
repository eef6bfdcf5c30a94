//! Drawable primitives produced by the generators
//!
//! A `Scene` is an ordered list of draw operations; later operations paint
//! over earlier ones. Renderers consume it as-is.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Build a colour from unbounded channel values, clamping each to [0, 255]
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Self::rgb(c(r), c(g), c(b))
    }

    /// Linear interpolation towards `other` (t = 0 gives self, t = 1 gives other)
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Normalized RGBA for vertices
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn from_f32(c: [f32; 4]) -> Self {
        let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Color {
            r: q(c[0]),
            g: q(c[1]),
            b: q(c[2]),
            a: q(c[3]),
        }
    }
}

/// Outline applied to a filled polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

/// A single draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Open stroked path
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    /// Closed filled path, optionally outlined
    Polygon {
        points: Vec<Vec2>,
        fill: Color,
        stroke: Option<Stroke>,
    },
    /// Filled disc
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Text label anchored at its top-centre
    Text {
        content: String,
        position: Vec2,
        size: f32,
        font: String,
        color: Color,
    },
}

/// Everything a renderer needs to draw one sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Axis-aligned filled rectangle
    pub fn rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.push(DrawOp::Polygon {
            points: vec![
                min,
                Vec2::new(min.x + size.x, min.y),
                min + size,
                Vec2::new(min.x, min.y + size.y),
            ],
            fill: color,
            stroke: None,
        });
    }

    /// Straight stroked segment
    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color) {
        self.push(DrawOp::Polyline {
            points: vec![a, b],
            width,
            color,
        });
    }
}

/// Sample a Catmull-Rom spline through `points`, `steps` samples per span
///
/// The end points are repeated as their own control points, so the curve
/// starts and ends exactly on the first and last input point.
pub fn catmull_rom(points: &[Vec2], steps: usize) -> Vec<Vec2> {
    if points.len() < 3 || steps == 0 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut out = Vec::with_capacity(last * steps + 1);
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        for s in 0..steps {
            let t = s as f32 / steps as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let p = 0.5
                * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
            out.push(p);
        }
    }
    out.push(points[last]);
    out
}
