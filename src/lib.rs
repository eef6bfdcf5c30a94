//! Sketchbook - generative art sketches
//!
//! Core modules:
//! - `procgen`: Deterministic geometry generators (bolts, dunes, meshes, hex board)
//! - `scene`: Drawable primitives handed to a renderer
//! - `renderer`: Tessellation and PNG rasterization of a scene
//! - `config`: Query-string configuration with clamped parameters
//! - `sketch`: Dispatch from a sketch name to its generator

pub mod config;
pub mod error;
pub mod procgen;
pub mod renderer;
pub mod scene;
pub mod sketch;

pub use config::{ColourScheme, SketchConfig};
pub use error::{Result, SketchError};
pub use scene::{Color, DrawOp, Scene};
pub use sketch::SketchKind;

use glam::Vec2;

/// Sketch constants shared by more than one module
pub mod consts {
    /// √3, for equilateral triangle and hexagon geometry
    pub const SQRT_3: f32 = 1.732_050_8;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Round to the nearest integer, ties toward +∞
#[inline]
pub fn round_half_up(x: f32) -> f32 {
    (x + 0.5).floor()
}

/// Draw a uniform value in `[-limit, limit)`; returns 0 when the range is empty
#[inline]
pub fn jitter<R: rand::Rng + ?Sized>(rng: &mut R, limit: f32) -> f32 {
    if limit > 0.0 {
        rng.random_range(-limit..limit)
    } else {
        0.0
    }
}
