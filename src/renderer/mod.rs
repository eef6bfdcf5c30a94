//! Scene rendering
//!
//! Scenes are tessellated into coloured triangles (`shapes`) and filled in
//! software for PNG export (`raster`). Labels use a small bitmap font
//! (`glyphs`).

pub mod glyphs;
pub mod raster;
pub mod shapes;
pub mod vertex;

pub use raster::{export_png, rasterize};
pub use vertex::Vertex;
