//! Software rasterizer for PNG export

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use super::glyphs;
use super::shapes;
use super::vertex::Vertex;
use crate::error::Result;
use crate::scene::{Color, DrawOp, Scene};

/// Paint a scene into a new image, one op at a time in z-order
pub fn rasterize(scene: &Scene) -> RgbaImage {
    let bg = scene.background;
    let mut img = RgbaImage::from_pixel(scene.width, scene.height, Rgba([bg.r, bg.g, bg.b, bg.a]));

    for op in &scene.ops {
        match op {
            DrawOp::Text {
                content,
                position,
                size,
                color,
                ..
            } => draw_text(&mut img, content, *position, *size, *color),
            _ => {
                for vertices in shapes::layers(op) {
                    paint(&mut img, &vertices);
                }
            }
        }
    }

    img
}

/// Rasterize and write the scene as a PNG
pub fn export_png(scene: &Scene, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    rasterize(scene).save(path)?;
    log::info!("Wrote {}x{} PNG to {}", scene.width, scene.height, path.display());
    Ok(())
}

/// Fill a single-coloured triangle list. Coverage is gathered first so
/// pixels on shared edges are blended once.
fn paint(img: &mut RgbaImage, vertices: &[Vertex]) {
    let Some(color) = vertices.first().map(Vertex::rgba) else {
        return;
    };
    if vertices.len() < 3 || color.a == 0 {
        return;
    }

    let (w, h) = (img.width() as i64, img.height() as i64);
    let (min, max) = vertices.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), v| (lo.min(v.pos()), hi.max(v.pos())),
    );
    let x0 = (min.x.floor() as i64).max(0);
    let y0 = (min.y.floor() as i64).max(0);
    let x1 = (max.x.ceil() as i64).min(w);
    let y1 = (max.y.ceil() as i64).min(h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = (x1 - x0) as usize;
    let mut mask = vec![false; stride * (y1 - y0) as usize];
    for tri in vertices.chunks_exact(3) {
        cover(&mut mask, stride, (x0, y0, x1, y1), [tri[0].pos(), tri[1].pos(), tri[2].pos()]);
    }

    for (i, _) in mask.iter().enumerate().filter(|(_, hit)| **hit) {
        let x = x0 as u32 + (i % stride) as u32;
        let y = y0 as u32 + (i / stride) as u32;
        let dst = img.get_pixel_mut(x, y);
        *dst = blend(*dst, color);
    }
}

/// Draw a label with the bitmap font, scaled so the glyph height is close
/// to `size`, anchored at its top-centre
fn draw_text(img: &mut RgbaImage, content: &str, position: Vec2, size: f32, color: Color) {
    if color.a == 0 || content.is_empty() {
        return;
    }
    let scale = ((size / glyphs::GLYPH_HEIGHT as f32).round() as i64).max(1);
    let chars = content.chars().count() as i64;
    let width = chars * glyphs::CELL_WIDTH as i64 * scale - scale;
    let left = (position.x - width as f32 / 2.0).round() as i64;
    let top = position.y.round() as i64;
    let (w, h) = (img.width() as i64, img.height() as i64);

    for (i, c) in content.chars().enumerate() {
        let cell_x = left + i as i64 * glyphs::CELL_WIDTH as i64 * scale;
        for (col, row) in glyphs::lit(c) {
            let x0 = cell_x + col as i64 * scale;
            let y0 = top + row as i64 * scale;
            for y in y0.max(0)..(y0 + scale).min(h) {
                for x in x0.max(0)..(x0 + scale).min(w) {
                    let dst = img.get_pixel_mut(x as u32, y as u32);
                    *dst = blend(*dst, color);
                }
            }
        }
    }
}

/// Mark pixels whose centres fall inside the triangle
fn cover(mask: &mut [bool], stride: usize, bounds: (i64, i64, i64, i64), [a, b, c]: [Vec2; 3]) {
    let area = (b - a).perp_dot(c - a);
    if area == 0.0 {
        return;
    }
    let (bx0, by0, bx1, by1) = bounds;
    let lo = a.min(b).min(c);
    let hi = a.max(b).max(c);
    let tx0 = (lo.x.floor() as i64).max(bx0);
    let ty0 = (lo.y.floor() as i64).max(by0);
    let tx1 = (hi.x.ceil() as i64).min(bx1);
    let ty1 = (hi.y.ceil() as i64).min(by1);

    for y in ty0..ty1 {
        for x in tx0..tx1 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            // Barycentric weights, scaled by the signed area
            let w0 = (c - b).perp_dot(p - b) * area.signum();
            let w1 = (a - c).perp_dot(p - c) * area.signum();
            let w2 = (b - a).perp_dot(p - a) * area.signum();
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                mask[(y - by0) as usize * stride + (x - bx0) as usize] = true;
            }
        }
    }
}

/// Source-over with straight alpha
fn blend(dst: Rgba<u8>, src: Color) -> Rgba<u8> {
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mix = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
