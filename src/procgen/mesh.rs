//! Papier-mache triangle mesh
//!
//! A triangular lattice is laid out column by column over (and past) the
//! canvas, triangulated while it is walked, then jittered and pushed
//! through a nonlinear warp that stretches geometry towards the right.
//!
//! Connectivity is always computed on the lattice coordinates; the jittered
//! "displayed" coordinates only move where triangles are drawn.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SketchConfig;
use crate::consts::SQRT_3;
use crate::error::{Result, SketchError};
use crate::scene::{Color, DrawOp, Scene, Stroke};
use crate::{jitter, round_half_up};

/// A lattice vertex and where it is actually drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshPoint {
    pub lattice: Vec2,
    pub displayed: Vec2,
}

impl MeshPoint {
    pub fn new(lattice: Vec2) -> Self {
        Self {
            lattice,
            displayed: lattice,
        }
    }
}

/// Position of a point inside `Mesh::columns`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeIndex {
    pub column: usize,
    pub row: usize,
}

impl LatticeIndex {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// Three points of the owning mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [LatticeIndex; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub canvas: Vec2,
    pub side_length: f32,
    pub columns: Vec<Vec<MeshPoint>>,
    pub triangles: Vec<Triangle>,
}

/// Horizontal distance between lattice columns
pub fn column_step(side_length: f32) -> f32 {
    round_half_up(side_length * SQRT_3 / 2.0)
}

/// Lay out the lattice and stitch its triangles
///
/// The lattice extends from `-side` to `canvas + 2 * side` on both axes so
/// the warp never exposes an unfilled edge. Odd columns start half a row
/// lower than even ones.
pub fn generate_mesh(canvas: Vec2, side_length: f32) -> Result<Mesh> {
    if !(side_length >= 1.0) {
        return Err(SketchError::InvalidInput {
            field: "triangle side length",
            value: side_length.max(0.0) as usize,
            min: 1,
        });
    }

    let step_x = column_step(side_length);
    let half_row = round_half_up(side_length / 2.0);
    let x_end = canvas.x + 2.0 * side_length;
    let y_end = canvas.y + 2.0 * side_length;

    let mut columns: Vec<Vec<MeshPoint>> = Vec::new();
    let mut triangles = Vec::new();

    let mut x = -side_length;
    let mut y = -side_length;

    while x < x_end {
        let c = columns.len();
        let mut current: Vec<MeshPoint> = Vec::new();
        let mut prev_index = 0usize;

        while y < y_end {
            current.push(MeshPoint::new(Vec2::new(x, y)));
            y += side_length;

            // First column and rows below the previous column get no triangles
            if c == 0 {
                continue;
            }
            let prev_len = columns[c - 1].len();
            if prev_index >= prev_len {
                continue;
            }
            // Even columns start higher, so their first point has nothing to its left
            if current.len() == 1 && c % 2 == 0 {
                continue;
            }

            let new = LatticeIndex::new(c, current.len() - 1);
            let left = |row| LatticeIndex::new(c - 1, row);

            if current.len() >= 2 {
                triangles.push(Triangle {
                    vertices: [new, LatticeIndex::new(c, current.len() - 2), left(prev_index)],
                });
            }
            if prev_index + 1 < prev_len {
                triangles.push(Triangle {
                    vertices: [new, left(prev_index), left(prev_index + 1)],
                });
            }
            prev_index += 1;
        }

        columns.push(current);
        x += step_x;
        y = -side_length + if c % 2 == 1 { 0.0 } else { half_row };
    }

    log::debug!(
        "Mesh lattice: {} columns, {} triangles (side {})",
        columns.len(),
        triangles.len(),
        side_length
    );

    Ok(Mesh {
        canvas,
        side_length,
        columns,
        triangles,
    })
}

/// Nonlinear warp, x first and then y from the warped x
///
/// `x' = round(sign(x) * x^3 / W^2 - S)` and
/// `y' = round((y - H/2) * (x' + W)^2 / W^2 + H/2)`. Since `x^3` already
/// carries the sign of `x`, `sign(x) * x^3` equals `|x|^3` and the x warp is
/// mirror-symmetric around zero.
pub fn warp_point(p: Vec2, canvas: Vec2, side_length: f32) -> Vec2 {
    let (w, h) = (canvas.x as f64, canvas.y as f64);
    let w2 = w * w;
    let px = p.x as f64;
    let py = p.y as f64;
    let sign = if px < 0.0 { -1.0 } else { 1.0 };

    let x = round_f64(sign * px.powi(3) / w2 - side_length as f64);
    let y = round_f64((py - h / 2.0) * (x + w).powi(2) / w2 + h / 2.0);
    Vec2::new(x as f32, y as f32)
}

#[inline]
fn round_f64(v: f64) -> f64 {
    (v + 0.5).floor()
}

impl Mesh {
    pub fn point(&self, index: LatticeIndex) -> &MeshPoint {
        &self.columns[index.column][index.row]
    }

    pub fn point_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &MeshPoint> {
        self.columns.iter().flatten()
    }

    /// Jitter every displayed coordinate by up to `limit` on each axis
    pub fn perturb<R: Rng + ?Sized>(&mut self, limit: f32, rng: &mut R) {
        for point in self.columns.iter_mut().flatten() {
            let dx = jitter(rng, limit);
            let dy = jitter(rng, limit);
            point.displayed = point.lattice + Vec2::new(dx, dy);
        }
    }

    /// Warp lattice and displayed coordinates alike
    pub fn warp(&mut self) {
        let (canvas, side) = (self.canvas, self.side_length);
        for point in self.columns.iter_mut().flatten() {
            point.lattice = warp_point(point.lattice, canvas, side);
            point.displayed = warp_point(point.displayed, canvas, side);
        }
    }

    /// Corner positions of a triangle in displayed coordinates
    pub fn displayed_corners(&self, triangle: &Triangle) -> [Vec2; 3] {
        triangle.vertices.map(|i| self.point(i).displayed)
    }
}

/// Gradient colouring from the south-west colour to the north-east colour
#[derive(Debug, Clone, Copy)]
pub struct Gradient {
    pub sw: [u8; 3],
    pub ne: [u8; 3],
    /// Random spread added to the gradient position
    pub smoothness: f32,
    /// Integer noise limit added to each channel
    pub variation: i32,
}

impl Gradient {
    pub fn from_config(cfg: &SketchConfig) -> Self {
        Self {
            sw: cfg.sw_colour,
            ne: cfg.ne_colour,
            smoothness: cfg.gradient_smoothness,
            variation: cfg.colour_variation_limit,
        }
    }

    /// Colour a triangle by the distance of its third lattice vertex from
    /// the north-east corner. Channels are clamped to [0, 255].
    pub fn colour<R: Rng + ?Sized>(&self, mesh: &Mesh, triangle: &Triangle, rng: &mut R) -> Color {
        let sw_corner = Vec2::new(0.0, mesh.canvas.y);
        let ne_corner = Vec2::new(mesh.canvas.x, 0.0);
        let diagonal = sw_corner.distance(ne_corner);

        let anchor = mesh.point(triangle.vertices[2]).lattice;
        let proportion = anchor.distance(ne_corner) / diagonal + jitter(rng, self.smoothness);

        let mut channels = [0i32; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            let (sw, ne) = (self.sw[i] as f32, self.ne[i] as f32);
            let base = round_half_up((sw - ne) * proportion + ne) as i32;
            let noise = if self.variation > 0 {
                rng.random_range(-self.variation..=self.variation)
            } else {
                0
            };
            *channel = base + noise;
        }
        Color::clamped(channels[0], channels[1], channels[2])
    }
}

/// Build, jitter, warp and colour a mesh
pub fn mesh_scene<R: Rng + ?Sized>(cfg: &SketchConfig, rng: &mut R) -> Result<Scene> {
    let mut mesh = generate_mesh(cfg.canvas(), cfg.triangle_side_length)?;
    mesh.perturb(cfg.displacement_limit, rng);
    mesh.warp();

    let gradient = Gradient::from_config(cfg);
    let mut scene = Scene::new(cfg.canvas_width, cfg.canvas_height, Color::BLACK);
    for triangle in &mesh.triangles {
        let colour = gradient.colour(&mesh, triangle, rng);
        scene.push(DrawOp::Polygon {
            points: mesh.displayed_corners(triangle).to_vec(),
            fill: colour,
            stroke: Some(Stroke { width: 1.0, color: colour }),
        });
    }
    log::debug!(
        "Mesh: {} points, {} triangles, side {}",
        mesh.point_count(),
        mesh.triangles.len(),
        mesh.side_length
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(1200.0, 800.0);

    /// Count lattice points straight from the stepping rule
    fn expected_point_count(canvas: Vec2, side: f32) -> usize {
        let step = column_step(side);
        let half = round_half_up(side / 2.0);
        let mut total = 0;
        let mut column = 0;
        let mut x = -side;
        while x < canvas.x + 2.0 * side {
            let start = if column % 2 == 0 { -side } else { -side + half };
            total += ((canvas.y + 2.0 * side - start) / side).ceil() as usize;
            x += step;
            column += 1;
        }
        total
    }

    #[test]
    fn test_point_count_matches_stepping_rule() {
        for &(w, h, s) in &[(1200.0, 800.0, 50.0), (640.0, 480.0, 20.0), (300.0, 900.0, 150.0), (10.0, 10.0, 37.0)] {
            let canvas = Vec2::new(w, h);
            let mesh = generate_mesh(canvas, s).unwrap();
            assert_eq!(mesh.point_count(), expected_point_count(canvas, s), "{w}x{h} side {s}");
        }
    }

    #[test]
    fn test_column_layout() {
        let mesh = generate_mesh(CANVAS, 50.0).unwrap();
        assert_eq!(column_step(50.0), 43.0);
        assert_eq!(mesh.columns[0][0].lattice, Vec2::new(-50.0, -50.0));
        assert_eq!(mesh.columns[1][0].lattice, Vec2::new(-7.0, -25.0));
        assert_eq!(mesh.columns[2][0].lattice, Vec2::new(36.0, -50.0));
        let last = mesh.columns.last().unwrap();
        assert!(last[0].lattice.x < CANVAS.x + 100.0);
    }

    #[test]
    fn test_triangle_vertices_distinct_and_local() {
        let side = 50.0;
        let mesh = generate_mesh(CANVAS, side).unwrap();
        assert!(!mesh.triangles.is_empty());
        for t in &mesh.triangles {
            let [a, b, c] = t.vertices;
            assert!(a != b && b != c && a != c);
            let [pa, pb, pc] = t.vertices.map(|i| mesh.point(i).lattice);
            for (p, q) in [(pa, pb), (pb, pc), (pa, pc)] {
                let d = p.distance(q);
                assert!(d > 0.8 * side && d < 1.2 * side, "edge length {d}");
            }
        }
    }

    #[test]
    fn test_canvas_points_are_covered() {
        let mesh = generate_mesh(CANVAS, 40.0).unwrap();
        let mut used = std::collections::HashSet::new();
        for t in &mesh.triangles {
            used.extend(t.vertices);
        }
        for (c, column) in mesh.columns.iter().enumerate() {
            for (r, p) in column.iter().enumerate() {
                let inside = (0.0..=CANVAS.x).contains(&p.lattice.x) && (0.0..=CANVAS.y).contains(&p.lattice.y);
                if inside {
                    assert!(used.contains(&LatticeIndex::new(c, r)), "uncovered point {:?}", p.lattice);
                }
            }
        }
    }

    #[test]
    fn test_invalid_side_rejected() {
        assert!(generate_mesh(CANVAS, 0.0).is_err());
        assert!(generate_mesh(CANVAS, f32::NAN).is_err());
    }

    #[test]
    fn test_perturb_bounded_and_keeps_lattice() {
        let mut mesh = generate_mesh(CANVAS, 50.0).unwrap();
        let before: Vec<Vec2> = mesh.points().map(|p| p.lattice).collect();
        mesh.perturb(15.0, &mut Pcg32::seed_from_u64(3));
        for (p, lattice) in mesh.points().zip(before) {
            assert_eq!(p.lattice, lattice);
            let d = p.displayed - p.lattice;
            assert!(d.x.abs() <= 15.0 && d.y.abs() <= 15.0);
        }
    }

    #[test]
    fn test_warp_known_values() {
        // x' = 600^3 / 1200^2 - 50 = 100; y' = (0 - 400) * (1300^2) / 1200^2 + 400
        let p = warp_point(Vec2::new(600.0, 0.0), CANVAS, 50.0);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, (-400.0f64 * 1300.0 * 1300.0 / 1_440_000.0 + 400.0 + 0.5).floor() as f32);
        // Vertical centre line is a fixed row
        let mid = warp_point(Vec2::new(900.0, 400.0), CANVAS, 50.0);
        assert_eq!(mid.y, 400.0);
    }

    #[test]
    fn test_warp_mirrors_x_without_side_offset() {
        for &x in &[1.0f32, 37.0, 250.0, 1199.0] {
            for &y in &[-30.0f32, 0.0, 400.0, 812.0] {
                let pos = warp_point(Vec2::new(x, y), CANVAS, 0.0);
                let neg = warp_point(Vec2::new(-x, y), CANVAS, 0.0);
                assert_eq!(pos.x, neg.x);
                assert!(pos.x >= 0.0);
                assert_eq!(pos.y, neg.y);
            }
        }
    }

    #[test]
    fn test_warp_is_monotonic_in_x_on_the_right() {
        let mut last = f32::MIN;
        for i in 0..=24 {
            let p = warp_point(Vec2::new(i as f32 * 50.0, 0.0), CANVAS, 50.0);
            assert!(p.x >= last);
            last = p.x;
        }
    }

    #[test]
    fn test_gradient_colour_endpoints() {
        let mut mesh = generate_mesh(Vec2::new(100.0, 100.0), 20.0).unwrap();
        // Pin the anchor vertex of the first triangle onto the NE corner
        let anchor = mesh.triangles[0].vertices[2];
        mesh.columns[anchor.column][anchor.row].lattice = Vec2::new(100.0, 0.0);
        let triangle = mesh.triangles[0];
        let gradient = Gradient {
            sw: [0, 0, 0],
            ne: [200, 100, 50],
            smoothness: 0.0,
            variation: 0,
        };
        let c = gradient.colour(&mesh, &triangle, &mut Pcg32::seed_from_u64(1));
        assert_eq!(c, Color::rgb(200, 100, 50));

        mesh.columns[anchor.column][anchor.row].lattice = Vec2::new(0.0, 100.0);
        let c = gradient.colour(&mesh, &triangle, &mut Pcg32::seed_from_u64(1));
        assert_eq!(c, Color::rgb(0, 0, 0));
    }

    #[test]
    fn test_gradient_noise_is_clamped() {
        let mesh = generate_mesh(Vec2::new(100.0, 100.0), 20.0).unwrap();
        let gradient = Gradient {
            sw: [255, 255, 255],
            ne: [255, 255, 255],
            smoothness: 0.5,
            variation: 40,
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let mut saw_saturated = false;
        for t in &mesh.triangles {
            let c = gradient.colour(&mesh, t, &mut rng);
            saw_saturated |= c.r == 255;
        }
        assert!(saw_saturated);
    }

    #[test]
    fn test_scene_one_polygon_per_triangle() {
        let cfg = SketchConfig::from_query("CanvasWidth=300&CanvasHeight=200&TriangleSideLength=40");
        let mut rng = Pcg32::seed_from_u64(4);
        let scene = mesh_scene(&cfg, &mut rng).unwrap();
        let mesh = generate_mesh(cfg.canvas(), 40.0).unwrap();
        assert_eq!(scene.ops.len(), mesh.triangles.len());
        assert_eq!(scene.background, Color::BLACK);
    }
}
