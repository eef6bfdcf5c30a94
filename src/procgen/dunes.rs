//! Layered dune silhouettes built from correlated wave polylines
//!
//! Each wave samples a fixed set of rows down the canvas. A row's horizontal
//! offset is a random walk across waves, so neighbouring waves bend alike.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ColourScheme, SketchConfig};
use crate::error::{Result, require_at_least};
use crate::jitter;
use crate::scene::{Color, DrawOp, Scene, Stroke, catmull_rom};

/// Curve samples per span between two wave points
const CURVE_STEPS: usize = 6;

/// One dune layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    /// Generation order; 0 is the leftmost wave
    pub index: usize,
    /// One point per sampling row, top to bottom
    pub points: Vec<Vec2>,
    /// Cumulative horizontal offset per row
    pub offsets: Vec<f32>,
}

impl Wave {
    /// x of the topmost point, used for position-dependent palettes
    pub fn leading_x(&self) -> f32 {
        self.points.first().map(|p| p.x).unwrap_or(0.0)
    }

    /// Closed silhouette: top-left corner, the smoothed wave, bottom-left corner
    pub fn outline(&self, canvas_height: f32) -> Vec<Vec2> {
        let curve = catmull_rom(&self.points, CURVE_STEPS);
        let mut outline = Vec::with_capacity(curve.len() + 2);
        outline.push(Vec2::ZERO);
        outline.extend(curve);
        outline.push(Vec2::new(0.0, canvas_height));
        outline
    }
}

/// Horizontal distance between consecutive waves
pub fn wave_spacing(width: f32, num_waves: usize) -> f32 {
    if num_waves > 1 {
        width / (num_waves - 1) as f32
    } else {
        width
    }
}

/// Generate `num_waves` waves, returned back-to-front (farthest first)
pub fn generate_field<R: Rng + ?Sized>(
    num_waves: usize,
    points_per_wave: usize,
    variance: f32,
    canvas: Vec2,
    rng: &mut R,
) -> Result<Vec<Wave>> {
    require_at_least("number of waves", num_waves, 1)?;
    require_at_least("points per wave", points_per_wave, 2)?;

    let spacing = wave_spacing(canvas.x, num_waves);
    let gap = canvas.y / (points_per_wave - 1) as f32;
    let row_y = |i: usize| i as f32 * gap;

    let mut waves: Vec<Wave> = Vec::with_capacity(num_waves);

    let offsets: Vec<f32> = (0..points_per_wave).map(|_| jitter(rng, variance)).collect();
    let points = offsets
        .iter()
        .enumerate()
        .map(|(i, &o)| Vec2::new(spacing / 2.0 + o, row_y(i)))
        .collect();
    waves.push(Wave { index: 0, points, offsets });

    for index in 1..num_waves {
        let prev = &waves[index - 1];
        let offsets: Vec<f32> = prev.offsets.iter().map(|&o| o + jitter(rng, variance)).collect();
        let points = prev
            .points
            .iter()
            .zip(&offsets)
            .enumerate()
            .map(|(i, (p, &o))| Vec2::new(p.x + spacing + o, row_y(i)))
            .collect();
        waves.push(Wave { index, points, offsets });
    }

    waves.reverse();
    Ok(waves)
}

/// Pick a fill colour for a wave whose leading edge sits at `x`
pub fn wave_colour<R: Rng + ?Sized>(
    scheme: ColourScheme,
    x: f32,
    canvas_width: f32,
    spacing: f32,
    rng: &mut R,
) -> Color {
    match scheme {
        ColourScheme::Desert => desert(rng),
        ColourScheme::Mars => {
            let red = rng.random_range(110.0..150.0);
            let green = rng.random_range(0.0..red / 4.0);
            channels(red, green, 0.0)
        }
        ColourScheme::Water => water(rng),
        ColourScheme::Greyscale => {
            let v = rng.random_range(30.0..220.0);
            channels(v, v, v)
        }
        ColourScheme::Beach => {
            if x < canvas_width / 2.0 {
                let red = rng.random_range(220.0..245.0);
                let green = rng.random_range(red * 0.8..red * 0.9);
                let blue = rng.random_range(140.0..180.0);
                channels(red, green, blue)
            } else {
                water(rng)
            }
        }
        ColourScheme::Candy => {
            let band = if spacing > 0.0 { (x / spacing).floor() as i64 } else { 0 };
            if band.rem_euclid(2) == 0 {
                channels(
                    rng.random_range(235.0..255.0),
                    rng.random_range(110.0..170.0),
                    rng.random_range(190.0..230.0),
                )
            } else {
                channels(
                    rng.random_range(150.0..190.0),
                    rng.random_range(225.0..255.0),
                    rng.random_range(200.0..235.0),
                )
            }
        }
    }
}

fn desert<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let red = rng.random_range(170.0..200.0);
    let green = rng.random_range(red / 2.0..red * 3.0 / 5.0);
    let blue = rng.random_range(0.0..30.0);
    channels(red, green, blue)
}

fn water<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let blue = rng.random_range(140.0..210.0);
    let green = rng.random_range(blue / 2.0..blue * 4.0 / 5.0);
    let red = rng.random_range(0.0..40.0);
    channels(red, green, blue)
}

fn channels(r: f32, g: f32, b: f32) -> Color {
    Color::clamped(r.round() as i32, g.round() as i32, b.round() as i32)
}

/// Generate a dune field and lay it out back-to-front
pub fn dunes_scene<R: Rng + ?Sized>(cfg: &SketchConfig, rng: &mut R) -> Result<Scene> {
    let canvas = cfg.canvas();
    let spacing = wave_spacing(canvas.x, cfg.num_waves);

    let background = wave_colour(cfg.colour_scheme, 0.0, canvas.x, spacing, rng);
    let mut scene = Scene::new(cfg.canvas_width, cfg.canvas_height, background);

    let waves = generate_field(cfg.num_waves, cfg.points_per_wave, cfg.wave_variance, canvas, rng)?;
    for wave in &waves {
        let colour = wave_colour(cfg.colour_scheme, wave.leading_x(), canvas.x, spacing, rng);
        scene.push(DrawOp::Polygon {
            points: wave.outline(canvas.y),
            fill: colour,
            stroke: Some(Stroke { width: 1.0, color: colour }),
        });
    }

    log::debug!(
        "Dunes: {} waves x {} rows, scheme {}",
        waves.len(),
        cfg.points_per_wave,
        cfg.colour_scheme.as_str()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SketchError;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(1200.0, 800.0);

    #[test]
    fn test_single_wave_without_variance_sits_at_half_spacing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let waves = generate_field(1, 5, 0.0, CANVAS, &mut rng).unwrap();
        assert_eq!(waves.len(), 1);
        let half = wave_spacing(CANVAS.x, 1) / 2.0;
        for p in &waves[0].points {
            assert_eq!(p.x, half);
        }
    }

    #[test]
    fn test_three_flat_waves() {
        let mut rng = Pcg32::seed_from_u64(2);
        let h = CANVAS.y;
        let waves = generate_field(3, 4, 0.0, CANVAS, &mut rng).unwrap();
        assert_eq!(waves.len(), 3);
        for wave in &waves {
            assert_eq!(wave.points.len(), 4);
            let x0 = wave.points[0].x;
            assert!(wave.points.iter().all(|p| p.x == x0));
            let ys: Vec<f32> = wave.points.iter().map(|p| p.y).collect();
            let expected = [0.0, h / 3.0, 2.0 * h / 3.0, h];
            for (y, e) in ys.iter().zip(expected) {
                assert!((y - e).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_back_to_front_order() {
        let mut rng = Pcg32::seed_from_u64(3);
        let waves = generate_field(5, 6, 0.0, CANVAS, &mut rng).unwrap();
        let indices: Vec<usize> = waves.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![4, 3, 2, 1, 0]);
        assert!(waves[0].leading_x() > waves[4].leading_x());
    }

    #[test]
    fn test_offsets_random_walk() {
        let variance = 7.0;
        let mut rng = Pcg32::seed_from_u64(4);
        let mut waves = generate_field(10, 8, variance, CANVAS, &mut rng).unwrap();
        waves.reverse();
        let spacing = wave_spacing(CANVAS.x, 10);
        for pair in waves.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            for i in 0..cur.points.len() {
                let step = cur.offsets[i] - prev.offsets[i];
                assert!(step.abs() <= variance + 1e-3);
                let dx = cur.points[i].x - prev.points[i].x;
                assert!((dx - (spacing + cur.offsets[i])).abs() < 1e-2);
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = generate_field(6, 9, 5.0, CANVAS, &mut Pcg32::seed_from_u64(42)).unwrap();
        let b = generate_field(6, 9, 5.0, CANVAS, &mut Pcg32::seed_from_u64(42)).unwrap();
        for (wa, wb) in a.iter().zip(&b) {
            assert_eq!(wa.points, wb.points);
        }
    }

    #[test]
    fn test_degenerate_counts_rejected() {
        let mut rng = Pcg32::seed_from_u64(5);
        assert!(matches!(
            generate_field(3, 1, 1.0, CANVAS, &mut rng),
            Err(SketchError::InvalidInput { min: 2, .. })
        ));
        assert!(generate_field(0, 4, 1.0, CANVAS, &mut rng).is_err());
    }

    #[test]
    fn test_outline_closes_on_left_edge() {
        let mut rng = Pcg32::seed_from_u64(6);
        let waves = generate_field(2, 5, 3.0, CANVAS, &mut rng).unwrap();
        let outline = waves[0].outline(CANVAS.y);
        assert_eq!(outline[0], Vec2::ZERO);
        assert_eq!(*outline.last().unwrap(), Vec2::new(0.0, CANVAS.y));
        assert_eq!(outline[1], waves[0].points[0]);
    }

    #[test]
    fn test_palette_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let c = wave_colour(ColourScheme::Desert, 0.0, 1200.0, 48.0, &mut rng);
            assert!((170..=200).contains(&c.r));
            assert!(c.b <= 30);
            let m = wave_colour(ColourScheme::Mars, 0.0, 1200.0, 48.0, &mut rng);
            assert_eq!(m.b, 0);
            assert!(m.g as f32 <= m.r as f32 / 4.0 + 1.0);
            let g = wave_colour(ColourScheme::Greyscale, 0.0, 1200.0, 48.0, &mut rng);
            assert!(g.r == g.g && g.g == g.b);
        }
    }

    #[test]
    fn test_beach_and_candy_depend_on_position() {
        let mut rng = Pcg32::seed_from_u64(8);
        let sand = wave_colour(ColourScheme::Beach, 100.0, 1200.0, 48.0, &mut rng);
        let sea = wave_colour(ColourScheme::Beach, 1000.0, 1200.0, 48.0, &mut rng);
        assert!(sand.r > sea.r);
        assert!(sea.b > sea.r);

        let pink = wave_colour(ColourScheme::Candy, 10.0, 1200.0, 48.0, &mut rng);
        let mint = wave_colour(ColourScheme::Candy, 60.0, 1200.0, 48.0, &mut rng);
        assert!(pink.r > mint.r);
        assert!(mint.g > pink.g);
    }

    #[test]
    fn test_scene_has_polygon_per_wave() {
        let cfg = SketchConfig::from_query("NumWaves=12&PointsPerWave=7");
        let mut rng = Pcg32::seed_from_u64(9);
        let scene = dunes_scene(&cfg, &mut rng).unwrap();
        assert_eq!(scene.ops.len(), 12);
        assert!(scene.ops.iter().all(|op| matches!(op, DrawOp::Polygon { .. })));
    }
}
