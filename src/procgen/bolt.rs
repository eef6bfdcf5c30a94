//! Lightning bolts grown as a branching random walk in polar space
//!
//! A bolt starts at radius 0 and steps outward by a fixed amount, nudging
//! its angle by a random value centred on its momentum. Momentum is the
//! clamped angle change of the last step, so bolts keep curving the way
//! they were already curving. Branches fork off with inverted momentum.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::polar_to_cartesian;
use crate::scene::{Color, DrawOp, Scene};

/// Glow passes as (stroke width, blend fraction from background to lightning)
pub const GLOW_PASSES: [(f32, f32); 7] = [
    (20.0, 0.1),
    (12.0, 0.2),
    (7.0, 0.3),
    (5.0, 0.4),
    (4.0, 0.6),
    (3.0, 0.8),
    (1.0, 1.0),
];

/// Nesting limit for branches; branches below this depth are never spawned
pub const MAX_BRANCH_DEPTH: u32 = 32;

/// Minimum distance of an automatic bolt origin from the canvas edge
const AUTO_ORIGIN_MARGIN: f32 = 100.0;

/// A point in polar coordinates around the bolt origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    pub angle: f32,
    pub radius: f32,
}

impl Polar {
    pub const fn new(angle: f32, radius: f32) -> Self {
        Self { angle, radius }
    }

    /// Position on the canvas for a bolt centred at `origin`
    pub fn to_canvas(self, origin: Vec2) -> Vec2 {
        origin + polar_to_cartesian(self.radius, self.angle)
    }
}

/// Growth and appearance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoltConfig {
    /// Radial advance per step
    pub step: f32,
    /// Half-width of the random angle change around the momentum
    pub angle_spread: f32,
    /// Momentum is clamped to [-limit, limit]
    pub momentum_limit: f32,
    /// Per-step probability of spawning a branch
    pub branch_chance: f64,
    /// A bolt with `n` points may hold fewer than `n / branch_density` branches
    pub branch_density: usize,
    /// Per-step probability that a branch stops growing
    pub stop_chance: f64,
    /// Growth stops once a bolt reaches this radius
    pub max_radius: f32,
    pub max_depth: u32,
    pub background: Color,
    pub lightning: Color,
    pub glow: Vec<(f32, f32)>,
}

impl BoltConfig {
    /// Defaults for a canvas; bolts grow to half its larger side
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            step: 10.0,
            angle_spread: 0.1,
            momentum_limit: 0.05,
            branch_chance: 0.06,
            branch_density: 16,
            stop_chance: 0.07,
            max_radius: width.max(height) as f32 / 2.0,
            max_depth: MAX_BRANCH_DEPTH,
            background: Color::rgb(77, 0, 102),
            lightning: Color::WHITE,
            glow: GLOW_PASSES.to_vec(),
        }
    }
}

/// One strand of a lightning bolt and the branches it spawned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bolt {
    /// Polyline in polar space, strictly increasing in radius
    pub points: Vec<Polar>,
    pub is_root: bool,
    pub momentum: f32,
    pub num_branches: usize,
    /// 0 for a root bolt, parent depth + 1 for a branch
    pub depth: u32,
    /// Index of the parent point this branch grew from
    pub spawned_at: Option<usize>,
    pub branches: Vec<Bolt>,
}

impl Bolt {
    fn new(start: Polar, is_root: bool, momentum: f32, depth: u32, spawned_at: Option<usize>) -> Self {
        Self {
            points: vec![start],
            is_root,
            momentum,
            num_branches: 0,
            depth,
            spawned_at,
            branches: Vec::new(),
        }
    }

    #[inline]
    pub fn last_point(&self) -> Polar {
        // points is never empty: it is seeded with the start point
        self.points[self.points.len() - 1]
    }

    fn add_point(&mut self, p: Polar, limit: f32) {
        self.points.push(p);
        let n = self.points.len();
        if n >= 2 {
            self.momentum = (self.points[n - 1].angle - self.points[n - 2].angle).clamp(-limit, limit);
        }
    }

    /// All strands in draw order: each branch (recursively) before its parent
    pub fn flatten(&self) -> Vec<&Bolt> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Bolt>) {
        for branch in &self.branches {
            branch.collect_into(out);
        }
        out.push(self);
    }

    /// Number of strands including this one
    pub fn strand_count(&self) -> usize {
        1 + self.branches.iter().map(Bolt::strand_count).sum::<usize>()
    }

    /// Canvas-space polyline for a bolt centred at `origin`
    pub fn polyline(&self, origin: Vec2) -> Vec<Vec2> {
        self.points.iter().map(|p| p.to_canvas(origin)).collect()
    }
}

/// Grow a bolt (and its branches) from `start`
pub fn generate_bolt<R: Rng + ?Sized>(
    start: Polar,
    is_root: bool,
    momentum: f32,
    cfg: &BoltConfig,
    rng: &mut R,
) -> Bolt {
    grow(start, is_root, momentum, 0, None, cfg, rng)
}

fn grow<R: Rng + ?Sized>(
    start: Polar,
    is_root: bool,
    momentum: f32,
    depth: u32,
    spawned_at: Option<usize>,
    cfg: &BoltConfig,
    rng: &mut R,
) -> Bolt {
    let mut bolt = Bolt::new(start, is_root, momentum, depth, spawned_at);

    while bolt.last_point().radius < cfg.max_radius {
        let last = bolt.last_point();
        let m = bolt.momentum;
        let angle = last.angle + rng.random_range(m - cfg.angle_spread..m + cfg.angle_spread);
        let next = Polar::new(angle, last.radius + cfg.step);
        bolt.add_point(next, cfg.momentum_limit);

        let cap = bolt.points.len() as f32 / cfg.branch_density as f32;
        if (bolt.num_branches as f32) < cap
            && depth < cfg.max_depth
            && rng.random_bool(cfg.branch_chance)
        {
            let at = bolt.points.len() - 1;
            let branch = grow(next, false, -bolt.momentum, depth + 1, Some(at), cfg, rng);
            bolt.branches.push(branch);
            bolt.num_branches += 1;
        }

        if !is_root && rng.random_bool(cfg.stop_chance) {
            break;
        }
    }

    bolt
}

/// Random bolt origin kept away from the canvas edges
pub fn random_origin<R: Rng + ?Sized>(canvas: Vec2, rng: &mut R) -> Vec2 {
    let pick = |rng: &mut R, extent: f32| {
        if extent > 2.0 * AUTO_ORIGIN_MARGIN {
            rng.random_range(AUTO_ORIGIN_MARGIN..extent - AUTO_ORIGIN_MARGIN)
        } else {
            extent / 2.0
        }
    };
    let x = pick(rng, canvas.x);
    let y = pick(rng, canvas.y);
    Vec2::new(x, y)
}

/// Root bolts for one trigger, each at a random starting angle
///
/// The loop bound is redrawn from [1, 4) before every root, so there are
/// always at least two roots and at most four (2: 1/3, 3: 4/9, 4: 2/9).
pub fn grow_roots<R: Rng + ?Sized>(cfg: &BoltConfig, rng: &mut R) -> Vec<Bolt> {
    let mut roots = Vec::new();
    while (roots.len() as f32) < rng.random_range(1.0f32..4.0) {
        let angle = rng.random_range(0.0..TAU);
        roots.push(generate_bolt(Polar::new(angle, 0.0), true, 0.0, cfg, rng));
    }
    roots
}

/// Grow 2-4 root bolts around `origin` and lay them out as glow passes
///
/// With `fade` set, the scene starts with a half-transparent background
/// wash so earlier bolts dim instead of disappearing.
pub fn bolt_scene<R: Rng + ?Sized>(
    cfg: &BoltConfig,
    canvas: Vec2,
    origin: Vec2,
    fade: bool,
    rng: &mut R,
) -> Scene {
    let mut scene = Scene::new(canvas.x as u32, canvas.y as u32, cfg.background);
    if fade {
        scene.rect(Vec2::ZERO, canvas, cfg.background.with_alpha(128));
    }

    let roots = grow_roots(cfg, rng);
    let num_roots = roots.len();
    let strands: Vec<&Bolt> = roots.iter().flat_map(|b| b.flatten()).collect();

    log::debug!(
        "Bolts at ({:.0}, {:.0}): {} roots, {} strands",
        origin.x,
        origin.y,
        num_roots,
        strands.len()
    );

    for &(width, fraction) in &cfg.glow {
        let color = cfg.background.lerp(cfg.lightning, fraction);
        for strand in &strands {
            if strand.points.len() < 2 {
                continue;
            }
            scene.push(DrawOp::Polyline {
                points: strand.polyline(origin),
                width,
                color,
            });
        }
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cfg() -> BoltConfig {
        BoltConfig::for_canvas(1200, 800)
    }

    fn sample(seed: u64) -> Bolt {
        let mut rng = Pcg32::seed_from_u64(seed);
        generate_bolt(Polar::new(1.0, 0.0), true, 0.0, &cfg(), &mut rng)
    }

    #[test]
    fn test_radius_strictly_increasing() {
        for seed in 0..50 {
            let root = sample(seed);
            for strand in root.flatten() {
                assert!(!strand.points.is_empty());
                for w in strand.points.windows(2) {
                    assert!(w[1].radius > w[0].radius, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn test_momentum_stays_bounded() {
        let limit = cfg().momentum_limit;
        for seed in 0..50 {
            let root = sample(seed);
            for strand in root.flatten() {
                assert!(strand.momentum.abs() <= limit + 1e-6);
                // Each turn is at most |momentum| + spread
                for w in strand.points.windows(2) {
                    let delta = (w[1].angle - w[0].angle).abs();
                    assert!(delta <= limit + cfg().angle_spread + 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_branch_starts_at_parent_point() {
        let mut seen = 0;
        for seed in 0..50 {
            let root = sample(seed);
            for strand in root.flatten() {
                for branch in &strand.branches {
                    let at = branch.spawned_at.expect("branch records its spawn point");
                    assert_eq!(branch.points[0], strand.points[at]);
                    assert!(!branch.is_root);
                    assert_eq!(branch.depth, strand.depth + 1);
                    seen += 1;
                }
            }
        }
        assert!(seen > 0, "no branches over 50 seeds");
    }

    #[test]
    fn test_root_reaches_max_radius() {
        let cfg = cfg();
        let root = sample(7);
        let last = root.last_point().radius;
        assert!(last >= cfg.max_radius);
        assert!(last < cfg.max_radius + cfg.step);
        assert_eq!(root.points.len(), (cfg.max_radius / cfg.step) as usize + 1);
    }

    #[test]
    fn test_branch_density_cap() {
        let k = cfg().branch_density as f32;
        for seed in 0..50 {
            for strand in sample(seed).flatten() {
                assert_eq!(strand.num_branches, strand.branches.len());
                assert!((strand.num_branches as f32) < strand.points.len() as f32 / k + 1.0);
            }
        }
    }

    #[test]
    fn test_depth_limit_respected() {
        let mut cfg = cfg();
        cfg.max_depth = 1;
        cfg.branch_chance = 1.0;
        cfg.branch_density = 1;
        let mut rng = Pcg32::seed_from_u64(3);
        let root = generate_bolt(Polar::new(0.0, 0.0), true, 0.0, &cfg, &mut rng);
        assert!(!root.branches.is_empty());
        for strand in root.flatten() {
            assert!(strand.depth <= 1);
        }
    }

    #[test]
    fn test_flatten_puts_branches_first() {
        let root = sample(11);
        let flat = root.flatten();
        assert_eq!(flat.len(), root.strand_count());
        assert!(std::ptr::eq(*flat.last().unwrap(), &root));
    }

    #[test]
    fn test_determinism() {
        let a = sample(99);
        let b = sample(99);
        assert_eq!(a.strand_count(), b.strand_count());
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn test_scene_has_one_polyline_per_pass_and_strand() {
        let cfg = cfg();
        let mut rng = Pcg32::seed_from_u64(5);
        let scene = bolt_scene(&cfg, Vec2::new(1200.0, 800.0), Vec2::new(600.0, 400.0), true, &mut rng);
        assert!(matches!(scene.ops[0], DrawOp::Polygon { .. }));
        let lines = scene.ops.len() - 1;
        assert_eq!(lines % cfg.glow.len(), 0);
        // Brightest pass last
        match scene.ops.last() {
            Some(DrawOp::Polyline { width, color, .. }) => {
                assert_eq!(*width, 1.0);
                assert_eq!(*color, Color::WHITE);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_root_count_redraws_bound_each_pass() {
        let cfg = BoltConfig::for_canvas(100, 100);
        let mut rng = Pcg32::seed_from_u64(17);
        let mut counts = [0usize; 5];
        for _ in 0..900 {
            let roots = grow_roots(&cfg, &mut rng);
            assert!((2..=4).contains(&roots.len()), "{} roots", roots.len());
            assert!(roots.iter().all(|r| r.is_root && r.points[0].radius == 0.0));
            counts[roots.len()] += 1;
        }
        // Expected 300 / 400 / 200
        assert!((230..370).contains(&counts[2]), "{counts:?}");
        assert!((330..470).contains(&counts[3]), "{counts:?}");
        assert!((140..260).contains(&counts[4]), "{counts:?}");
    }

    #[test]
    fn test_random_origin_inside_margin() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let o = random_origin(Vec2::new(1200.0, 800.0), &mut rng);
            assert!((100.0..1100.0).contains(&o.x));
            assert!((100.0..700.0).contains(&o.y));
        }
        let small = random_origin(Vec2::new(150.0, 150.0), &mut rng);
        assert_eq!(small, Vec2::new(75.0, 75.0));
    }
}
