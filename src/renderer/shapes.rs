//! Tessellation of scene primitives into triangle lists

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::scene::DrawOp;

/// Strokes at most this wide leave no visible gap at a joint
const JOINT_MIN_WIDTH: f32 = 2.0;

/// Segment count for a circle of the given radius
pub fn circle_segments(radius: f32) -> u32 {
    ((radius * 0.5) as u32).clamp(8, 64)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Stroke an open path: one quad per segment, plus a disc at each interior
/// joint once the stroke is wide enough for the gaps to show
pub fn polyline(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 || width <= 0.0 {
        return Vec::new();
    }

    let half = width / 2.0;
    let mut vertices = Vec::with_capacity(points.len() * 6);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let perp = Vec2::new(-dir.y, dir.x) * half;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        vertices.push(Vertex::new(v1a.x, v1a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2a.x, v2a.y, color));

        vertices.push(Vertex::new(v2a.x, v2a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2b.x, v2b.y, color));
    }

    if width > JOINT_MIN_WIDTH {
        for &joint in &points[1..points.len() - 1] {
            vertices.extend(circle(joint, half, color, circle_segments(half)));
        }
    }

    vertices
}

/// Stroke a closed outline; the closing corner gets a joint disc like the rest
pub fn outline(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    match points.first() {
        Some(&first) if points.len() > 2 => {
            let mut closed = points.to_vec();
            closed.push(first);
            let mut vertices = polyline(&closed, width, color);
            if width > JOINT_MIN_WIDTH {
                let half = width / 2.0;
                vertices.extend(circle(first, half, color, circle_segments(half)));
            }
            vertices
        }
        _ => polyline(points, width, color),
    }
}

/// Twice the signed area; positive when `perp_dot` turns are positive
fn signed_area2(ring: &[Vec2]) -> f32 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum()
}

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Fill a simple polygon by ear clipping
///
/// Repeated and collinear vertices are dropped. Only reflex vertices can
/// block an ear, so only those are tested, and the scan resumes where the
/// last ear was cut. If a full pass finds no ear (self-intersecting input)
/// the remainder is fanned from its first vertex.
pub fn polygon(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    let mut ring: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if ring.last() != Some(&p) {
            ring.push(p);
        }
    }
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Vec::new();
    }

    let area = signed_area2(&ring);
    if area == 0.0 {
        return Vec::new();
    }
    let orientation = area.signum();
    let turn = |prev: Vec2, at: Vec2, next: Vec2| (at - prev).perp_dot(next - at) * orientation;

    let len = ring.len();
    let mut remaining: Vec<usize> = (0..len).collect();
    let mut reflex: Vec<usize> = (0..len)
        .filter(|&i| turn(ring[(i + len - 1) % len], ring[i], ring[(i + 1) % len]) < 0.0)
        .collect();

    let mut vertices = Vec::with_capacity((len - 2) * 3);
    let mut emit = |a: Vec2, b: Vec2, c: Vec2| {
        for v in [a, b, c] {
            vertices.push(Vertex::new(v.x, v.y, color));
        }
    };

    let mut i = 0;
    let mut misses = 0;
    while remaining.len() > 3 {
        let n = remaining.len();
        if misses >= n {
            log::debug!("Polygon with {} vertices has no ear, fanning", n);
            for k in 1..n - 1 {
                emit(ring[remaining[0]], ring[remaining[k]], ring[remaining[k + 1]]);
            }
            return vertices;
        }
        i %= n;

        let (ia, ib, ic) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
        let (a, b, c) = (ring[ia], ring[ib], ring[ic]);
        let t = turn(a, b, c);

        // Collinear vertices are dropped without emitting anything
        if t.abs() > f32::EPSILON {
            let blocked = t < 0.0
                || reflex.iter().any(|&k| {
                    let p = ring[k];
                    k != ia && k != ib && k != ic && p != a && p != b && p != c && in_triangle(p, a, b, c)
                });
            if blocked {
                i += 1;
                misses += 1;
                continue;
            }
            emit(a, b, c);
        }

        remaining.remove(i);
        reflex.retain(|&k| k != ib);
        misses = 0;

        // The two neighbours may have turned convex
        let n = remaining.len();
        let prev = if i == 0 { n - 1 } else { i - 1 };
        for pos in [prev, i % n] {
            let k = remaining[pos];
            let now = turn(
                ring[remaining[(pos + n - 1) % n]],
                ring[k],
                ring[remaining[(pos + 1) % n]],
            );
            if now >= 0.0 {
                reflex.retain(|&r| r != k);
            }
        }
        i = prev;
    }

    if remaining.len() == 3 {
        let t = turn(ring[remaining[0]], ring[remaining[1]], ring[remaining[2]]);
        if t.abs() > f32::EPSILON {
            emit(ring[remaining[0]], ring[remaining[1]], ring[remaining[2]]);
        }
    }
    vertices
}

/// Paint layers of one draw op, bottom first. Every vertex of a layer
/// carries the same colour. Text has no geometry here.
pub fn layers(op: &DrawOp) -> Vec<Vec<Vertex>> {
    match op {
        DrawOp::Polyline {
            points,
            width,
            color,
        } => vec![polyline(points, *width, color.to_f32())],
        DrawOp::Polygon {
            points,
            fill,
            stroke,
        } => {
            let mut out = vec![polygon(points, fill.to_f32())];
            if let Some(s) = stroke {
                out.push(outline(points, s.width, s.color.to_f32()));
            }
            out
        }
        DrawOp::Circle {
            center,
            radius,
            color,
        } => vec![circle(*center, *radius, color.to_f32(), circle_segments(*radius))],
        DrawOp::Text { .. } => Vec::new(),
    }
}
