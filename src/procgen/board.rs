//! Settlers-style hex board
//!
//! Nineteen pointy-top hexagons in rows of 3/4/5/4/3. Each row is placed
//! relative to the bottom-left vertex of the row above, so neighbouring
//! hexes share their edges exactly. Nine ports sit on fixed boundary edges.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SQRT_3;
use crate::round_half_up;
use crate::scene::{Color, DrawOp, Scene, Stroke};

/// Tiles per row, top to bottom
pub const ROW_SIZES: [usize; 5] = [3, 4, 5, 4, 3];
/// Horizontal shift of each row, in hex widths, relative to the widest row
const ROW_SHIFTS: [f32; 5] = [1.0, 0.5, 0.0, 0.5, 1.0];

pub const WATER_COLOUR: Color = Color::rgb(184, 227, 252);

/// Tile resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Wool,
    Grain,
    Ore,
    Desert,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Wool,
        Resource::Grain,
        Resource::Ore,
        Resource::Desert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Brick => "Brick",
            Resource::Lumber => "Lumber",
            Resource::Wool => "Wool",
            Resource::Grain => "Grain",
            Resource::Ore => "Ore",
            Resource::Desert => "Desert",
        }
    }

    pub fn colour(&self) -> Color {
        match self {
            Resource::Brick => Color::rgb(232, 88, 14),
            Resource::Lumber => Color::rgb(28, 123, 0),
            Resource::Wool => Color::rgb(234, 234, 234),
            Resource::Grain => Color::rgb(230, 200, 0),
            Resource::Ore => Color::rgb(158, 158, 158),
            Resource::Desert => Color::rgb(199, 180, 107),
        }
    }
}

/// What a port trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    Any,
    Resource(Resource),
}

/// Compass direction of a port dock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    /// Move `distance` from `from`; diagonals run at 30° to the horizontal
    pub fn step(self, from: Vec2, distance: f32) -> Vec2 {
        let vert = round_half_up(distance / 2.0);
        let horiz = round_half_up(distance * SQRT_3 / 2.0);
        let delta = match self {
            Direction::North => Vec2::new(0.0, -distance),
            Direction::South => Vec2::new(0.0, distance),
            Direction::NorthEast => Vec2::new(horiz, -vert),
            Direction::NorthWest => Vec2::new(-horiz, -vert),
            Direction::SouthEast => Vec2::new(horiz, vert),
            Direction::SouthWest => Vec2::new(-horiz, vert),
        };
        from + delta
    }
}

/// Pointy-top hexagon anchored at the north-west corner of its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hexagon {
    pub nw: Vec2,
    pub width: f32,
    pub height: f32,
    /// Clockwise from the upper-left vertex
    pub points: [Vec2; 6],
}

impl Hexagon {
    pub fn new(side: f32, nw: Vec2) -> Self {
        let half_side = round_half_up(side / 2.0);
        let half_width = round_half_up(half_side * SQRT_3);
        let width = 2.0 * half_width;
        let (x, y) = (nw.x, nw.y);
        Self {
            nw,
            width,
            height: 2.0 * side,
            points: [
                Vec2::new(x, y + half_side),
                Vec2::new(x + half_width, y),
                Vec2::new(x + width, y + half_side),
                Vec2::new(x + width, y + half_side + side),
                Vec2::new(x + half_width, y + 2.0 * side),
                Vec2::new(x, y + half_side + side),
            ],
        }
    }

    pub fn centre_x(&self) -> f32 {
        self.nw.x + self.width / 2.0
    }

    /// Point at `fraction` of the bounding-box height, horizontally centred
    pub fn at_height(&self, fraction: f32) -> Vec2 {
        Vec2::new(self.centre_x(), self.nw.y + self.height * fraction)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub resource: Resource,
    /// Production number; never 7, `None` on the desert
    pub number: Option<u8>,
    pub hexagon: Hexagon,
    pub has_robber: bool,
}

impl Tile {
    pub fn new(side: f32, nw: Vec2, resource: Resource, number: Option<u8>) -> Self {
        Self {
            resource,
            number,
            hexagon: Hexagon::new(side, nw),
            has_robber: resource == Resource::Desert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub ends: [(Vec2, Direction); 2],
    pub kind: PortKind,
}

impl Port {
    /// Dock segments from each boundary point outward
    pub fn docks(&self, length: f32) -> [(Vec2, Vec2); 2] {
        self.ends.map(|(p, dir)| (p, dir.step(p, length)))
    }
}

/// Board geometry and canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub hex_side: f32,
    /// Water margin left of and above the board
    pub border: f32,
    pub beach_width: f32,
    pub port_length: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 900,
            hex_side: 85.0,
            border: 80.0,
            beach_width: 10.0,
            port_length: 45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub rows: Vec<Vec<Tile>>,
    pub ports: Vec<Port>,
}

impl Board {
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.rows.iter().flatten()
    }
}

/// Pips under a production number: one per way two dice can roll it
pub fn pips(number: u8) -> Option<u8> {
    if !(2..=12).contains(&number) || number == 7 {
        return None;
    }
    Some(6 - (7 - number as i32).unsigned_abs() as u8)
}

/// Uniform over 2..=12, redrawn on 7
pub fn roll_number<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    loop {
        let n = rng.random_range(2..=12u8);
        if n != 7 {
            return n;
        }
    }
}

/// Port ring: (row, column, first vertex, first direction, second direction, kind).
/// The second vertex is always the next one clockwise.
const PORT_RING: [(usize, usize, usize, Direction, Direction, PortKind); 9] = [
    (0, 0, 0, Direction::North, Direction::NorthWest, PortKind::Any),
    (0, 1, 1, Direction::NorthEast, Direction::North, PortKind::Resource(Resource::Wool)),
    (1, 3, 1, Direction::NorthEast, Direction::North, PortKind::Any),
    (2, 4, 2, Direction::SouthEast, Direction::NorthEast, PortKind::Any),
    (3, 3, 3, Direction::South, Direction::SouthEast, PortKind::Resource(Resource::Brick)),
    (4, 1, 3, Direction::South, Direction::SouthEast, PortKind::Resource(Resource::Lumber)),
    (4, 0, 4, Direction::SouthWest, Direction::South, PortKind::Any),
    (3, 0, 5, Direction::NorthWest, Direction::SouthWest, PortKind::Resource(Resource::Grain)),
    (1, 0, 5, Direction::NorthWest, Direction::SouthWest, PortKind::Resource(Resource::Ore)),
];

/// Lay out the 19 tiles and the 9 ports
///
/// Resources are drawn uniformly per tile, not from the fixed bag of a real
/// board, so a board may hold any number of deserts.
pub fn generate_board<R: Rng + ?Sized>(layout: &BoardLayout, rng: &mut R) -> Board {
    let width = Hexagon::new(layout.hex_side, Vec2::ZERO).width;
    let mut rows: Vec<Vec<Tile>> = Vec::with_capacity(ROW_SIZES.len());

    for (size, shift) in ROW_SIZES.iter().zip(ROW_SHIFTS) {
        let y = match rows.last() {
            Some(prev) => prev[0].hexagon.points[5].y,
            None => layout.border,
        };
        let row = (0..*size)
            .map(|i| {
                let x = layout.border + (i as f32 + shift) * width;
                let resource = Resource::ALL[rng.random_range(0..Resource::ALL.len())];
                let number = (resource != Resource::Desert).then(|| roll_number(rng));
                Tile::new(layout.hex_side, Vec2::new(x, y), resource, number)
            })
            .collect();
        rows.push(row);
    }

    let ports = PORT_RING
        .iter()
        .map(|&(row, col, vertex, d1, d2, kind)| {
            let points = rows[row][col].hexagon.points;
            Port {
                ends: [(points[vertex], d1), (points[(vertex + 1) % 6], d2)],
                kind,
            }
        })
        .collect();

    Board { rows, ports }
}

/// Generate a board and lay it out: hexes, number discs, symbols, then ports
pub fn board_scene<R: Rng + ?Sized>(layout: &BoardLayout, rng: &mut R) -> Scene {
    let board = generate_board(layout, rng);
    let mut scene = Scene::new(layout.canvas_width, layout.canvas_height, WATER_COLOUR);

    for tile in board.tiles() {
        draw_tile(&mut scene, tile, layout.beach_width);
    }

    for port in &board.ports {
        for (from, to) in port.docks(layout.port_length) {
            scene.line(from, to, layout.beach_width, Color::BLACK);
        }
    }

    let deserts = board.tiles().filter(|t| t.resource == Resource::Desert).count();
    log::debug!("Board: {} tiles, {} deserts, {} ports", board.tiles().count(), deserts, board.ports.len());
    scene
}

fn draw_tile(scene: &mut Scene, tile: &Tile, beach_width: f32) {
    let hex = &tile.hexagon;
    let colour = tile.resource.colour();

    scene.push(DrawOp::Polygon {
        points: hex.points.to_vec(),
        fill: colour,
        stroke: Some(Stroke {
            width: beach_width,
            color: Color::BLACK,
        }),
    });

    let disc = if tile.has_robber {
        Color::BLACK
    } else {
        colour.lerp(Color::WHITE, 0.3)
    };

    match tile.number {
        None => {
            scene.push(DrawOp::Circle {
                center: hex.at_height(0.5),
                radius: hex.width * 5.0 / 16.0,
                color: disc,
            });
        }
        Some(n) => {
            scene.push(DrawOp::Circle {
                center: hex.at_height(5.0 / 8.0),
                radius: hex.width * 5.0 / 24.0,
                color: disc,
            });
            scene.push(DrawOp::Text {
                content: n.to_string(),
                position: hex.at_height(0.5),
                size: 30.0,
                font: "serif".to_string(),
                color: Color::BLACK,
            });
            if let Some(count) = pips(n) {
                draw_pips(scene, count, hex.at_height(11.0 / 16.0));
            }
        }
    }

    if tile.resource == Resource::Desert {
        let centre = hex.at_height(0.5);
        let ink = if tile.has_robber { Resource::Desert.colour() } else { Color::BLACK };
        draw_cactus(scene, centre, hex.width / 5.0, ink);
    } else {
        draw_symbol(scene, tile.resource, hex.at_height(0.25), hex.width / 7.0);
    }
}

fn draw_pips(scene: &mut Scene, count: u8, centre: Vec2) {
    const PIP_RADIUS: f32 = 3.0;
    const PIP_GAP: f32 = 3.0;
    let n = count as f32;
    let total_width = PIP_RADIUS * 2.0 * n + (n - 1.0) * PIP_GAP;
    let mut x = centre.x - total_width / 2.0 + PIP_RADIUS;
    for _ in 0..count {
        scene.push(DrawOp::Circle {
            center: Vec2::new(x, centre.y),
            radius: PIP_RADIUS,
            color: Color::BLACK,
        });
        x += 2.0 * PIP_RADIUS + PIP_GAP;
    }
}

/// Scale a unit-space outline into canvas space around `centre`
fn outline(centre: Vec2, radius: f32, unit: &[(f32, f32)]) -> Vec<Vec2> {
    unit.iter()
        .map(|&(x, y)| centre + Vec2::new(x, y) * radius)
        .collect()
}

fn filled(scene: &mut Scene, points: Vec<Vec2>) {
    scene.push(DrawOp::Polygon {
        points,
        fill: Color::BLACK,
        stroke: None,
    });
}

fn draw_symbol(scene: &mut Scene, resource: Resource, c: Vec2, r: f32) {
    match resource {
        Resource::Brick => {
            let size = Vec2::new(0.95, 0.4) * r;
            for (x, y) in [(-0.475, -0.7), (-1.0, -0.2), (0.05, -0.2), (-0.475, 0.3)] {
                scene.rect(c + Vec2::new(x, y) * r, size, Color::BLACK);
            }
        }
        Resource::Lumber => {
            let tree = [
                (0.0, -1.0),
                (0.5, -0.5),
                (0.3, -0.5),
                (0.8, 0.1),
                (0.55, 0.1),
                (1.0, 0.7),
                (0.25, 0.7),
                (0.25, 1.0),
                (-0.25, 1.0),
                (-0.25, 0.7),
                (-1.0, 0.7),
                (-0.55, 0.1),
                (-0.8, 0.1),
                (-0.3, -0.5),
                (-0.5, -0.5),
            ];
            filled(scene, outline(c, r, &tree));
        }
        Resource::Wool => {
            // (x, y, diameter) of each puff
            for (x, y, d) in [
                (0.5, -0.1, 0.7),
                (-0.5, -0.2, 0.6),
                (0.3, 0.4, 0.6),
                (-0.3, 0.4, 0.7),
                (0.0, -0.4, 0.8),
                (0.0, 0.0, 0.8),
            ] {
                scene.push(DrawOp::Circle {
                    center: c + Vec2::new(x, y) * r,
                    radius: d * r / 2.0,
                    color: Color::BLACK,
                });
            }
        }
        Resource::Grain => {
            for side in [-1.0f32, 1.0] {
                for dy in [0.0, -0.5, -1.0] {
                    let leaf = [
                        (0.05 * side, 0.7 + dy),
                        (0.5 * side, 0.65 + dy),
                        (0.8 * side, 0.25 + dy),
                        (0.3 * side, 0.3 + dy),
                    ];
                    filled(scene, outline(c, r, &leaf));
                }
            }
            scene.push(DrawOp::Circle {
                center: c + Vec2::new(0.0, -0.9) * r,
                radius: 0.2 * r,
                color: Color::BLACK,
            });
        }
        Resource::Ore => {
            let h = 0.45 * SQRT_3;
            let rock = [(-h, -0.45), (0.0, -0.9), (h, -0.45), (h, 0.45), (0.0, 0.9), (-h, 0.45)];
            filled(scene, outline(c, r, &rock));
        }
        Resource::Desert => draw_cactus(scene, c, r, Color::BLACK),
    }
}

fn draw_cactus(scene: &mut Scene, c: Vec2, r: f32, ink: Color) {
    let width = r / 4.0;
    scene.line(c + Vec2::new(0.0, -1.1) * r, c + Vec2::new(0.0, 0.9) * r, width, ink);
    scene.push(DrawOp::Polyline {
        points: outline(c, r, &[(-0.5, -2.0 / 3.0), (-0.5, 0.25), (0.5, 0.25), (0.5, -0.5)]),
        width,
        color: ink,
    });
}
