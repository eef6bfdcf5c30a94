//! Procedural geometry generators
//!
//! Every generator here is pure and deterministic:
//! - Randomness only through the caller's `Rng`
//! - Configuration passed in explicitly, never read from ambient state
//! - No rendering dependencies beyond producing a `Scene`

pub mod board;
pub mod bolt;
pub mod dunes;
pub mod mesh;

pub use board::{
    Board, BoardLayout, Direction, Hexagon, Port, PortKind, Resource, Tile, board_scene, generate_board, pips,
};
pub use bolt::{Bolt, BoltConfig, Polar, bolt_scene, generate_bolt};
pub use dunes::{Wave, dunes_scene, generate_field, wave_colour};
pub use mesh::{LatticeIndex, Mesh, MeshPoint, Triangle, generate_mesh, mesh_scene, warp_point};
