//! Sketch dispatch
//!
//! Maps a sketch name to its generator and decides what a user trigger
//! (a click, or a bare "new scene" request) does for each sketch.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SketchConfig;
use crate::error::Result;
use crate::procgen::board::{BoardLayout, board_scene};
use crate::procgen::bolt::{BoltConfig, bolt_scene, random_origin};
use crate::procgen::dunes::dunes_scene;
use crate::procgen::mesh::mesh_scene;
use crate::scene::Scene;

/// The four sketches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchKind {
    Bolt,
    Dunes,
    Mache,
    Settlements,
}

impl SketchKind {
    pub const ALL: [SketchKind; 4] = [
        SketchKind::Bolt,
        SketchKind::Dunes,
        SketchKind::Mache,
        SketchKind::Settlements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SketchKind::Bolt => "bolt",
            SketchKind::Dunes => "dunes",
            SketchKind::Mache => "mache",
            SketchKind::Settlements => "settlements",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bolt" | "lightning" => Some(SketchKind::Bolt),
            "dunes" => Some(SketchKind::Dunes),
            "mache" | "papier-mache" => Some(SketchKind::Mache),
            "settlements" | "board" => Some(SketchKind::Settlements),
            _ => None,
        }
    }

    /// Canvas size in pixels; the board has a fixed layout
    pub fn canvas(&self, cfg: &SketchConfig) -> Vec2 {
        match self {
            SketchKind::Settlements => {
                let layout = BoardLayout::default();
                Vec2::new(layout.canvas_width as f32, layout.canvas_height as f32)
            }
            _ => cfg.canvas(),
        }
    }

    /// Scene shown before any user input; bolts start from the canvas centre
    pub fn initial_scene<R: Rng + ?Sized>(&self, cfg: &SketchConfig, rng: &mut R) -> Result<Scene> {
        let scene = self.fresh(cfg, rng)?;
        log::info!("{} sketch: {} draw ops", self.as_str(), scene.ops.len());
        Ok(scene)
    }

    /// React to a trigger. `click` is the canvas position of a mouse press,
    /// `None` for a non-pointer request.
    ///
    /// Returns `None` when the trigger leaves the scene unchanged. A bolt
    /// scene only holds the new bolts over a fading wash, so a renderer
    /// composites it over the previous frame.
    pub fn regenerate<R: Rng + ?Sized>(
        &self,
        cfg: &SketchConfig,
        click: Option<Vec2>,
        rng: &mut R,
    ) -> Result<Option<Scene>> {
        let canvas = self.canvas(cfg);
        let scene = match self {
            SketchKind::Bolt => {
                let bolts = BoltConfig::for_canvas(cfg.canvas_width, cfg.canvas_height);
                let origin = match click {
                    Some(p) => p,
                    None => random_origin(canvas, rng),
                };
                bolt_scene(&bolts, canvas, origin, true, rng)
            }
            SketchKind::Dunes => match click {
                Some(p) if !inside(p, canvas) => {
                    log::debug!("Click at ({:.0}, {:.0}) outside canvas, ignored", p.x, p.y);
                    return Ok(None);
                }
                _ => self.fresh(cfg, rng)?,
            },
            SketchKind::Mache | SketchKind::Settlements => self.fresh(cfg, rng)?,
        };
        log::info!("{} sketch regenerated: {} draw ops", self.as_str(), scene.ops.len());
        Ok(Some(scene))
    }

    fn fresh<R: Rng + ?Sized>(&self, cfg: &SketchConfig, rng: &mut R) -> Result<Scene> {
        match self {
            SketchKind::Bolt => {
                let canvas = cfg.canvas();
                let bolts = BoltConfig::for_canvas(cfg.canvas_width, cfg.canvas_height);
                Ok(bolt_scene(&bolts, canvas, canvas / 2.0, false, rng))
            }
            SketchKind::Dunes => dunes_scene(cfg, rng),
            SketchKind::Mache => mesh_scene(cfg, rng),
            SketchKind::Settlements => Ok(board_scene(&BoardLayout::default(), rng)),
        }
    }
}

fn inside(p: Vec2, canvas: Vec2) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x <= canvas.x && p.y <= canvas.y
}
