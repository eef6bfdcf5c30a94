//! Sketchbook entry point
//!
//! Generates one sketch, optionally applies a click, and writes the scene
//! as JSON and/or PNG.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use sketchbook::renderer::export_png;
use sketchbook::{SketchConfig, SketchKind};

#[derive(Parser, Debug)]
#[command(name = "sketchbook")]
#[command(about = "Generate lightning, dune, papier-mache and hex board sketches")]
struct Args {
    /// Sketch to generate: bolt, dunes, mache or settlements
    #[arg(value_parser = parse_kind)]
    sketch: SketchKind,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Parameters as a query string, e.g. "NumWaves=12&ColourScheme=mars"
    #[arg(short, long, default_value = "")]
    query: String,

    /// Colour scheme for dunes, overriding the query
    #[arg(long)]
    scheme: Option<String>,

    /// Simulate a click at X,Y after the first scene
    #[arg(long, value_parser = parse_point)]
    click: Option<Vec2>,

    /// Write the scene as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the scene as a PNG
    #[arg(long)]
    png: Option<PathBuf>,
}

fn parse_kind(s: &str) -> Result<SketchKind, String> {
    SketchKind::from_str(s).ok_or_else(|| format!("unknown sketch '{s}'"))
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s.split_once(',').ok_or("expected X,Y")?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn run(args: Args) -> sketchbook::Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Sketch '{}' with seed: {}", args.sketch.as_str(), seed);
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut query = args.query.clone();
    if let Some(scheme) = &args.scheme {
        query.push_str("&ColourScheme=");
        query.push_str(scheme);
    }
    let cfg = SketchConfig::from_query(&query);
    log::debug!("Config: {}", cfg.to_query());

    let mut scene = args.sketch.initial_scene(&cfg, &mut rng)?;
    if let Some(click) = args.click {
        match args.sketch.regenerate(&cfg, Some(click), &mut rng)? {
            Some(next) if args.sketch == SketchKind::Bolt => {
                // Bolts paint over the previous frame
                scene.ops.extend(next.ops);
            }
            Some(next) => scene = next,
            None => log::info!("Click left the scene unchanged"),
        }
    }

    if let Some(path) = &args.json {
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(file, &scene)?;
        log::info!("Wrote {} draw ops to {}", scene.ops.len(), path.display());
    }
    if let Some(path) = &args.png {
        export_png(&scene, path)?;
    }
    if args.json.is_none() && args.png.is_none() {
        log::warn!("No --json or --png given, nothing written");
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
