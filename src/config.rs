//! Sketch configuration
//!
//! Parsed once from a `Name=value&Name=value` query string. Every numeric
//! parameter has a default, a minimum and a maximum: unparseable or missing
//! values fall back to the default, out-of-range values are clamped.

use serde::{Deserialize, Serialize};

/// Dune palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColourScheme {
    #[default]
    Desert,
    Mars,
    Water,
    Beach,
    Candy,
    Greyscale,
}

impl ColourScheme {
    pub const ALL: [ColourScheme; 6] = [
        ColourScheme::Desert,
        ColourScheme::Mars,
        ColourScheme::Water,
        ColourScheme::Beach,
        ColourScheme::Candy,
        ColourScheme::Greyscale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColourScheme::Desert => "Desert",
            ColourScheme::Mars => "Mars",
            ColourScheme::Water => "Water",
            ColourScheme::Beach => "Beach",
            ColourScheme::Candy => "Candy",
            ColourScheme::Greyscale => "Greyscale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "desert" => Some(ColourScheme::Desert),
            "mars" => Some(ColourScheme::Mars),
            "water" => Some(ColourScheme::Water),
            "beach" => Some(ColourScheme::Beach),
            "candy" => Some(ColourScheme::Candy),
            "greyscale" | "grayscale" | "grey" | "gray" => Some(ColourScheme::Greyscale),
            _ => None,
        }
    }
}

/// Name, default and inclusive bounds of one numeric parameter
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    /// Whole-number parameters are rounded before clamping
    pub integer: bool,
}

impl Param {
    const fn int(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self { name, default, min, max, integer: true }
    }

    const fn real(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self { name, default, min, max, integer: false }
    }

    /// Parse-or-default-then-clamp
    pub fn resolve(&self, raw: Option<&str>) -> f32 {
        let parsed = raw.and_then(|s| s.trim().parse::<f32>().ok()).filter(|v| v.is_finite());
        let value = match parsed {
            Some(v) if self.integer => crate::round_half_up(v),
            Some(v) => v,
            None => {
                if let Some(s) = raw {
                    log::warn!("{}: cannot parse {:?}, using default {}", self.name, s, self.default);
                }
                return self.default;
            }
        };
        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            log::warn!("{}: {} out of range, clamped to {}", self.name, value, clamped);
        }
        clamped
    }
}

pub const CANVAS_WIDTH: Param = Param::int("CanvasWidth", 1200.0, 10.0, 8192.0);
pub const CANVAS_HEIGHT: Param = Param::int("CanvasHeight", 800.0, 10.0, 8192.0);
pub const NUM_WAVES: Param = Param::int("NumWaves", 26.0, 2.0, 200.0);
pub const POINTS_PER_WAVE: Param = Param::int("PointsPerWave", 25.0, 2.0, 400.0);
pub const WAVE_VARIANCE: Param = Param::real("WaveVariance", 7.0, 0.0, 100.0);
pub const TRIANGLE_SIDE_LENGTH: Param = Param::int("TriangleSideLength", 50.0, 20.0, 150.0);
pub const DISPLACEMENT_LIMIT: Param = Param::int("DisplacementLimit", 15.0, 0.0, 75.0);
pub const COLOUR_VARIATION_LIMIT: Param = Param::int("ColourVariationLimit", 7.0, 0.0, 64.0);
pub const GRADIENT_SMOOTHNESS: Param = Param::real("GradientSmoothness", 0.04, 0.0, 0.5);

pub const SW_COLOUR: [Param; 3] = [
    Param::int("SWColourRed", 0.0, 0.0, 255.0),
    Param::int("SWColourGreen", 0.0, 0.0, 255.0),
    Param::int("SWColourBlue", 0.0, 0.0, 255.0),
];
pub const NE_COLOUR: [Param; 3] = [
    Param::int("NEColourRed", 255.0, 0.0, 255.0),
    Param::int("NEColourGreen", 255.0, 0.0, 255.0),
    Param::int("NEColourBlue", 255.0, 0.0, 255.0),
];

pub const COLOUR_SCHEME_NAME: &str = "ColourScheme";

/// Immutable configuration handed to every generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,

    // === Dunes ===
    pub num_waves: usize,
    pub points_per_wave: usize,
    pub wave_variance: f32,
    pub colour_scheme: ColourScheme,

    // === Papier-mache mesh ===
    pub triangle_side_length: f32,
    pub displacement_limit: f32,
    pub colour_variation_limit: i32,
    pub gradient_smoothness: f32,
    pub sw_colour: [u8; 3],
    pub ne_colour: [u8; 3],
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::from_query("")
    }
}

impl SketchConfig {
    /// Build a configuration from a query string such as
    /// `CanvasWidth=900&ColourScheme=mars`. A leading `?` is ignored.
    pub fn from_query(query: &str) -> Self {
        let pairs = parse_query(query);
        let get = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let colour_scheme = match get(COLOUR_SCHEME_NAME) {
            Some(raw) => ColourScheme::from_str(raw).unwrap_or_else(|| {
                log::warn!("{}: unknown scheme {:?}, using Desert", COLOUR_SCHEME_NAME, raw);
                ColourScheme::default()
            }),
            None => ColourScheme::default(),
        };

        let channel = |p: &Param| p.resolve(get(p.name)) as u8;

        Self {
            canvas_width: CANVAS_WIDTH.resolve(get(CANVAS_WIDTH.name)) as u32,
            canvas_height: CANVAS_HEIGHT.resolve(get(CANVAS_HEIGHT.name)) as u32,
            num_waves: NUM_WAVES.resolve(get(NUM_WAVES.name)) as usize,
            points_per_wave: POINTS_PER_WAVE.resolve(get(POINTS_PER_WAVE.name)) as usize,
            wave_variance: WAVE_VARIANCE.resolve(get(WAVE_VARIANCE.name)),
            colour_scheme,
            triangle_side_length: TRIANGLE_SIDE_LENGTH.resolve(get(TRIANGLE_SIDE_LENGTH.name)),
            displacement_limit: DISPLACEMENT_LIMIT.resolve(get(DISPLACEMENT_LIMIT.name)),
            colour_variation_limit: COLOUR_VARIATION_LIMIT.resolve(get(COLOUR_VARIATION_LIMIT.name))
                as i32,
            gradient_smoothness: GRADIENT_SMOOTHNESS.resolve(get(GRADIENT_SMOOTHNESS.name)),
            sw_colour: SW_COLOUR.each_ref().map(channel),
            ne_colour: NE_COLOUR.each_ref().map(channel),
        }
    }

    /// Canvas size as floats
    pub fn canvas(&self) -> glam::Vec2 {
        glam::Vec2::new(self.canvas_width as f32, self.canvas_height as f32)
    }

    /// Render the configuration back into query-string form
    pub fn to_query(&self) -> String {
        let [sr, sg, sb] = self.sw_colour;
        let [nr, ng, nb] = self.ne_colour;
        format!(
            "CanvasWidth={}&CanvasHeight={}&NumWaves={}&PointsPerWave={}&WaveVariance={}\
             &ColourScheme={}&TriangleSideLength={}&DisplacementLimit={}\
             &ColourVariationLimit={}&GradientSmoothness={}\
             &SWColourRed={}&SWColourGreen={}&SWColourBlue={}\
             &NEColourRed={}&NEColourGreen={}&NEColourBlue={}",
            self.canvas_width,
            self.canvas_height,
            self.num_waves,
            self.points_per_wave,
            self.wave_variance,
            self.colour_scheme.as_str(),
            self.triangle_side_length,
            self.displacement_limit,
            self.colour_variation_limit,
            self.gradient_smoothness,
            sr,
            sg,
            sb,
            nr,
            ng,
            nb,
        )
    }
}

/// Split a query string into decoded key/value pairs
fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.trim();
    let query = query.rsplit_once('?').map(|(_, q)| q).unwrap_or(query);
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SketchConfig::default();
        assert_eq!(cfg.canvas_width, 1200);
        assert_eq!(cfg.canvas_height, 800);
        assert_eq!(cfg.num_waves, 26);
        assert_eq!(cfg.points_per_wave, 25);
        assert_eq!(cfg.colour_scheme, ColourScheme::Desert);
        assert_eq!(cfg.triangle_side_length, 50.0);
        assert_eq!(cfg.displacement_limit, 15.0);
        assert_eq!(cfg.sw_colour, [0, 0, 0]);
        assert_eq!(cfg.ne_colour, [255, 255, 255]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let cfg = SketchConfig::from_query(
            "?TriangleSideLength=5&DisplacementLimit=900&PointsPerWave=1&NEColourRed=400",
        );
        assert_eq!(cfg.triangle_side_length, 20.0);
        assert_eq!(cfg.displacement_limit, 75.0);
        assert_eq!(cfg.points_per_wave, 2);
        assert_eq!(cfg.ne_colour[0], 255);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_default() {
        let cfg = SketchConfig::from_query("CanvasWidth=wide&NumWaves=&ColourScheme=plaid");
        assert_eq!(cfg.canvas_width, 1200);
        assert_eq!(cfg.num_waves, 26);
        assert_eq!(cfg.colour_scheme, ColourScheme::Desert);
    }

    #[test]
    fn test_integer_params_are_rounded() {
        let cfg = SketchConfig::from_query("CanvasHeight=640.5&WaveVariance=2.25");
        assert_eq!(cfg.canvas_height, 641);
        assert_eq!(cfg.wave_variance, 2.25);
    }

    #[test]
    fn test_colour_scheme_parse() {
        for scheme in ColourScheme::ALL {
            assert_eq!(ColourScheme::from_str(scheme.as_str()), Some(scheme));
        }
        assert_eq!(ColourScheme::from_str("GRAY"), Some(ColourScheme::Greyscale));
        let cfg = SketchConfig::from_query("ColourScheme=Candy");
        assert_eq!(cfg.colour_scheme, ColourScheme::Candy);
    }

    #[test]
    fn test_query_roundtrip() {
        let cfg = SketchConfig::from_query("CanvasWidth=900&ColourScheme=mars&SWColourGreen=12");
        assert_eq!(SketchConfig::from_query(&cfg.to_query()), cfg);
    }

    #[test]
    fn test_percent_decoding() {
        let pairs = parse_query("a=%41b&c=d+e&bad=%zz");
        assert_eq!(pairs[0], ("a".to_string(), "Ab".to_string()));
        assert_eq!(pairs[1].1, "d e");
        assert_eq!(pairs[2].1, "%zz");
    }
}
