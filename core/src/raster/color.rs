//! Value-to-color mapping for raster cells.

use crate::coverage::Category;
use serde::{Deserialize, Serialize};

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Hue step between consecutive interferer counts, degrees.
const GOLDEN_ANGLE: f64 = 137.508;

/// Fractions of the legend range where contour zones change.
const ZONE_LOW: f64 = 0.33;
const ZONE_HIGH: f64 = 0.67;

/// Lowest share of the legend range left uncolored.
const TRANSPARENT_BELOW: f64 = 0.01;

/// Colors used by the numeric gradient and categorical views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub weak: [u8; 3],
    pub mid: [u8; 3],
    pub strong: [u8; 3],
    pub gradient_alpha: u8,
    pub categorical_alpha: u8,
    pub no_server: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            weak: [255, 0, 0],
            mid: [255, 255, 0],
            strong: [0, 255, 0],
            gradient_alpha: 220,
            categorical_alpha: 230,
            no_server: [200, 200, 200, 230],
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Converts HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0);
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// 32-bit FNV-1a over the key's UTF-16 code units.
pub fn fnv1a(key: &str) -> u32 {
    key.encode_utf16().fold(2_166_136_261u32, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(16_777_619)
    })
}

/// Deterministic pseudo-random value in `[0, 1)` from a seed.
fn seeded_unit(seed: u32) -> f64 {
    let x = (seed as f64).sin() * 10_000.0;
    x - x.floor()
}

impl Palette {
    fn with_alpha(rgb: [u8; 3], alpha: u8) -> Rgba {
        [rgb[0], rgb[1], rgb[2], alpha]
    }

    /// Gradient or contour color for a continuous value against the legend range.
    pub fn numeric(&self, value: f64, min: f64, max: f64, contours: bool) -> Rgba {
        let span = max - min;
        if !value.is_finite() || span <= 0.0 {
            return TRANSPARENT;
        }
        let t = ((value - min) / span).clamp(0.0, 1.0);
        if t <= TRANSPARENT_BELOW {
            return TRANSPARENT;
        }
        if contours {
            return self.zone(t);
        }
        let rgb = if t <= 0.5 {
            lerp_rgb(self.weak, self.mid, t / 0.5)
        } else {
            lerp_rgb(self.mid, self.strong, (t - 0.5) / 0.5)
        };
        Self::with_alpha(rgb, self.gradient_alpha)
    }

    fn zone(&self, t: f64) -> Rgba {
        let rgb = if t < ZONE_LOW {
            self.weak
        } else if t < ZONE_HIGH {
            self.mid
        } else {
            self.strong
        };
        Self::with_alpha(rgb, self.gradient_alpha)
    }

    pub fn server(&self, ap_id: &str) -> Rgba {
        let hue = (fnv1a(ap_id) % 360) as f64;
        Self::with_alpha(hsl_to_rgb(hue, 0.65, 0.55), self.categorical_alpha)
    }

    pub fn channel(&self, channel: u32) -> Rgba {
        let key = channel.to_string();
        let hue = seeded_unit(fnv1a(&format!("ch_color_{}", key))) * 360.0;
        let saturation = 0.7 + seeded_unit(fnv1a(&format!("ch_sat_{}", key))) * 0.2;
        let lightness = 0.5 + seeded_unit(fnv1a(&format!("ch_light_{}", key))) * 0.1;
        Self::with_alpha(hsl_to_rgb(hue, saturation, lightness), self.categorical_alpha)
    }

    pub fn count(&self, count: usize) -> Rgba {
        let hue = (count as f64 * GOLDEN_ANGLE) % 360.0;
        Self::with_alpha(hsl_to_rgb(hue, 0.75, 0.55), self.categorical_alpha)
    }

    pub fn category(&self, category: &Category<'_>) -> Rgba {
        match category {
            Category::Server(id) => self.server(id),
            Category::Channel(channel) => self.channel(*channel),
            Category::Count(count) => self.count(*count),
            Category::NoServer => self.no_server,
        }
    }
}
