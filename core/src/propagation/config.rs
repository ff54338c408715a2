use crate::prelude::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Empirical loss model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ModelVariant {
    /// 2.5D model: reference loss plus `N·log10(d)`, walls, ground, floor planes and vertical factor.
    #[default]
    P25d,
    /// ITU-R P.525 free space with ground and floor-plane losses, no walls.
    P525,
}

impl ModelVariant {
    /// Resolves a variant name, falling back to the default for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "p25d" => ModelVariant::P25d,
            "p525" => ModelVariant::P525,
            other => {
                log::warn!(
                    "unknown propagation model '{}', using {}",
                    other,
                    ModelVariant::default().name()
                );
                ModelVariant::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelVariant::P25d => "p25d",
            ModelVariant::P525 => "p525",
        }
    }

    pub fn includes_walls(self) -> bool {
        matches!(self, ModelVariant::P25d)
    }

    pub fn includes_vertical_factor(self) -> bool {
        matches!(self, ModelVariant::P25d)
    }
}

impl From<String> for ModelVariant {
    fn from(name: String) -> Self {
        ModelVariant::from_name(&name)
    }
}

/// Settings shared by every loss and gain computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    pub frequency_mhz: f64,
    /// Distance term multiplier applied to `log10(d)` by the 2.5D model.
    pub exponent: f64,
    pub model: ModelVariant,
    pub noise_floor_dbm: f64,
    /// Constant 2.5D adjustment added to every path, dB.
    pub vertical_factor_db: f64,
    /// Calibration offset subtracted from every RSSI, dB.
    pub reference_offset_db: f64,
    /// Distances are clamped to at least this many meters.
    pub min_distance: f64,
    /// Receiver antenna height used for elevation angles, meters.
    pub receiver_height: f64,
    /// Multiplier applied to pattern offsets from peak gain.
    pub pattern_shape_factor: f64,
    /// Require the sight line's height profile to pierce floor planes, not just cross them in plan.
    pub floor_height_check: bool,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            frequency_mhz: 2400.0,
            exponent: 10.0,
            model: ModelVariant::P25d,
            noise_floor_dbm: -92.0,
            vertical_factor_db: 2.0,
            reference_offset_db: 0.0,
            min_distance: 0.5,
            receiver_height: 1.5,
            pattern_shape_factor: 1.0,
            floor_height_check: false,
        }
    }
}

impl PropagationConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.frequency_mhz.is_finite() && self.frequency_mhz > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "frequency must be positive, got {} MHz",
                self.frequency_mhz
            )));
        }
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "minimum distance must be positive, got {}",
                self.min_distance
            )));
        }
        if !self.exponent.is_finite() || self.exponent < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "path-loss exponent must be non-negative, got {}",
                self.exponent
            )));
        }
        Ok(())
    }
}
