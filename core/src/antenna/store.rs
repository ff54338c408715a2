use crate::antenna::pattern::{interpolate_gain, AntennaPattern};
use crate::math::units::wrap_degrees;
use crate::model::AccessPoint;
use crate::prelude::{EngineError, EngineResult, Point};
use crate::propagation::PropagationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Below this horizontal distance the vertical pattern is not consulted, meters.
const MIN_VERTICAL_DISTANCE: f64 = 0.1;

/// How antenna gain is evaluated for a transmitter/receiver pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainMode {
    /// Static AP gain only; used for fast previews.
    Static,
    /// Full pattern lookup by bearing and elevation.
    #[default]
    Directional,
}

/// Registry of loaded antenna patterns, shared read-only by every AP.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: BTreeMap<String, Arc<AntennaPattern>>,
    default_pattern: Option<String>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a pattern under its name, returning the previous entry.
    pub fn insert(&mut self, pattern: AntennaPattern) -> Option<Arc<AntennaPattern>> {
        self.patterns
            .insert(pattern.name.clone(), Arc::new(pattern))
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<AntennaPattern>> {
        if self.default_pattern.as_deref() == Some(name) {
            self.default_pattern = None;
        }
        self.patterns.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<AntennaPattern>> {
        self.patterns.get(name)
    }

    /// Marks a loaded pattern as the one used by APs without an explicit pattern.
    pub fn set_default(&mut self, name: Option<&str>) -> EngineResult<()> {
        match name {
            Some(name) if !self.patterns.contains_key(name) => Err(EngineError::InvalidConfig(
                format!("unknown antenna pattern '{}'", name),
            )),
            Some(name) => {
                self.default_pattern = Some(name.to_string());
                Ok(())
            }
            None => {
                self.default_pattern = None;
                Ok(())
            }
        }
    }

    pub fn default_pattern(&self) -> Option<&Arc<AntennaPattern>> {
        self.default_pattern
            .as_deref()
            .and_then(|name| self.patterns.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern that applies to `ap`: its named pattern, else the store default.
    ///
    /// A name that is not loaded resolves to nothing, so the AP keeps its static gain.
    pub fn resolve(&self, ap: &AccessPoint) -> Option<&AntennaPattern> {
        match ap.pattern.as_deref() {
            Some(name) => {
                let found = self.patterns.get(name).map(Arc::as_ref);
                if found.is_none() {
                    log::debug!("AP {} references unloaded pattern '{}'", ap.id, name);
                }
                found
            }
            None => self.default_pattern().map(Arc::as_ref),
        }
    }

    /// Effective antenna gain of `ap` towards `point`, dBi.
    ///
    /// Bearing is measured clockwise from north (`-y`) and made relative to the
    /// AP's azimuth; elevation runs from the AP's mount height down to the
    /// receiver height and is made relative to the tilt. Horizontal and vertical
    /// offsets are added to the pattern's peak gain.
    pub fn angle_dependent_gain(
        &self,
        ap: &AccessPoint,
        point: &Point,
        config: &PropagationConfig,
    ) -> f64 {
        let pattern = match self.resolve(ap) {
            Some(pattern) if pattern.is_directional() => pattern,
            _ => return ap.gain_dbi,
        };

        let dx = point.x - ap.position.x;
        let dy = point.y - ap.position.y;
        let horizontal_distance = dx.hypot(dy);
        if horizontal_distance == 0.0 {
            return ap.gain_dbi;
        }

        let bearing = wrap_degrees(dx.atan2(-dy).to_degrees());
        let horizontal_angle = wrap_degrees(bearing - ap.azimuth_deg);
        let horizontal_offset = interpolate_gain(&pattern.horizontal, horizontal_angle);

        let vertical_offset =
            if horizontal_distance > MIN_VERTICAL_DISTANCE && !pattern.vertical.is_empty() {
                let drop = ap.mount_height() - config.receiver_height;
                let elevation = drop.atan2(horizontal_distance).to_degrees();
                let relative = (elevation - ap.tilt_deg).clamp(-90.0, 90.0);
                // Below boresight maps towards 270°, above towards 90°.
                interpolate_gain(&pattern.vertical, wrap_degrees(-relative))
            } else {
                0.0
            };

        pattern.peak_gain_dbi + config.pattern_shape_factor * (horizontal_offset + vertical_offset)
    }

    /// Gain under the requested evaluation mode.
    pub fn gain(
        &self,
        ap: &AccessPoint,
        point: &Point,
        config: &PropagationConfig,
        mode: GainMode,
    ) -> f64 {
        match mode {
            GainMode::Static => ap.gain_dbi,
            GainMode::Directional => self.angle_dependent_gain(ap, point, config),
        }
    }
}
