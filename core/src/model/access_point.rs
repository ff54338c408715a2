use crate::prelude::Point;
use serde::{Deserialize, Serialize};

/// Mounting height assumed when an access point does not carry one, in meters.
pub const DEFAULT_AP_HEIGHT: f64 = 2.5;

/// A transmitter placed on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub id: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub tx_power_dbm: f64,
    /// Static antenna gain, used whenever no directional pattern applies.
    pub gain_dbi: f64,
    pub channel: u32,
    /// Boresight bearing, degrees clockwise from north.
    #[serde(default)]
    pub azimuth_deg: f64,
    /// Downtilt of the boresight below horizontal, degrees.
    #[serde(default)]
    pub tilt_deg: f64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Name of an entry in the antenna pattern store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl AccessPoint {
    pub fn new(
        id: impl Into<String>,
        position: Point,
        tx_power_dbm: f64,
        gain_dbi: f64,
        channel: u32,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            height: None,
            tx_power_dbm,
            gain_dbi,
            channel,
            azimuth_deg: 0.0,
            tilt_deg: 0.0,
            enabled: true,
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_orientation(mut self, azimuth_deg: f64, tilt_deg: f64) -> Self {
        self.azimuth_deg = azimuth_deg;
        self.tilt_deg = tilt_deg;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn mount_height(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_AP_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{"id":"ap-1","position":{"x":1.0,"y":2.0},"tx_power_dbm":15.0,"gain_dbi":5.0,"channel":6}"#;
        let ap: AccessPoint = serde_json::from_str(json).unwrap();
        assert!(ap.enabled);
        assert_eq!(ap.pattern, None);
        assert_eq!(ap.mount_height(), DEFAULT_AP_HEIGHT);
    }
}
