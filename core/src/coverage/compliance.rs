use crate::coverage::aggregator::Coverage;
use crate::math::stats::StatsHelper;
use crate::prelude::{EngineError, EngineResult, Point};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Coarse signal classification shown next to probe values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Weak,
    VeryWeak,
}

impl SignalQuality {
    pub fn from_rssi(rssi_dbm: f64) -> Self {
        if rssi_dbm > -50.0 {
            SignalQuality::Excellent
        } else if rssi_dbm > -60.0 {
            SignalQuality::Good
        } else if rssi_dbm > -70.0 {
            SignalQuality::Fair
        } else if rssi_dbm > -80.0 {
            SignalQuality::Weak
        } else {
            SignalQuality::VeryWeak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Best-server RSSI a sample must reach, dBm.
    pub threshold_dbm: f64,
    /// Share of samples that must comply, percent.
    pub target_percent: f64,
    /// Distance between sample points along each axis, meters.
    pub spacing: f64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            threshold_dbm: -85.0,
            target_percent: 80.0,
            spacing: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub samples: usize,
    pub fraction: f64,
    pub threshold_dbm: f64,
    pub target_percent: f64,
    pub meets_target: bool,
}

impl ComplianceReport {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Sample positions `0, s, 2s, …` up to and including `extent`.
fn axis_samples(extent: f64, spacing: f64) -> Vec<f64> {
    let steps = ((extent + 1e-9) / spacing).floor() as usize;
    (0..=steps).map(|i| i as f64 * spacing).collect()
}

/// Fraction of a regular sample lattice whose best-server RSSI meets the threshold.
///
/// The lattice covers the area edge to edge, both borders included.
pub fn compliance(coverage: &Coverage<'_>, config: &ComplianceConfig) -> EngineResult<ComplianceReport> {
    if !(config.spacing.is_finite() && config.spacing > 0.0) {
        return Err(EngineError::InvalidConfig(format!(
            "compliance spacing must be positive, got {}",
            config.spacing
        )));
    }
    let area = coverage.scene().area;
    area.validate()?;

    let xs = axis_samples(area.width, config.spacing);
    let ys = axis_samples(area.height, config.spacing);
    let levels: Vec<f64> = xs
        .par_iter()
        .flat_map_iter(|&x| {
            ys.iter()
                .map(move |&y| coverage.best_server(&Point::new(x, y)).rssi_dbm)
        })
        .collect();

    let fraction = StatsHelper::fraction_at_least(levels.iter().copied(), config.threshold_dbm);
    Ok(ComplianceReport {
        samples: levels.len(),
        fraction,
        threshold_dbm: config.threshold_dbm,
        target_percent: config.target_percent,
        meets_target: fraction * 100.0 >= config.target_percent,
    })
}
