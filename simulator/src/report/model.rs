use crate::workflow::runner::WorkflowResult;
use covcore::coverage::{ComplianceReport, Probe, ViewMode};
use covcore::math::StatsHelper;
use covcore::raster::{Fingerprint, GridSpec, RasterPass};
use covcore::telemetry::RasterMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub width: f64,
    pub height: f64,
    pub access_points: usize,
    pub enabled_access_points: usize,
    pub obstructions: usize,
}

/// Spread of the raster's cell values; `None` when no cell is finite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl ValueStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        Self {
            min: finite.iter().copied().reduce(f64::min),
            max: finite.iter().copied().reduce(f64::max),
            mean: StatsHelper::mean(finite),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub scene: SceneSummary,
    pub fingerprint: Fingerprint,
    pub mode: ViewMode,
    pub pass: RasterPass,
    pub grid: GridSpec,
    pub legend: (f64, f64),
    pub values: ValueStats,
    pub metrics: RasterMetrics,
    pub compliance: ComplianceReport,
    pub probes: Vec<Probe>,
}

impl CoverageReport {
    pub fn from_result(result: &WorkflowResult) -> Self {
        let scene = &result.scene;
        let raster = &result.raster;
        Self {
            scene: SceneSummary {
                width: scene.area.width,
                height: scene.area.height,
                access_points: scene.access_points.len(),
                enabled_access_points: scene.enabled_ap_count(),
                obstructions: scene.obstructions.len(),
            },
            fingerprint: raster.fingerprint,
            mode: raster.mode,
            pass: raster.pass,
            grid: raster.grid,
            legend: raster.legend,
            values: ValueStats::from_values(raster.values.iter().copied()),
            metrics: result.metrics,
            compliance: result.compliance.clone(),
            probes: result.probes.clone(),
        }
    }

    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        format!(
            "{} {} raster {}x{} | mean {} | compliance {:.1}% at {} dBm ({}) | probes {}",
            self.pass.name(),
            self.mode.name(),
            self.grid.cols,
            self.grid.rows,
            self.values
                .mean
                .map_or_else(|| "n/a".to_string(), |mean| format!("{:.1}", mean)),
            self.compliance.percent(),
            self.compliance.threshold_dbm,
            if self.compliance.meets_target {
                "meets target"
            } else {
                "below target"
            },
            self.probes.len()
        )
    }
}
