use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use covcore::coverage::{compliance, ComplianceReport, Coverage, Probe};
use covcore::model::Scene;
use covcore::raster::{HeatmapRaster, RasterScheduler};
use covcore::telemetry::RasterMetrics;
use std::sync::Arc;

pub struct WorkflowResult {
    pub scene: Arc<Scene>,
    pub raster: Arc<HeatmapRaster>,
    pub compliance: ComplianceReport,
    pub probes: Vec<Probe>,
    pub metrics: RasterMetrics,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Scheduler over the workflow's scene, ready for [`Runner::execute`].
    pub fn scheduler(&self) -> anyhow::Result<Arc<RasterScheduler>> {
        let scene = self.config.build_scene()?;
        let scheduler = RasterScheduler::new(scene, self.config.view.clone())
            .context("creating raster scheduler")?;
        Ok(Arc::new(scheduler))
    }

    pub async fn execute(&self, scheduler: &RasterScheduler) -> anyhow::Result<WorkflowResult> {
        let raster = scheduler
            .refresh(self.config.refresh)
            .await
            .context("refreshing coverage raster")?;

        let scene = scheduler.scene();
        let coverage = Coverage::new(&scene).with_config(self.config.aggregator);
        let compliance =
            compliance(&coverage, &self.config.compliance).context("computing compliance")?;

        let focus = self.config.view.focus_ap.as_deref();
        let probes = self
            .config
            .probes
            .iter()
            .map(|point| scheduler.probe(point, focus, self.config.aggregator))
            .collect();

        Ok(WorkflowResult {
            scene,
            raster,
            compliance,
            probes,
            metrics: scheduler.metrics(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::GeneratorConfig;
    use covcore::coverage::ViewMode;
    use covcore::raster::{RasterPass, RefreshMode, ViewRequest};
    use covcore::Point;

    fn config() -> WorkflowConfig {
        let view = ViewRequest {
            cell_size: 1.0,
            ..ViewRequest::new(ViewMode::Rssi)
        };
        let mut cfg = WorkflowConfig::from_args(20.0, 14.0, 3, 11, view);
        cfg.probes = vec![Point::new(1.0, 1.0), Point::new(10.0, 7.0)];
        cfg
    }

    #[tokio::test]
    async fn runner_executes_full_refinement() {
        let runner = Runner::new(config());
        let scheduler = runner.scheduler().unwrap();
        let result = runner.execute(&scheduler).await.unwrap();
        assert_eq!(result.raster.pass, RasterPass::Accurate);
        assert_eq!((result.raster.width(), result.raster.height()), (30, 21));
        assert_eq!(result.metrics.published, 2);
        assert_eq!(result.probes.len(), 2);
        assert!(result.probes.iter().all(|probe| probe.ap_id.is_some()));
        assert!(result.compliance.samples > 0);
        assert!((0.0..=1.0).contains(&result.compliance.fraction));
    }

    #[tokio::test]
    async fn interactive_refresh_stops_after_fast_pass() {
        let mut cfg = config();
        cfg.refresh = RefreshMode::Interactive;
        let runner = Runner::new(cfg);
        let scheduler = runner.scheduler().unwrap();
        let result = runner.execute(&scheduler).await.unwrap();
        assert_eq!(result.raster.pass, RasterPass::Fast);
        assert_eq!(result.metrics.published, 1);
    }

    #[tokio::test]
    async fn empty_scene_reports_no_server_everywhere() {
        let mut cfg = config();
        cfg.generator = Some(GeneratorConfig {
            width: 20.0,
            height: 14.0,
            ap_count: 0,
            ..Default::default()
        });
        let runner = Runner::new(cfg);
        let scheduler = runner.scheduler().unwrap();
        let result = runner.execute(&scheduler).await.unwrap();
        assert!(result.probes.iter().all(|probe| probe.ap_id.is_none()));
        assert_eq!(result.compliance.fraction, 0.0);
        assert!(!result.compliance.meets_target);
    }

    #[test]
    fn invalid_view_fails_before_rendering() {
        let mut cfg = config();
        cfg.view.cell_size = 0.0;
        assert!(Runner::new(cfg).scheduler().is_err());
    }
}
