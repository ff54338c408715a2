use crate::coverage::{AggregatorConfig, Coverage, Probe};
use crate::model::Scene;
use crate::prelude::{EngineError, EngineResult, Point};
use crate::raster::cache::{Fingerprint, HeatmapRaster, RasterCache, RasterStatus};
use crate::raster::generator::RasterGenerator;
use crate::raster::view::{RasterPass, ViewRequest};
use crate::telemetry::{MetricsRecorder, RasterMetrics};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;

/// How far a refresh refines the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Fast pass only, for use while an AP is being dragged.
    Interactive,
    /// Fast pass, then the accurate pass replacing it.
    #[default]
    Full,
}

struct Inputs {
    scene: Arc<Scene>,
    request: ViewRequest,
}

/// Outcome of starting a refresh.
enum Start {
    Cached(Arc<HeatmapRaster>),
    Render {
        scene: Arc<Scene>,
        request: ViewRequest,
        fingerprint: Fingerprint,
    },
}

/// Owns the current inputs and the raster slot, and runs passes off the caller's thread.
///
/// Every mutation goes through [`RasterScheduler::update_scene`] or
/// [`RasterScheduler::set_view`], which bump the cache generation while still
/// holding the input lock. Starting a refresh bumps it too unless a finished
/// raster already matches the inputs, so at most one refresh is ever live.
/// In-flight passes notice the bump at their next row and stop.
pub struct RasterScheduler {
    inputs: RwLock<Inputs>,
    cache: Arc<RasterCache>,
    metrics: Arc<MetricsRecorder>,
}

impl RasterScheduler {
    pub fn new(scene: Scene, request: ViewRequest) -> EngineResult<Self> {
        scene.validate()?;
        request.validate_for(&scene.area)?;
        let cache = Arc::new(RasterCache::new(scene.enabled_ap_count()));
        Ok(Self {
            inputs: RwLock::new(Inputs {
                scene: Arc::new(scene),
                request,
            }),
            cache,
            metrics: Arc::new(MetricsRecorder::new()),
        })
    }

    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.read_inputs().scene)
    }

    pub fn request(&self) -> ViewRequest {
        self.read_inputs().request.clone()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.cache.fingerprint()
    }

    pub fn status(&self) -> RasterStatus {
        self.cache.status()
    }

    pub fn metrics(&self) -> RasterMetrics {
        self.metrics.snapshot()
    }

    /// Raster to display now, if any matches the current inputs.
    pub fn current(&self) -> Option<Arc<HeatmapRaster>> {
        self.cache.current()
    }

    fn read_inputs(&self) -> std::sync::RwLockReadGuard<'_, Inputs> {
        self.inputs.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` to a copy of the scene and invalidates the raster.
    ///
    /// A mutation that leaves the scene invalid is rejected and the previous
    /// scene kept.
    pub fn update_scene<F>(&self, mutate: F) -> EngineResult<Fingerprint>
    where
        F: FnOnce(&mut Scene),
    {
        let mut inputs = self.inputs.write().unwrap_or_else(PoisonError::into_inner);
        let mut scene = Scene::clone(&inputs.scene);
        mutate(&mut scene);
        scene.validate()?;
        inputs.request.validate_for(&scene.area)?;
        let fingerprint = self.cache.invalidate(scene.enabled_ap_count());
        inputs.scene = Arc::new(scene);
        Ok(fingerprint)
    }

    pub fn set_view(&self, request: ViewRequest) -> EngineResult<Fingerprint> {
        let mut inputs = self.inputs.write().unwrap_or_else(PoisonError::into_inner);
        request.validate_for(&inputs.scene.area)?;
        let fingerprint = self.cache.invalidate(inputs.scene.enabled_ap_count());
        inputs.request = request;
        Ok(fingerprint)
    }

    /// Aborts in-flight passes and drops the current raster, keeping the inputs.
    pub fn cancel(&self) -> Fingerprint {
        let inputs = self.inputs.write().unwrap_or_else(PoisonError::into_inner);
        self.cache.invalidate(inputs.scene.enabled_ap_count())
    }

    /// Serves a finished raster or opens a new generation for `mode`.
    ///
    /// Runs under the input lock so the inputs handed to the passes are the
    /// ones the new fingerprint stands for.
    fn start(&self, mode: RefreshMode) -> Start {
        let inputs = self.inputs.write().unwrap_or_else(PoisonError::into_inner);
        let cached = self.cache.valid().filter(|raster| {
            mode == RefreshMode::Interactive || raster.pass == RasterPass::Accurate
        });
        if let Some(raster) = cached {
            self.metrics.record_cache_hit();
            return Start::Cached(raster);
        }
        Start::Render {
            scene: Arc::clone(&inputs.scene),
            request: inputs.request.clone(),
            fingerprint: self.cache.invalidate(inputs.scene.enabled_ap_count()),
        }
    }

    async fn run_pass(
        &self,
        scene: Arc<Scene>,
        request: ViewRequest,
        fingerprint: Fingerprint,
        pass: RasterPass,
        refining: bool,
    ) -> EngineResult<Arc<HeatmapRaster>> {
        let superseded = EngineError::Superseded {
            generation: fingerprint.generation,
        };
        if !self.cache.begin(pass, fingerprint) {
            self.metrics.record_discarded();
            return Err(superseded);
        }

        let cache = Arc::clone(&self.cache);
        let rendered = tokio::task::spawn_blocking(move || {
            RasterGenerator::new(&scene, &request, pass)?
                .render(fingerprint, || !cache.is_current(fingerprint.generation))
        })
        .await
        .map_err(|err| EngineError::Internal(format!("raster worker failed: {}", err)));

        let raster = match rendered.and_then(|result| result) {
            Ok(raster) => raster,
            Err(err @ EngineError::Superseded { .. }) => {
                self.metrics.record_discarded();
                return Err(err);
            }
            Err(err) => {
                self.metrics.record_error();
                return Err(err);
            }
        };

        let cells = raster.grid.cell_count();
        match self.cache.publish(raster, refining) {
            Some(raster) => {
                self.metrics.record_published(cells);
                Ok(raster)
            }
            None => {
                self.metrics.record_discarded();
                Err(superseded)
            }
        }
    }

    async fn render(
        &self,
        mode: RefreshMode,
        scene: Arc<Scene>,
        request: ViewRequest,
        fingerprint: Fingerprint,
    ) -> EngineResult<Arc<HeatmapRaster>> {
        let refining = mode == RefreshMode::Full;
        let fast = self
            .run_pass(
                Arc::clone(&scene),
                request.clone(),
                fingerprint,
                RasterPass::Fast,
                refining,
            )
            .await?;
        if !refining {
            return Ok(fast);
        }
        self.run_pass(scene, request, fingerprint, RasterPass::Accurate, false)
            .await
    }

    /// Brings the raster up to date with the current inputs.
    ///
    /// A finished raster that already matches is returned as is. Otherwise any
    /// refresh still in flight is superseded and the passes run again. Returns
    /// the last raster published, or `Superseded` when the inputs changed or
    /// another refresh started before this one completed.
    pub async fn refresh(&self, mode: RefreshMode) -> EngineResult<Arc<HeatmapRaster>> {
        match self.start(mode) {
            Start::Cached(raster) => Ok(raster),
            Start::Render {
                scene,
                request,
                fingerprint,
            } => self.render(mode, scene, request, fingerprint).await,
        }
    }

    /// Starts a refresh in the background on the current runtime.
    ///
    /// The new generation is taken before this returns, so a refresh scheduled
    /// earlier is already superseded.
    pub fn schedule(
        self: &Arc<Self>,
        mode: RefreshMode,
    ) -> JoinHandle<EngineResult<Arc<HeatmapRaster>>> {
        let start = self.start(mode);
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            match start {
                Start::Cached(raster) => Ok(raster),
                Start::Render {
                    scene,
                    request,
                    fingerprint,
                } => scheduler.render(mode, scene, request, fingerprint).await,
            }
        })
    }

    /// Point metrics against the current scene with full pattern lookup.
    pub fn probe(&self, point: &Point, focus_ap: Option<&str>, config: AggregatorConfig) -> Probe {
        let scene = self.scene();
        Coverage::new(&scene)
            .with_config(config)
            .with_focus(focus_ap)
            .probe(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::ViewMode;
    use crate::model::AccessPoint;
    use crate::prelude::Area;

    fn scheduler() -> Arc<RasterScheduler> {
        let scene = Scene::new(Area::new(20.0, 14.0).unwrap())
            .with_access_point(AccessPoint::new("a", Point::new(5.0, 7.0), 15.0, 5.0, 1));
        let request = ViewRequest {
            cell_size: 1.0,
            ..ViewRequest::new(ViewMode::Rssi)
        };
        Arc::new(RasterScheduler::new(scene, request).unwrap())
    }

    #[tokio::test]
    async fn full_refresh_ends_valid_with_accurate_raster() {
        let scheduler = scheduler();
        let raster = scheduler.refresh(RefreshMode::Full).await.unwrap();
        assert_eq!(raster.pass, RasterPass::Accurate);
        assert_eq!(scheduler.status(), RasterStatus::Valid);
        assert_eq!(scheduler.current().unwrap().pass, RasterPass::Accurate);
        let metrics = scheduler.metrics();
        assert_eq!(metrics.published, 2);
        assert_eq!(metrics.cells, 20 * 14 + 30 * 21);
    }

    #[tokio::test]
    async fn interactive_refresh_keeps_fast_raster_valid() {
        let scheduler = scheduler();
        let raster = scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        assert_eq!(raster.pass, RasterPass::Fast);
        assert_eq!(scheduler.status(), RasterStatus::Valid);
    }

    #[tokio::test]
    async fn adding_an_ap_changes_fingerprint_and_drops_raster() {
        let scheduler = scheduler();
        let raster = scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        let after = scheduler
            .update_scene(|scene| {
                scene
                    .access_points
                    .push(AccessPoint::new("b", Point::new(15.0, 7.0), 15.0, 5.0, 1));
            })
            .unwrap();
        assert_ne!(raster.fingerprint, after);
        assert_eq!(after.enabled_aps, 2);
        assert!(scheduler.current().is_none());
        assert_eq!(scheduler.status(), RasterStatus::Empty);
    }

    #[tokio::test]
    async fn view_change_invalidates() {
        let scheduler = scheduler();
        let before = scheduler.fingerprint();
        scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        let after = scheduler.set_view(ViewRequest::new(ViewMode::Snr)).unwrap();
        assert!(after.generation > before.generation);
        assert!(scheduler.current().is_none());
    }

    #[tokio::test]
    async fn invalid_mutation_is_rejected_without_invalidating() {
        let scheduler = scheduler();
        let before = scheduler.fingerprint();
        let result = scheduler.update_scene(|scene| scene.propagation.frequency_mhz = 0.0);
        assert!(result.is_err());
        assert_eq!(scheduler.fingerprint(), before);
        assert_eq!(scheduler.scene().propagation.frequency_mhz, 2400.0);
    }

    #[tokio::test]
    async fn view_too_fine_for_the_area_is_rejected() {
        let scheduler = scheduler();
        let before = scheduler.fingerprint();
        let too_fine = ViewRequest {
            cell_size: 1e-6,
            ..scheduler.request()
        };
        assert!(matches!(
            scheduler.set_view(too_fine),
            Err(EngineError::InvalidConfig(_))
        ));
        assert_eq!(scheduler.fingerprint(), before);
        let grown = scheduler.update_scene(|scene| scene.area = Area::new(1e9, 1e9).unwrap());
        assert!(grown.is_err());
        assert_eq!(scheduler.scene().area.width, 20.0);
    }

    #[tokio::test]
    async fn background_refresh_completes() {
        let scheduler = scheduler();
        let raster = scheduler.schedule(RefreshMode::Full).await.unwrap().unwrap();
        assert_eq!(raster.fingerprint, scheduler.fingerprint());
    }

    #[tokio::test]
    async fn cancel_supersedes_published_raster() {
        let scheduler = scheduler();
        let raster = scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        let after = scheduler.cancel();
        assert_eq!(after.enabled_aps, raster.fingerprint.enabled_aps);
        assert!(after.generation > raster.fingerprint.generation);
        assert!(scheduler.current().is_none());
    }

    #[tokio::test]
    async fn newer_schedule_supersedes_the_one_in_flight() {
        let scheduler = scheduler();
        let first = scheduler.schedule(RefreshMode::Full);
        let second = scheduler.schedule(RefreshMode::Full);
        let first = first.await.unwrap();
        assert!(matches!(first, Err(EngineError::Superseded { .. })));
        let raster = second.await.unwrap().unwrap();
        assert_eq!(raster.pass, RasterPass::Accurate);
        assert_eq!(raster.fingerprint, scheduler.fingerprint());
        assert_eq!(scheduler.status(), RasterStatus::Valid);
        let metrics = scheduler.metrics();
        assert_eq!(metrics.published, 2);
        assert!(metrics.discarded >= 1);
    }

    #[tokio::test]
    async fn late_interactive_refresh_cannot_replace_accurate_raster() {
        let scheduler = scheduler();
        let accurate = scheduler.refresh(RefreshMode::Full).await.unwrap();
        let again = scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        assert!(Arc::ptr_eq(&accurate, &again));
        assert_eq!(scheduler.current().unwrap().pass, RasterPass::Accurate);
        assert_eq!(scheduler.metrics().cache_hits, 1);
        assert_eq!(scheduler.metrics().published, 2);
    }

    #[tokio::test]
    async fn full_refresh_refines_an_interactive_raster() {
        let scheduler = scheduler();
        let fast = scheduler.refresh(RefreshMode::Interactive).await.unwrap();
        let full = scheduler.refresh(RefreshMode::Full).await.unwrap();
        assert_eq!(full.pass, RasterPass::Accurate);
        assert!(full.fingerprint.generation > fast.fingerprint.generation);
        assert_eq!(scheduler.metrics().cache_hits, 0);
    }

    #[test]
    fn probe_reads_current_scene() {
        let scheduler = scheduler();
        let probe = scheduler.probe(&Point::new(6.0, 7.0), None, AggregatorConfig::default());
        assert_eq!(probe.ap_id.as_deref(), Some("a"));
        assert_eq!(probe.channel, Some(1));
    }
}
