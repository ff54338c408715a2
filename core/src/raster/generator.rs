use crate::coverage::{Coverage, ViewMode};
use crate::model::Scene;
use crate::prelude::{EngineError, EngineResult};
use crate::raster::cache::{Fingerprint, HeatmapRaster};
use crate::raster::color::Palette;
use crate::raster::view::{GridSpec, RasterPass, ViewRequest};
use crate::telemetry::LogManager;
use ndarray::Array2;
use rayon::prelude::*;
use std::time::Instant;

/// Samples one view mode over the scene's area.
///
/// Rows are evaluated in parallel. `should_abort` is polled before every
/// row; once it returns `true` the pass stops and reports
/// [`EngineError::Superseded`] for `fingerprint.generation`.
pub struct RasterGenerator<'s> {
    coverage: Coverage<'s>,
    mode: ViewMode,
    pass: RasterPass,
    grid: GridSpec,
    legend: (f64, f64),
    contours: bool,
    palette: Palette,
    logger: LogManager,
}

impl<'s> RasterGenerator<'s> {
    pub fn new(scene: &'s Scene, request: &ViewRequest, pass: RasterPass) -> EngineResult<Self> {
        scene.validate()?;
        request.validate()?;
        let coverage = Coverage::new(scene)
            .with_gain_mode(pass.gain_mode())
            .with_focus(request.focus_ap.as_deref());
        Ok(Self {
            coverage,
            mode: request.mode,
            pass,
            grid: GridSpec::for_pass(&scene.area, request, pass)?,
            legend: request.legend(),
            contours: request.contours,
            palette: request.palette,
            logger: LogManager::new(),
        })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn render<F>(&self, fingerprint: Fingerprint, should_abort: F) -> EngineResult<HeatmapRaster>
    where
        F: Fn() -> bool + Sync,
    {
        let started = Instant::now();
        let GridSpec { cols, rows, .. } = self.grid;
        let mut values = vec![0.0; cols * rows];
        let mut pixels = vec![0u8; cols * rows * 4];
        let (min, max) = self.legend;

        values
            .par_chunks_mut(cols)
            .zip(pixels.par_chunks_mut(cols * 4))
            .enumerate()
            .try_for_each(|(row, (row_values, row_pixels))| {
                if should_abort() {
                    return Err(());
                }
                for col in 0..cols {
                    let sample = self
                        .coverage
                        .evaluate(self.mode, &self.grid.cell_center(row, col));
                    let color = match &sample.category {
                        Some(category) => self.palette.category(category),
                        None => self.palette.numeric(sample.value, min, max, self.contours),
                    };
                    row_values[col] = sample.value;
                    row_pixels[col * 4..col * 4 + 4].copy_from_slice(&color);
                }
                Ok(())
            })
            .map_err(|()| EngineError::Superseded {
                generation: fingerprint.generation,
            })?;

        let values = Array2::from_shape_vec((rows, cols), values)
            .map_err(|err| EngineError::Internal(format!("raster shape: {}", err)))?;
        self.logger
            .record_pass(self.mode, self.pass, &self.grid, started.elapsed());

        Ok(HeatmapRaster {
            fingerprint,
            mode: self.mode,
            pass: self.pass,
            grid: self.grid,
            legend: self.legend,
            values,
            pixels,
        })
    }
}

/// Renders one pass to completion without cancellation.
pub fn render_once(
    scene: &Scene,
    request: &ViewRequest,
    pass: RasterPass,
    fingerprint: Fingerprint,
) -> EngineResult<HeatmapRaster> {
    RasterGenerator::new(scene, request, pass)?.render(fingerprint, || false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessPoint;
    use crate::prelude::{Area, Point};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scene() -> Scene {
        Scene::new(Area::new(20.0, 14.0).unwrap())
            .with_access_point(AccessPoint::new("a", Point::new(5.0, 7.0), 15.0, 5.0, 1))
            .with_access_point(AccessPoint::new("b", Point::new(15.0, 7.0), 15.0, 5.0, 6))
    }

    fn request(mode: ViewMode) -> ViewRequest {
        ViewRequest {
            mode,
            cell_size: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn fast_pass_fills_every_cell() {
        let scene = scene();
        let raster = render_once(&scene, &request(ViewMode::Rssi), RasterPass::Fast, Fingerprint::default())
            .unwrap();
        assert_eq!((raster.width(), raster.height()), (20, 14));
        assert_eq!(raster.pixels.len(), 20 * 14 * 4);
        assert!(raster.values.iter().all(|v| v.is_finite() && *v > -100.0));
        assert_eq!(raster.pixel(7, 5).map(|px| px[3]), Some(220));
    }

    #[test]
    fn accurate_pass_uses_finer_grid() {
        let scene = scene();
        let raster =
            render_once(&scene, &request(ViewMode::Snr), RasterPass::Accurate, Fingerprint::default())
                .unwrap();
        assert_eq!((raster.width(), raster.height()), (30, 21));
        assert_eq!(raster.pass, RasterPass::Accurate);
    }

    #[test]
    fn best_server_cells_split_between_aps() {
        let scene = scene();
        let raster = render_once(
            &scene,
            &request(ViewMode::BestServer),
            RasterPass::Fast,
            Fingerprint::default(),
        )
        .unwrap();
        let palette = Palette::default();
        assert_eq!(raster.pixel(7, 2), Some(palette.server("a")));
        assert_eq!(raster.pixel(7, 17), Some(palette.server("b")));
    }

    #[test]
    fn abort_between_rows_reports_superseded() {
        let scene = scene();
        let generator = RasterGenerator::new(&scene, &request(ViewMode::Rssi), RasterPass::Fast).unwrap();
        let polled = AtomicUsize::new(0);
        let fingerprint = Fingerprint {
            enabled_aps: 2,
            generation: 7,
        };
        let result = generator.render(fingerprint, || polled.fetch_add(1, Ordering::SeqCst) >= 3);
        assert!(matches!(result, Err(EngineError::Superseded { generation: 7 })));
    }

    #[test]
    fn invalid_request_fails_fast() {
        let scene = scene();
        let bad = ViewRequest {
            cell_size: -1.0,
            ..Default::default()
        };
        assert!(RasterGenerator::new(&scene, &bad, RasterPass::Fast).is_err());
    }
}
