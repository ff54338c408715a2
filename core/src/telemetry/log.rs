use crate::coverage::ViewMode;
use crate::raster::view::{GridSpec, RasterPass};
use log::info;
use std::time::Duration;

/// Thin wrapper around the `log` facade for pass summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record_pass(&self, mode: ViewMode, pass: RasterPass, grid: &GridSpec, elapsed: Duration) {
        info!(
            "{} {} pass {}x{} in {:.1} ms",
            mode.name(),
            pass.name(),
            grid.cols,
            grid.rows,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}
