use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters collected across raster passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RasterMetrics {
    pub published: usize,
    pub discarded: usize,
    pub errors: usize,
    pub cells: usize,
    /// Refreshes answered from a finished raster without rendering.
    #[serde(default)]
    pub cache_hits: usize,
}

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    inner: Mutex<RasterMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&self, cells: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.published += 1;
            metrics.cells += cells;
        }
    }

    pub fn record_discarded(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.discarded += 1;
        }
    }

    pub fn record_cache_hit(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.cache_hits += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> RasterMetrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}
