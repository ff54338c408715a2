use crate::coverage::ViewMode;
use crate::raster::color::Rgba;
use crate::raster::view::{GridSpec, RasterPass};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Validity token of the inputs a raster was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fingerprint {
    pub enabled_aps: usize,
    pub generation: u64,
}

/// A finished, fully colored raster.
#[derive(Debug, Clone)]
pub struct HeatmapRaster {
    pub fingerprint: Fingerprint,
    pub mode: ViewMode,
    pub pass: RasterPass,
    pub grid: GridSpec,
    /// Legend range the colors were mapped against.
    pub legend: (f64, f64),
    /// Scalar value per cell, indexed `[row, col]`.
    pub values: Array2<f64>,
    /// Row-major RGBA bytes, four per cell.
    pub pixels: Vec<u8>,
}

impl HeatmapRaster {
    pub fn width(&self) -> usize {
        self.grid.cols
    }

    pub fn height(&self) -> usize {
        self.grid.rows
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<Rgba> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        let idx = 4 * (row * self.grid.cols + col);
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }
}

/// Refinement state of the cache slot.
#[derive(Debug, Clone, Default)]
pub enum RasterState {
    /// Nothing usable; inputs changed since the last raster.
    #[default]
    Empty,
    /// Fast pass in flight with nothing to show yet.
    FastPass,
    /// Accurate pass in flight; the fast raster, if any, is shown meanwhile.
    AccuratePass { preview: Option<Arc<HeatmapRaster>> },
    Valid(Arc<HeatmapRaster>),
}

/// Payload-free view of [`RasterState`] for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterStatus {
    Empty,
    FastPass,
    AccuratePass,
    Valid,
}

impl RasterState {
    pub fn status(&self) -> RasterStatus {
        match self {
            RasterState::Empty => RasterStatus::Empty,
            RasterState::FastPass => RasterStatus::FastPass,
            RasterState::AccuratePass { .. } => RasterStatus::AccuratePass,
            RasterState::Valid(_) => RasterStatus::Valid,
        }
    }

    /// Raster that may be drawn right now.
    pub fn displayable(&self) -> Option<&Arc<HeatmapRaster>> {
        match self {
            RasterState::AccuratePass { preview } => preview.as_ref(),
            RasterState::Valid(raster) => Some(raster),
            RasterState::Empty | RasterState::FastPass => None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Fingerprint,
    state: RasterState,
}

/// Single raster slot guarded by a fingerprint.
///
/// Generation bumps and raster swaps happen under the same write lock, so a
/// pass that finishes after an invalidation can never be stored.
#[derive(Debug, Default)]
pub struct RasterCache {
    generation: AtomicU64,
    slot: RwLock<Slot>,
}

impl RasterCache {
    pub fn new(enabled_aps: usize) -> Self {
        let cache = Self::default();
        cache.invalidate(enabled_aps);
        cache
    }

    /// Starts a new generation and drops whatever the slot held.
    pub fn invalidate(&self, enabled_aps: usize) -> Fingerprint {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        slot.current = Fingerprint {
            enabled_aps,
            generation,
        };
        slot.state = RasterState::Empty;
        slot.current
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cheap check for in-flight passes, safe to call from every row.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    pub fn status(&self) -> RasterStatus {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .status()
    }

    /// Records that `pass` started for `fingerprint`; `false` if already stale.
    pub fn begin(&self, pass: RasterPass, fingerprint: Fingerprint) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.current != fingerprint {
            return false;
        }
        slot.state = match pass {
            RasterPass::Fast => RasterState::FastPass,
            RasterPass::Accurate => RasterState::AccuratePass {
                preview: slot.state.displayable().cloned(),
            },
        };
        true
    }

    /// Swaps a finished raster in if it still matches the current inputs.
    ///
    /// `refining` keeps the slot in the accurate-pass state with this raster
    /// as preview. A stale raster is dropped and `None` returned.
    pub fn publish(&self, raster: HeatmapRaster, refining: bool) -> Option<Arc<HeatmapRaster>> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if raster.fingerprint != slot.current {
            log::debug!(
                "discarding {} raster for generation {} (current {})",
                raster.pass.name(),
                raster.fingerprint.generation,
                slot.current.generation
            );
            return None;
        }
        let raster = Arc::new(raster);
        slot.state = if refining {
            RasterState::AccuratePass {
                preview: Some(Arc::clone(&raster)),
            }
        } else {
            RasterState::Valid(Arc::clone(&raster))
        };
        Some(raster)
    }

    /// The finished raster for the current inputs, once refinement is complete.
    pub fn valid(&self) -> Option<Arc<HeatmapRaster>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match &slot.state {
            RasterState::Valid(raster) if raster.fingerprint == slot.current => Some(Arc::clone(raster)),
            _ => None,
        }
    }

    /// The raster to display, if one matches the current fingerprint.
    pub fn current(&self) -> Option<Arc<HeatmapRaster>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.state
            .displayable()
            .filter(|raster| raster.fingerprint == slot.current)
            .cloned()
    }
}
