use crate::antenna::GainMode;
use crate::coverage::ViewMode;
use crate::prelude::{Area, EngineError, EngineResult, Point};
use crate::raster::color::Palette;
use serde::{Deserialize, Serialize};

/// Fewest columns a raster may have.
pub const MIN_COLS: usize = 20;
/// Fewest rows a raster may have.
pub const MIN_ROWS: usize = 14;
/// Most cells a single pass may render.
pub const MAX_CELLS: usize = 16_000_000;

/// Refinement stage a raster was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterPass {
    /// Coarse grid with static AP gain.
    Fast,
    /// Refined grid with full pattern lookup.
    Accurate,
}

impl RasterPass {
    pub fn gain_mode(self) -> GainMode {
        match self {
            RasterPass::Fast => GainMode::Static,
            RasterPass::Accurate => GainMode::Directional,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RasterPass::Fast => "fast",
            RasterPass::Accurate => "accurate",
        }
    }
}

/// What the caller wants drawn and at which resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewRequest {
    pub mode: ViewMode,
    /// Legend bounds; `None` uses the mode's default.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Base cell edge length, meters.
    pub cell_size: f64,
    pub fast_multiplier: f64,
    pub accurate_multiplier: f64,
    pub contours: bool,
    /// Evaluate every cell against this AP instead of the best server.
    pub focus_ap: Option<String>,
    pub palette: Palette,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self {
            mode: ViewMode::Rssi,
            min: None,
            max: None,
            cell_size: 0.2,
            fast_multiplier: 1.0,
            accurate_multiplier: 1.5,
            contours: false,
            focus_ap: None,
            palette: Palette::default(),
        }
    }
}

impl ViewRequest {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_legend(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_focus(mut self, ap_id: impl Into<String>) -> Self {
        self.focus_ap = Some(ap_id.into());
        self
    }

    /// Legend range actually used, explicit bounds overriding the mode defaults.
    pub fn legend(&self) -> (f64, f64) {
        let (default_min, default_max) = self.mode.default_legend();
        (
            self.min.unwrap_or(default_min),
            self.max.unwrap_or(default_max),
        )
    }

    pub fn multiplier(&self, pass: RasterPass) -> f64 {
        match pass {
            RasterPass::Fast => self.fast_multiplier,
            RasterPass::Accurate => self.accurate_multiplier,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        for (name, value) in [
            ("fast", self.fast_multiplier),
            ("accurate", self.accurate_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} quality multiplier must be positive, got {}",
                    name, value
                )));
            }
        }
        let (min, max) = self.legend();
        if !(min < max) {
            return Err(EngineError::InvalidConfig(format!(
                "legend minimum {} must be below maximum {}",
                min, max
            )));
        }
        Ok(())
    }

    /// Checks the request and that both passes fit within [`MAX_CELLS`] over `area`.
    pub fn validate_for(&self, area: &Area) -> EngineResult<()> {
        self.validate()?;
        for pass in [RasterPass::Fast, RasterPass::Accurate] {
            GridSpec::for_pass(area, self, pass)?;
        }
        Ok(())
    }
}

fn axis_cells(extent: f64, cell_size: f64, multiplier: f64, min: usize) -> f64 {
    let min = min as f64;
    ((extent / cell_size).floor().max(min) * multiplier)
        .floor()
        .max(min)
}

/// Raster dimensions over an area; cells are sampled at their centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: usize,
    pub rows: usize,
    pub width: f64,
    pub height: f64,
}

impl GridSpec {
    /// Unbounded grid; counts past `usize::MAX` saturate. Use
    /// [`GridSpec::for_pass`] for anything that gets rendered.
    pub fn new(area: &Area, cell_size: f64, multiplier: f64) -> Self {
        Self {
            cols: axis_cells(area.width, cell_size, multiplier, MIN_COLS) as usize,
            rows: axis_cells(area.height, cell_size, multiplier, MIN_ROWS) as usize,
            width: area.width,
            height: area.height,
        }
    }

    /// Grid for one pass of `request`, rejected when it exceeds [`MAX_CELLS`].
    pub fn for_pass(area: &Area, request: &ViewRequest, pass: RasterPass) -> EngineResult<Self> {
        let multiplier = request.multiplier(pass);
        let cols = axis_cells(area.width, request.cell_size, multiplier, MIN_COLS);
        let rows = axis_cells(area.height, request.cell_size, multiplier, MIN_ROWS);
        if !(cols * rows <= MAX_CELLS as f64) {
            return Err(EngineError::InvalidConfig(format!(
                "{} pass would need {}x{} cells, more than {}; raise the cell size",
                pass.name(),
                cols,
                rows,
                MAX_CELLS
            )));
        }
        Ok(Self::new(area, request.cell_size, multiplier))
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn dx(&self) -> f64 {
        self.width / self.cols as f64
    }

    pub fn dy(&self) -> f64 {
        self.height / self.rows as f64
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        Point::new((col as f64 + 0.5) * self.dx(), (row as f64 + 0.5) * self.dy())
    }
}
