//! Coverage rasters: grid sampling, coloring, caching and background refinement.

pub mod cache;
pub mod color;
pub mod generator;
pub mod scheduler;
pub mod view;

pub use crate::coverage::ViewMode;
pub use cache::{Fingerprint, HeatmapRaster, RasterCache, RasterState, RasterStatus};
pub use color::{Palette, Rgba};
pub use generator::{render_once, RasterGenerator};
pub use scheduler::{RasterScheduler, RefreshMode};
pub use view::{GridSpec, RasterPass, ViewRequest};
