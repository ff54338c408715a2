//! Signal propagation and coverage-raster engine for indoor radio planning.
//!
//! The engine takes an immutable [`Scene`](model::Scene) snapshot (access points,
//! obstructions, antenna patterns and propagation settings) and answers point
//! queries or renders colored coverage rasters from it. Nothing in here owns
//! UI state; callers hand in a fresh snapshot whenever their inputs change.

pub mod antenna;
pub mod coverage;
pub mod math;
pub mod model;
pub mod placement;
pub mod prelude;
pub mod propagation;
pub mod raster;
pub mod telemetry;

pub use prelude::{Area, EngineError, EngineResult, Point};
