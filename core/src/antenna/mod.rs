pub mod pattern;
pub mod store;

pub use pattern::{interpolate_gain, AntennaPattern, PatternSample};
pub use store::{GainMode, PatternStore};
