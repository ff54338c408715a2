pub mod aggregator;
pub mod compliance;
pub mod throughput;
pub mod view;

pub use aggregator::{AggregatorConfig, Category, CellSample, Coverage, Probe, ServingSignal};
pub use compliance::{compliance, ComplianceConfig, ComplianceReport, SignalQuality};
pub use throughput::{throughput_from_sinr, MAX_THROUGHPUT_MBPS};
pub use view::ViewMode;
