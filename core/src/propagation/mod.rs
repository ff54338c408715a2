pub mod config;
pub mod loss;
pub mod model;

pub use config::{ModelVariant, PropagationConfig};
pub use loss::{free_space_loss, ground_loss};
pub use model::{rssi, LossBreakdown, PropagationModel};
