pub mod access_point;
pub mod obstruction;
pub mod scene;

pub use access_point::{AccessPoint, DEFAULT_AP_HEIGHT};
pub use obstruction::{FloorPlane, GroundPlane, Obstruction, Opening, Wall, WallMaterial};
pub use scene::Scene;
