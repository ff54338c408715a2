use crate::antenna::PatternStore;
use crate::model::{AccessPoint, FloorPlane, GroundPlane, Obstruction, Opening, Wall};
use crate::prelude::{Area, EngineResult};
use crate::propagation::PropagationConfig;
use std::sync::Arc;

/// Immutable snapshot of every input that affects signal values.
///
/// Callers build a new snapshot whenever an AP, obstruction or setting
/// changes; all engine queries read only from the snapshot they are given.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub area: Area,
    pub access_points: Vec<AccessPoint>,
    pub obstructions: Vec<Obstruction>,
    pub ground: GroundPlane,
    pub propagation: PropagationConfig,
    pub patterns: Arc<PatternStore>,
}

impl Scene {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            ..Default::default()
        }
    }

    /// Rejects snapshots that violate the caller contract (non-positive area or frequency).
    pub fn validate(&self) -> EngineResult<()> {
        self.area.validate()?;
        self.propagation.validate()
    }

    pub fn with_access_point(mut self, ap: AccessPoint) -> Self {
        self.access_points.push(ap);
        self
    }

    pub fn with_obstruction(mut self, obstruction: Obstruction) -> Self {
        self.obstructions.push(obstruction);
        self
    }

    pub fn with_propagation(mut self, propagation: PropagationConfig) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_patterns(mut self, patterns: PatternStore) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    pub fn enabled_aps(&self) -> impl Iterator<Item = &AccessPoint> {
        self.access_points.iter().filter(|ap| ap.enabled)
    }

    pub fn enabled_ap_count(&self) -> usize {
        self.enabled_aps().count()
    }

    pub fn access_point(&self, id: &str) -> Option<&AccessPoint> {
        self.access_points.iter().find(|ap| ap.id == id)
    }

    pub fn access_point_mut(&mut self, id: &str) -> Option<&mut AccessPoint> {
        self.access_points.iter_mut().find(|ap| ap.id == id)
    }

    pub fn remove_access_point(&mut self, id: &str) -> Option<AccessPoint> {
        let idx = self.access_points.iter().position(|ap| ap.id == id)?;
        Some(self.access_points.remove(idx))
    }

    pub fn walls(&self) -> impl Iterator<Item = &Wall> {
        self.obstructions.iter().filter_map(Obstruction::as_wall)
    }

    pub fn openings(&self) -> impl Iterator<Item = &Opening> {
        self.obstructions.iter().filter_map(Obstruction::as_opening)
    }

    pub fn floor_planes(&self) -> impl Iterator<Item = &FloorPlane> {
        self.obstructions
            .iter()
            .filter_map(Obstruction::as_floor_plane)
    }
}
