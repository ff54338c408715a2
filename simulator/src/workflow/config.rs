use crate::generator::profile::{build_scene, GeneratorConfig};
use anyhow::Context;
use covcore::antenna::{AntennaPattern, PatternStore};
use covcore::coverage::{AggregatorConfig, ComplianceConfig};
use covcore::model::{AccessPoint, GroundPlane, Obstruction, Scene};
use covcore::propagation::PropagationConfig;
use covcore::raster::{RefreshMode, ViewRequest};
use covcore::{Area, Point};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A floor plan spelled out in the workflow file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub access_points: Vec<AccessPoint>,
    #[serde(default)]
    pub obstructions: Vec<Obstruction>,
    #[serde(default)]
    pub patterns: Vec<AntennaPattern>,
    /// Pattern applied to APs that do not name one.
    #[serde(default)]
    pub default_pattern: Option<String>,
}

impl SceneConfig {
    fn build(&self) -> anyhow::Result<Scene> {
        let area = Area::new(self.width, self.height).context("scene area")?;
        let mut patterns = PatternStore::new();
        for pattern in &self.patterns {
            // Re-normalise tables written by hand in any order.
            patterns.insert(AntennaPattern::new(
                pattern.name.clone(),
                pattern.frequency_mhz,
                pattern.peak_gain_dbi,
                pattern.horizontal.clone(),
                pattern.vertical.clone(),
            ));
        }
        patterns
            .set_default(self.default_pattern.as_deref())
            .context("selecting default antenna pattern")?;
        Ok(Scene {
            area,
            access_points: self.access_points.clone(),
            obstructions: self.obstructions.clone(),
            ..Scene::default()
        }
        .with_patterns(patterns))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON coverage report destination.
    pub report: Option<PathBuf>,
    /// PNG heatmap destination.
    pub heatmap: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Explicit floor plan; takes precedence over `generator`.
    pub scene: Option<SceneConfig>,
    pub generator: Option<GeneratorConfig>,
    pub propagation: PropagationConfig,
    pub ground: GroundPlane,
    pub view: ViewRequest,
    pub refresh: RefreshMode,
    pub aggregator: AggregatorConfig,
    pub compliance: ComplianceConfig,
    /// Points reported with full metrics.
    pub probes: Vec<Point>,
    pub output: OutputConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Workflow over a generated scenario, as driven from the command line.
    pub fn from_args(width: f64, height: f64, ap_count: usize, seed: u64, view: ViewRequest) -> Self {
        Self {
            generator: Some(GeneratorConfig {
                width,
                height,
                ap_count,
                seed,
                ..Default::default()
            }),
            view,
            ..Default::default()
        }
    }

    /// Builds the scene snapshot with this workflow's propagation and ground settings.
    pub fn build_scene(&self) -> anyhow::Result<Scene> {
        let scene = match (&self.scene, &self.generator) {
            (Some(scene), _) => scene.build()?,
            (None, Some(generator)) => build_scene(generator)?,
            (None, None) => build_scene(&GeneratorConfig::default())?,
        };
        let scene = Scene {
            ground: self.ground,
            ..scene
        }
        .with_propagation(self.propagation.clone());
        scene.validate().context("validating workflow scene")?;
        Ok(scene)
    }
}
