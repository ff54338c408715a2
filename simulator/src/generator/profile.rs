use crate::generator::template::{sector_pattern, SECTOR_PATTERN};
use anyhow::Context;
use covcore::antenna::PatternStore;
use covcore::model::{AccessPoint, Obstruction, Opening, Scene, Wall, WallMaterial};
use covcore::placement::propose_positions;
use covcore::{Area, Point};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const WALL_MATERIALS: [WallMaterial; 5] = [
    WallMaterial::Drywall,
    WallMaterial::Brick,
    WallMaterial::Concrete,
    WallMaterial::Glass,
    WallMaterial::Wood,
];

/// Door width used for generated openings, meters.
const DOOR_WIDTH: f64 = 1.2;

/// Configuration for synthesising a floor plan scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: f64,
    pub height: f64,
    pub ap_count: usize,
    pub tx_power_dbm: f64,
    pub gain_dbi: f64,
    /// Channels assigned round-robin in placement order.
    pub channels: Vec<u32>,
    pub walls: usize,
    /// Chance that a generated wall gets a door.
    pub door_probability: f64,
    /// Give every AP the synthetic sector pattern, aimed at the area center.
    pub sector_antennas: bool,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 20.0,
            ap_count: 4,
            tx_power_dbm: 15.0,
            gain_dbi: 5.0,
            channels: vec![1, 6, 11],
            walls: 6,
            door_probability: 0.5,
            sector_antennas: false,
            seed: 0,
            description: None,
        }
    }
}

/// Bearing from `from` to `to`, degrees clockwise from north.
fn bearing(from: &Point, to: &Point) -> f64 {
    (to.x - from.x).atan2(-(to.y - from.y)).to_degrees().rem_euclid(360.0)
}

fn random_wall(rng: &mut StdRng, area: &Area) -> (Wall, Option<Opening>) {
    let material = *WALL_MATERIALS.choose(rng).unwrap_or(&WallMaterial::Drywall);
    let horizontal = rng.gen_bool(0.5);
    let (span, across) = if horizontal {
        (area.width, area.height)
    } else {
        (area.height, area.width)
    };
    let offset = rng.gen_range(0.15..0.85) * across;
    let length = rng.gen_range(0.3..0.8) * span;
    let start = rng.gen_range(0.0..(span - length).max(f64::EPSILON));
    let point = |along: f64| {
        if horizontal {
            Point::new(along, offset)
        } else {
            Point::new(offset, along)
        }
    };
    let wall = Wall::from_material(vec![point(start), point(start + length)], material);
    let door_at = if length > 2.0 * DOOR_WIDTH {
        Some(rng.gen_range(start..start + length - DOOR_WIDTH))
    } else {
        None
    };
    let door = door_at.map(|at| Opening::door(point(at), point(at + DOOR_WIDTH)));
    (wall, door)
}

/// Builds a reproducible scene from `config`.
pub fn build_scene(config: &GeneratorConfig) -> anyhow::Result<Scene> {
    let area = Area::new(config.width, config.height).context("generator area")?;
    let positions = propose_positions(config.ap_count, config.width, config.height)
        .context("placing generated access points")?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut patterns = PatternStore::new();
    if config.sector_antennas {
        patterns.insert(sector_pattern(config.gain_dbi + 3.0, 120.0, 20.0));
    }

    let center = area.center();
    let access_points = positions
        .iter()
        .enumerate()
        .map(|(idx, position)| {
            let channel = if config.channels.is_empty() {
                1
            } else {
                config.channels[idx % config.channels.len()]
            };
            let ap = AccessPoint::new(
                format!("AP-{}", idx + 1),
                *position,
                config.tx_power_dbm,
                config.gain_dbi,
                channel,
            );
            if config.sector_antennas {
                ap.with_pattern(SECTOR_PATTERN)
                    .with_orientation(bearing(position, &center), 0.0)
            } else {
                ap
            }
        })
        .collect();

    let mut obstructions = Vec::new();
    for _ in 0..config.walls {
        let (wall, door) = random_wall(&mut rng, &area);
        obstructions.push(Obstruction::Wall(wall));
        if let Some(door) = door.filter(|_| rng.gen_bool(config.door_probability.clamp(0.0, 1.0))) {
            obstructions.push(Obstruction::Door(door));
        }
    }

    let scene = Scene {
        area,
        access_points,
        obstructions,
        ..Scene::default()
    }
    .with_patterns(patterns);
    scene.validate().context("validating generated scene")?;
    log::info!(
        "generated scene {:.0}x{:.0} m with {} APs and {} obstructions (seed {})",
        config.width,
        config.height,
        scene.access_points.len(),
        scene.obstructions.len(),
        config.seed
    );
    Ok(scene)
}
