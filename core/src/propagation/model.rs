use crate::math::geometry::{
    overlay_interval, ray_crossing_along, segment_intersects_thick_segment, Segment,
};
use crate::model::{AccessPoint, FloorPlane, GroundPlane, Opening, Scene};
use crate::prelude::Point;
use crate::propagation::config::{ModelVariant, PropagationConfig};
use crate::propagation::loss::{
    floor_plane_loss, free_space_loss, free_space_loss_at_1m, ground_loss,
};
use serde::{Deserialize, Serialize};

/// Received power from transmit power, antenna gain and path loss, dBm.
pub fn rssi(tx_power_dbm: f64, gain_dbi: f64, loss_db: f64) -> f64 {
    tx_power_dbm + gain_dbi - loss_db
}

/// Individual terms of one path's loss, dB.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub distance: f64,
    pub base: f64,
    pub walls: f64,
    pub ground: f64,
    pub floors: f64,
    pub vertical: f64,
}

impl LossBreakdown {
    pub fn total(&self) -> f64 {
        self.base + self.walls + self.ground + self.floors + self.vertical
    }
}

/// An opening laid over a wall segment, as an interval along that segment.
#[derive(Debug, Clone, Copy)]
struct Overlay {
    opening: usize,
    from: f64,
    to: f64,
}

/// A wall segment plus the openings laid over it.
#[derive(Debug)]
struct WallSpan {
    segment: Segment,
    overlays: Vec<Overlay>,
}

impl WallSpan {
    /// Opening the sight line passes through, judged by where its direction meets the centerline.
    fn opening_on(&self, line: &Segment) -> Option<usize> {
        let along = ray_crossing_along(line, &self.segment)?;
        self.overlays
            .iter()
            .find(|overlay| (overlay.from..=overlay.to).contains(&along))
            .map(|overlay| overlay.opening)
    }
}

#[derive(Debug)]
struct PreparedWall {
    thickness: f64,
    loss_db: f64,
    spans: Vec<WallSpan>,
}

/// Loss evaluator bound to one scene snapshot.
///
/// Construction resolves which openings overlay which wall segments once, so
/// per-cell evaluation only runs crossing tests.
#[derive(Debug)]
pub struct PropagationModel<'a> {
    config: &'a PropagationConfig,
    variant: ModelVariant,
    ground: GroundPlane,
    walls: Vec<PreparedWall>,
    openings: Vec<&'a Opening>,
    /// Whether each opening overlays some wall span.
    hosted: Vec<bool>,
    floors: Vec<&'a FloorPlane>,
    reference_loss: f64,
}

impl<'a> PropagationModel<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        let openings: Vec<&Opening> = scene.openings().collect();
        let walls: Vec<PreparedWall> = scene
            .walls()
            .map(|wall| PreparedWall {
                thickness: wall.thickness,
                loss_db: wall.loss_db,
                spans: wall
                    .segments()
                    .map(|segment| WallSpan {
                        segment,
                        overlays: openings
                            .iter()
                            .enumerate()
                            .filter_map(|(idx, opening)| {
                                overlay_interval(&opening.segment, &segment).map(|(from, to)| Overlay {
                                    opening: idx,
                                    from,
                                    to,
                                })
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let mut hosted = vec![false; openings.len()];
        for overlay in walls
            .iter()
            .flat_map(|wall| &wall.spans)
            .flat_map(|span| &span.overlays)
        {
            hosted[overlay.opening] = true;
        }

        Self {
            config: &scene.propagation,
            variant: scene.propagation.model,
            ground: scene.ground,
            walls,
            openings,
            hosted,
            floors: scene.floor_planes().collect(),
            reference_loss: free_space_loss_at_1m(scene.propagation.frequency_mhz),
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        self.config
    }

    /// Total loss between `ap` and `point`, dB.
    pub fn path_loss(&self, ap: &AccessPoint, point: &Point) -> f64 {
        self.breakdown(ap, point).total()
    }

    pub fn breakdown(&self, ap: &AccessPoint, point: &Point) -> LossBreakdown {
        let distance = ap.position.distance(point).max(self.config.min_distance);
        let line = Segment::new(ap.position, *point);

        let base = match self.variant {
            ModelVariant::P25d => self.reference_loss + self.config.exponent * distance.log10(),
            ModelVariant::P525 => free_space_loss(self.config.frequency_mhz, distance),
        };
        let walls = if self.variant.includes_walls() {
            self.wall_loss(&line)
        } else {
            0.0
        };
        let floors = self
            .floors
            .iter()
            .map(|plane| {
                floor_plane_loss(
                    &line,
                    plane,
                    ap.mount_height(),
                    self.config.receiver_height,
                    self.config.floor_height_check,
                )
            })
            .sum();
        let vertical = if self.variant.includes_vertical_factor() {
            self.config.vertical_factor_db
        } else {
            0.0
        };

        LossBreakdown {
            distance,
            base,
            walls,
            ground: ground_loss(&self.ground, distance),
            floors,
            vertical,
        }
    }

    /// Loss from walls, doors and windows crossed by `line`.
    ///
    /// A crossed wall span is charged to the opening lying where the line's
    /// direction meets the span, if any, and to the wall otherwise. Each wall
    /// and each opening adds its loss at most once. Openings on no wall add
    /// their loss whenever their own rectangle is crossed.
    pub fn wall_loss(&self, line: &Segment) -> f64 {
        let mut through = vec![false; self.openings.len()];
        let mut loss = 0.0;
        for wall in &self.walls {
            let mut solid = false;
            for span in wall
                .spans
                .iter()
                .filter(|span| segment_intersects_thick_segment(line, &span.segment, wall.thickness))
            {
                match span.opening_on(line) {
                    Some(idx) => through[idx] = true,
                    None => solid = true,
                }
            }
            if solid {
                loss += wall.loss_db;
            }
        }

        let opening_loss: f64 = self
            .openings
            .iter()
            .enumerate()
            .filter(|&(idx, opening)| {
                if self.hosted[idx] {
                    through[idx]
                } else {
                    segment_intersects_thick_segment(line, &opening.segment, opening.thickness)
                }
            })
            .map(|(_, opening)| opening.loss_db)
            .sum();

        loss + opening_loss
    }

    /// Received power at `point` from `ap` for a given antenna gain, dBm.
    pub fn received_power(&self, ap: &AccessPoint, gain_dbi: f64, point: &Point) -> f64 {
        rssi(ap.tx_power_dbm, gain_dbi, self.path_loss(ap, point)) - self.config.reference_offset_db
    }
}
