use crate::math::geometry::Segment;
use crate::prelude::Point;
use serde::{Deserialize, Serialize};

/// Thickness used for doors and windows, in meters.
pub const OPENING_THICKNESS: f64 = 0.05;

/// Wall construction presets with their attenuation and thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallMaterial {
    Drywall,
    Brick,
    Concrete,
    Metal,
    Glass,
    Wood,
    Custom,
}

impl WallMaterial {
    pub fn loss_db(self) -> f64 {
        match self {
            WallMaterial::Drywall => 3.0,
            WallMaterial::Brick => 8.0,
            WallMaterial::Concrete => 14.22,
            WallMaterial::Metal => 20.0,
            WallMaterial::Glass => 4.44,
            WallMaterial::Wood => 10.3,
            WallMaterial::Custom => 15.0,
        }
    }

    pub fn thickness(self) -> f64 {
        match self {
            WallMaterial::Drywall | WallMaterial::Custom => 0.15,
            WallMaterial::Brick => 0.2,
            WallMaterial::Concrete => 0.25,
            WallMaterial::Metal | WallMaterial::Wood => 0.1,
            WallMaterial::Glass => 0.05,
        }
    }
}

/// A polyline wall with uniform thickness and material loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub points: Vec<Point>,
    pub thickness: f64,
    pub loss_db: f64,
}

impl Wall {
    pub fn new(points: Vec<Point>, thickness: f64, loss_db: f64) -> Self {
        Self {
            points,
            thickness,
            loss_db,
        }
    }

    pub fn from_material(points: Vec<Point>, material: WallMaterial) -> Self {
        Self::new(points, material.thickness(), material.loss_db())
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
    }
}

/// A door or window cut into a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub segment: Segment,
    #[serde(default = "default_opening_thickness")]
    pub thickness: f64,
    pub loss_db: f64,
}

fn default_opening_thickness() -> f64 {
    OPENING_THICKNESS
}

impl Opening {
    pub fn new(start: Point, end: Point, loss_db: f64) -> Self {
        Self {
            segment: Segment::new(start, end),
            thickness: OPENING_THICKNESS,
            loss_db,
        }
    }

    /// Wooden door; single doors are 1.2 m and double doors 2.4 m wide.
    pub fn door(start: Point, end: Point) -> Self {
        Self::new(start, end, 10.3)
    }

    /// Glass window, nominally 1.5 m wide.
    pub fn window(start: Point, end: Point) -> Self {
        Self::new(start, end, 4.44)
    }

    pub fn width(&self) -> f64 {
        self.segment.length()
    }
}

/// A quad that attenuates signals crossing it, optionally inclined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlane {
    pub corners: [Point; 4],
    #[serde(default)]
    pub height: f64,
    pub attenuation_db: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    /// Direction of upward slope, degrees measured from the +x axis.
    #[serde(default)]
    pub inclination_direction_deg: f64,
}

impl FloorPlane {
    pub fn horizontal(corners: [Point; 4], height: f64, attenuation_db: f64) -> Self {
        Self {
            corners,
            height,
            attenuation_db,
            inclination_deg: 0.0,
            inclination_direction_deg: 0.0,
        }
    }

    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Height of the plane's surface above `p`.
    pub fn surface_height_at(&self, p: &Point) -> f64 {
        if self.inclination_deg == 0.0 {
            return self.height;
        }
        let center = self.centroid();
        let direction = self.inclination_direction_deg.to_radians();
        let along = (p.x - center.x) * direction.cos() + (p.y - center.y) * direction.sin();
        self.height + along * self.inclination_deg.to_radians().tan()
    }
}

/// Anything on the floor plan that attenuates a sight line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Obstruction {
    Wall(Wall),
    Door(Opening),
    Window(Opening),
    FloorPlane(FloorPlane),
}

impl Obstruction {
    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            Obstruction::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    pub fn as_opening(&self) -> Option<&Opening> {
        match self {
            Obstruction::Door(opening) | Obstruction::Window(opening) => Some(opening),
            _ => None,
        }
    }

    pub fn as_floor_plane(&self) -> Option<&FloorPlane> {
        match self {
            Obstruction::FloorPlane(plane) => Some(plane),
            _ => None,
        }
    }
}

/// The floor the receiver stands on; its height is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundPlane {
    pub enabled: bool,
    pub attenuation_db: f64,
}

impl GroundPlane {
    pub const HEIGHT: f64 = 0.0;
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            enabled: true,
            attenuation_db: 3.0,
        }
    }
}
