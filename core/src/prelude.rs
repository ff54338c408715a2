use serde::{Deserialize, Serialize};

/// A position on the floor plan, in meters.
///
/// `x` grows to the east and `y` grows to the south (screen-down), so north is `-y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Rectangular planning area anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub fn new(width: f64, height: f64) -> EngineResult<Self> {
        let area = Self { width, height };
        area.validate()?;
        Ok(area)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "area width must be positive, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "area height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

impl Default for Area {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 20.0,
        }
    }
}

/// Common error type for engine operations.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("raster pass superseded by generation {generation}")]
    Superseded { generation: u64 },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_rejects_non_positive_dimensions() {
        assert!(Area::new(0.0, 10.0).is_err());
        assert!(Area::new(10.0, -1.0).is_err());
        assert!(Area::new(f64::NAN, 10.0).is_err());
        assert!(Area::new(30.0, 20.0).is_ok());
    }

    #[test]
    fn midpoint_is_halfway() {
        let mid = Point::new(0.0, 0.0).midpoint(&Point::new(4.0, 2.0));
        assert_eq!(mid, Point::new(2.0, 1.0));
    }
}
