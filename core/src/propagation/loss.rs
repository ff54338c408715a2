//! Individual loss terms that make up a path's total attenuation.

use crate::math::geometry::{polygon_overlap_range, Segment};
use crate::model::{FloorPlane, GroundPlane};

/// Free-space constant for MHz and meters: `20·log10(4π/c)` with unit scaling.
pub const FSPL_CONSTANT_MHZ_M: f64 = -27.55;

/// Free-space path loss at `distance` meters, dB.
pub fn free_space_loss(frequency_mhz: f64, distance: f64) -> f64 {
    20.0 * frequency_mhz.max(1e-10).log10() + 20.0 * distance.max(1e-10).log10()
        + FSPL_CONSTANT_MHZ_M
}

/// Reference loss one meter from the transmitter, dB.
pub fn free_space_loss_at_1m(frequency_mhz: f64) -> f64 {
    free_space_loss(frequency_mhz, 1.0)
}

/// Ground reflection loss, growing from 70 % to 100 % of the attenuation over the first 10 m.
pub fn ground_loss(ground: &GroundPlane, distance: f64) -> f64 {
    if !ground.enabled {
        return 0.0;
    }
    let distance_factor = (distance / 10.0).min(1.0);
    ground.attenuation_db * (0.7 + 0.3 * distance_factor)
}

/// Attenuation of one floor plane on the sight line, dB.
///
/// With `height_check` off any plan-view crossing counts. With it on, the
/// straight line from `tx_height` to `rx_height` must pass through the
/// plane's surface somewhere over the quad.
pub fn floor_plane_loss(
    line: &Segment,
    plane: &FloorPlane,
    tx_height: f64,
    rx_height: f64,
    height_check: bool,
) -> f64 {
    let Some((enter, exit)) = polygon_overlap_range(line, &plane.corners) else {
        return 0.0;
    };
    if !height_check {
        return plane.attenuation_db;
    }

    let clearance = |t: f64| {
        let ray_height = tx_height + t * (rx_height - tx_height);
        ray_height - plane.surface_height_at(&line.point_at(t))
    };
    if clearance(enter) * clearance(exit) <= 0.0 {
        plane.attenuation_db
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Point;

    fn slab(height: f64) -> FloorPlane {
        FloorPlane::horizontal(
            [
                Point::new(4.0, -2.0),
                Point::new(6.0, -2.0),
                Point::new(6.0, 2.0),
                Point::new(4.0, 2.0),
            ],
            height,
            6.0,
        )
    }

    #[test]
    fn free_space_reference_matches_known_value() {
        // 2400 MHz at 1 m is about 40.05 dB.
        assert!((free_space_loss_at_1m(2400.0) - 40.05).abs() < 0.01);
        let ten_m = free_space_loss(2400.0, 10.0);
        assert!((ten_m - free_space_loss_at_1m(2400.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ground_loss_scales_with_distance_and_caps() {
        let ground = GroundPlane::default();
        assert!((ground_loss(&ground, 0.0) - 2.1).abs() < 1e-9);
        assert!((ground_loss(&ground, 10.0) - 3.0).abs() < 1e-9);
        assert!((ground_loss(&ground, 50.0) - 3.0).abs() < 1e-9);
        let off = GroundPlane {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(ground_loss(&off, 5.0), 0.0);
    }

    #[test]
    fn plan_view_crossing_attenuates_without_height_check() {
        let line = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(floor_plane_loss(&line, &slab(0.0), 2.5, 1.5, false), 6.0);
        let miss = Segment::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        assert_eq!(floor_plane_loss(&miss, &slab(0.0), 2.5, 1.5, false), 0.0);
    }

    #[test]
    fn height_check_requires_piercing_the_surface() {
        let line = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        // Ray descends from 2.5 m to 1.5 m; it is at 2.1..1.9 m over the slab.
        assert_eq!(floor_plane_loss(&line, &slab(0.0), 2.5, 1.5, true), 0.0);
        assert_eq!(floor_plane_loss(&line, &slab(2.0), 2.5, 1.5, true), 6.0);
        assert_eq!(floor_plane_loss(&line, &slab(3.0), 2.5, 1.5, true), 0.0);
    }
}
