/// Smallest linear power accepted when converting back to dBm.
pub const MIN_LINEAR_MW: f64 = 1e-12;

/// Converts a power level in dBm to milliwatts.
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Converts milliwatts to dBm, clamping non-positive input to [`MIN_LINEAR_MW`].
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.max(MIN_LINEAR_MW).log10()
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbm_round_trips_through_linear() {
        assert!((dbm_to_mw(0.0) - 1.0).abs() < 1e-12);
        assert!((dbm_to_mw(20.0) - 100.0).abs() < 1e-9);
        assert!((mw_to_dbm(dbm_to_mw(-67.5)) + 67.5).abs() < 1e-9);
    }

    #[test]
    fn non_positive_power_clamps() {
        assert!((mw_to_dbm(0.0) + 120.0).abs() < 1e-9);
        assert!((mw_to_dbm(-5.0) + 120.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_degrees_handles_negatives() {
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert!((wrap_degrees(359.5) - 359.5).abs() < 1e-12);
    }
}
