use covcore::antenna::{AntennaPattern, PatternSample};

/// Name under which generated scenarios register the sector pattern.
pub const SECTOR_PATTERN: &str = "synthetic-sector";

/// Sector antenna with a parabolic roll-off: `beamwidth_deg` wide at -3 dB, floored at `-front_to_back_db`.
pub fn sector_pattern(peak_gain_dbi: f64, beamwidth_deg: f64, front_to_back_db: f64) -> AntennaPattern {
    let half_power = (beamwidth_deg / 2.0).max(1.0);
    let horizontal = (0..360)
        .step_by(5)
        .map(|angle| {
            let off_axis = f64::from(if angle > 180 { 360 - angle } else { angle });
            let rolloff = -3.0 * (off_axis / half_power).powi(2);
            PatternSample::new(angle as f64, rolloff.max(-front_to_back_db))
        })
        .collect();
    let vertical = (0..360)
        .step_by(10)
        .map(|angle| {
            let off_axis = f64::from(if angle > 180 { 360 - angle } else { angle });
            PatternSample::new(angle as f64, (-12.0 * (off_axis / 90.0).powi(2)).max(-20.0))
        })
        .collect();
    AntennaPattern::new(SECTOR_PATTERN, 2400.0, peak_gain_dbi, horizontal, vertical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covcore::antenna::interpolate_gain;

    #[test]
    fn sector_peaks_on_boresight_and_rolls_off() {
        let pattern = sector_pattern(8.0, 90.0, 25.0);
        assert_eq!(interpolate_gain(&pattern.horizontal, 0.0), 0.0);
        assert!((interpolate_gain(&pattern.horizontal, 45.0) + 3.0).abs() < 1e-9);
        assert_eq!(interpolate_gain(&pattern.horizontal, 180.0), -25.0);
        assert!(
            (interpolate_gain(&pattern.horizontal, 315.0) - interpolate_gain(&pattern.horizontal, 45.0)).abs()
                < 1e-9
        );
    }
}
