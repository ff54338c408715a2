use crate::math::units::wrap_degrees;
use serde::{Deserialize, Serialize};

/// One row of a directional gain table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternSample {
    pub angle_deg: f64,
    /// Offset from the pattern's peak gain, normally zero or negative.
    pub gain_db: f64,
}

impl PatternSample {
    pub const fn new(angle_deg: f64, gain_db: f64) -> Self {
        Self { angle_deg, gain_db }
    }
}

/// Named horizontal/vertical gain tables for one antenna model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaPattern {
    pub name: String,
    pub frequency_mhz: f64,
    pub peak_gain_dbi: f64,
    pub horizontal: Vec<PatternSample>,
    pub vertical: Vec<PatternSample>,
}

impl AntennaPattern {
    /// Builds a pattern from offset tables, wrapping angles into `[0, 360)` and sorting them.
    pub fn new(
        name: impl Into<String>,
        frequency_mhz: f64,
        peak_gain_dbi: f64,
        horizontal: Vec<PatternSample>,
        vertical: Vec<PatternSample>,
    ) -> Self {
        Self {
            name: name.into(),
            frequency_mhz,
            peak_gain_dbi,
            horizontal: normalize_table(horizontal),
            vertical: normalize_table(vertical),
        }
    }

    /// Builds a pattern from absolute gain tables (dBi), re-expressing them as offsets from peak.
    pub fn from_absolute(
        name: impl Into<String>,
        frequency_mhz: f64,
        horizontal: Vec<PatternSample>,
        vertical: Vec<PatternSample>,
    ) -> Self {
        let peak = horizontal
            .iter()
            .chain(vertical.iter())
            .map(|s| s.gain_db)
            .fold(f64::NEG_INFINITY, f64::max);
        let peak = if peak.is_finite() { peak } else { 0.0 };
        let relative = |table: Vec<PatternSample>| {
            table
                .into_iter()
                .map(|s| PatternSample::new(s.angle_deg, s.gain_db - peak))
                .collect()
        };
        Self::new(
            name,
            frequency_mhz,
            peak,
            relative(horizontal),
            relative(vertical),
        )
    }

    pub fn is_directional(&self) -> bool {
        !self.horizontal.is_empty() || !self.vertical.is_empty()
    }
}

fn normalize_table(mut table: Vec<PatternSample>) -> Vec<PatternSample> {
    for sample in &mut table {
        sample.angle_deg = wrap_degrees(sample.angle_deg);
    }
    table.sort_by(|a, b| a.angle_deg.total_cmp(&b.angle_deg));
    table.dedup_by(|a, b| a.angle_deg == b.angle_deg);
    table
}

/// Linearly interpolates a table sorted by ascending angle.
///
/// Angles outside the table's span wrap across the 0°/360° seam between the
/// last and first entries. An empty table yields 0 dB.
pub fn interpolate_gain(table: &[PatternSample], angle_deg: f64) -> f64 {
    let (first, last) = match (table.first(), table.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 0.0,
    };
    if table.len() == 1 {
        return first.gain_db;
    }

    let angle = wrap_degrees(angle_deg);
    let upper = table.iter().position(|s| s.angle_deg > angle);

    let (lo, hi) = match upper {
        Some(0) => (
            PatternSample::new(last.angle_deg - 360.0, last.gain_db),
            *first,
        ),
        Some(idx) => (table[idx - 1], table[idx]),
        None => (
            *last,
            PatternSample::new(first.angle_deg + 360.0, first.gain_db),
        ),
    };

    let span = hi.angle_deg - lo.angle_deg;
    if span.abs() < 1e-9 {
        return lo.gain_db;
    }
    let t = (angle - lo.angle_deg) / span;
    lo.gain_db + t * (hi.gain_db - lo.gain_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<PatternSample> {
        vec![
            PatternSample::new(0.0, 0.0),
            PatternSample::new(90.0, -10.0),
            PatternSample::new(180.0, -20.0),
            PatternSample::new(270.0, -10.0),
        ]
    }

    #[test]
    fn empty_table_has_no_adjustment() {
        assert_eq!(interpolate_gain(&[], 45.0), 0.0);
    }

    #[test]
    fn interpolates_between_entries() {
        assert!((interpolate_gain(&table(), 45.0) + 5.0).abs() < 1e-9);
        assert!((interpolate_gain(&table(), 180.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn wraps_across_seam() {
        assert!((interpolate_gain(&table(), 315.0) + 5.0).abs() < 1e-9);
        assert!((interpolate_gain(&table(), -45.0) + 5.0).abs() < 1e-9);
        let near_seam = interpolate_gain(&table(), 359.999);
        assert!((near_seam - interpolate_gain(&table(), 0.0)).abs() < 1e-3);
    }

    #[test]
    fn wraps_below_first_entry() {
        let partial = vec![PatternSample::new(10.0, -2.0), PatternSample::new(350.0, -4.0)];
        assert!((interpolate_gain(&partial, 0.0) + 3.0).abs() < 1e-9);
    }

    #[test]
    fn absolute_tables_become_offsets() {
        let pattern = AntennaPattern::from_absolute(
            "sector",
            2400.0,
            vec![PatternSample::new(0.0, 8.0), PatternSample::new(180.0, -12.0)],
            vec![],
        );
        assert_eq!(pattern.peak_gain_dbi, 8.0);
        assert_eq!(pattern.horizontal[0].gain_db, 0.0);
        assert_eq!(pattern.horizontal[1].gain_db, -20.0);
    }

    #[test]
    fn construction_sorts_and_wraps_angles() {
        let pattern = AntennaPattern::new(
            "p",
            2400.0,
            5.0,
            vec![PatternSample::new(370.0, -1.0), PatternSample::new(-90.0, -3.0)],
            vec![],
        );
        assert_eq!(pattern.horizontal[0].angle_deg, 10.0);
        assert_eq!(pattern.horizontal[1].angle_deg, 270.0);
    }
}
