/// Minimum SINR, dB, and the PHY rate it unlocks, Mbps.
const RATE_STEPS: [(f64, f64); 7] = [
    (-5.0, 0.0),
    (0.0, 6.5),
    (5.0, 13.0),
    (10.0, 26.0),
    (15.0, 39.0),
    (20.0, 58.5),
    (25.0, 72.2),
];

/// Highest rate the step table can report, Mbps.
pub const MAX_THROUGHPUT_MBPS: f64 = 72.2;

/// Expected throughput at a given SINR.
///
/// Step function over the MCS table: 0 below the lowest threshold and capped
/// at [`MAX_THROUGHPUT_MBPS`]. Non-finite input maps to 0.
pub fn throughput_from_sinr(sinr_db: f64) -> f64 {
    if sinr_db.is_nan() {
        return 0.0;
    }
    RATE_STEPS
        .iter()
        .take_while(|(threshold, _)| sinr_db >= *threshold)
        .last()
        .map_or(0.0, |(_, rate)| *rate)
}
