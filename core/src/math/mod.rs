pub mod geometry;
pub mod stats;
pub mod units;

pub use geometry::{
    collinear_overlap, overlay_interval, point_to_segment_distance, ray_crossing_along,
    segment_intersection, segment_intersects_thick_segment, segments_intersect, Segment,
};
pub use stats::StatsHelper;
pub use units::{dbm_to_mw, mw_to_dbm, wrap_degrees};
