//! Planar geometry used by the loss engine.
//!
//! Every routine treats zero-length segments as "no intersection" instead of
//! failing, so malformed obstructions simply stop attenuating.

use crate::prelude::Point;
use serde::{Deserialize, Serialize};

/// Tolerance for orientation tests, in square meters.
const ORIENT_EPSILON: f64 = 1e-12;

/// Segments shorter than this are treated as degenerate.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-3;

/// Perpendicular distance an opening may sit off a wall's centerline and still overlay it.
pub const OVERLAY_DISTANCE_TOLERANCE: f64 = 0.3;

/// Angular tolerance (radians) for treating an opening as parallel to a wall.
pub const OVERLAY_ANGLE_TOLERANCE: f64 = 0.1;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < MIN_SEGMENT_LENGTH
    }

    /// Unit direction, or `None` for degenerate segments.
    pub fn direction(&self) -> Option<(f64, f64)> {
        let len = self.length();
        if len < MIN_SEGMENT_LENGTH {
            return None;
        }
        Some(((self.end.x - self.start.x) / len, (self.end.y - self.start.y) / len))
    }

    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
        )
    }

    /// Copy of this segment shifted sideways by `offset` meters.
    pub fn offset(&self, offset: f64) -> Option<Segment> {
        let (dx, dy) = self.direction()?;
        let (px, py) = (-dy * offset, dx * offset);
        Some(Segment::new(
            Point::new(self.start.x + px, self.start.y + py),
            Point::new(self.end.x + px, self.end.y + py),
        ))
    }
}

/// Signed orientation of the triplet (p, q, r): positive, negative or zero when collinear.
pub fn orientation(p: &Point, q: &Point, r: &Point) -> f64 {
    let value = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if value.abs() < ORIENT_EPSILON {
        0.0
    } else {
        value
    }
}

/// Orientation class of (p, q, r): `1`, `-1`, or `0` when collinear.
fn turn(p: &Point, q: &Point, r: &Point) -> i8 {
    let value = orientation(p, q, r);
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether `q` lies within the bounding box of `p`..`r` (used once collinearity is known).
fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Classic orientation-based crossing test, including touching and collinear overlap.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    if a1.distance(a2) < MIN_SEGMENT_LENGTH || b1.distance(b2) < MIN_SEGMENT_LENGTH {
        return false;
    }

    let o1 = turn(a1, a2, b1);
    let o2 = turn(a1, a2, b2);
    let o3 = turn(b1, b2, a1);
    let o4 = turn(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(a1, b1, a2))
        || (o2 == 0 && on_segment(a1, b2, a2))
        || (o3 == 0 && on_segment(b1, a1, b2))
        || (o4 == 0 && on_segment(b1, a2, b2))
}

/// Parameters `(t, u)` of the proper crossing between `a` and `b`, each within `[0, 1]`.
///
/// Parallel or degenerate pairs return `None`.
pub fn intersection_params(a: &Segment, b: &Segment) -> Option<(f64, f64)> {
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }
    let (x1, y1, x2, y2) = (a.start.x, a.start.y, a.end.x, a.end.y);
    let (x3, y3, x4, y4) = (b.start.x, b.start.y, b.end.x, b.end.y);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-10 {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Crossing point of two segments, if they properly intersect.
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<Point> {
    intersection_params(a, b).map(|(t, _)| a.point_at(t))
}

/// Shortest distance from `p` to the segment `a`..`b`.
pub fn point_to_segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < MIN_SEGMENT_LENGTH * MIN_SEGMENT_LENGTH {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Whether `p` lies inside the rectangle of `thickness` centred on `wall`.
fn point_in_thick_segment(p: &Point, wall: &Segment, thickness: f64) -> bool {
    let Some((dx, dy)) = wall.direction() else {
        return false;
    };
    let rel_x = p.x - wall.start.x;
    let rel_y = p.y - wall.start.y;
    let along = rel_x * dx + rel_y * dy;
    let across = (rel_x * -dy + rel_y * dx).abs();
    along >= 0.0 && along <= wall.length() && across <= thickness / 2.0
}

/// Whether the sight line crosses the rectangle of `thickness` around `wall`'s centerline.
///
/// Both thickness-offset edges and the end caps are tested, so lines that
/// graze a thick wall almost parallel to it still register a crossing.
pub fn segment_intersects_thick_segment(line: &Segment, wall: &Segment, thickness: f64) -> bool {
    if line.is_degenerate() || wall.is_degenerate() {
        return false;
    }
    if segments_intersect(&line.start, &line.end, &wall.start, &wall.end) {
        return true;
    }

    let half = thickness.max(0.0) / 2.0;
    if half <= 0.0 {
        return false;
    }
    let (Some(left), Some(right)) = (wall.offset(half), wall.offset(-half)) else {
        return false;
    };

    let edges = [
        (left.start, left.end),
        (left.end, right.end),
        (right.end, right.start),
        (right.start, left.start),
    ];
    if edges
        .iter()
        .any(|(e1, e2)| segments_intersect(&line.start, &line.end, e1, e2))
    {
        return true;
    }

    point_in_thick_segment(&line.start, wall, thickness)
        || point_in_thick_segment(&line.end, wall, thickness)
}

/// Extent of `overlay` along `base`, in meters from `base.start`, when it lies along `base`.
///
/// The overlay must be near-parallel, close to the centerline and overlap the
/// base in extent; the interval is clipped to the base's length.
pub fn overlay_interval(overlay: &Segment, base: &Segment) -> Option<(f64, f64)> {
    let (Some((bx, by)), Some((ox, oy))) = (base.direction(), overlay.direction()) else {
        return None;
    };

    let dot = (bx * ox + by * oy).clamp(-1.0, 1.0);
    let angle = dot.abs().acos();
    if angle > OVERLAY_ANGLE_TOLERANCE {
        return None;
    }

    let project = |p: &Point| {
        let rel_x = p.x - base.start.x;
        let rel_y = p.y - base.start.y;
        (rel_x * bx + rel_y * by, (rel_x * -by + rel_y * bx).abs())
    };
    let (t1, d1) = project(&overlay.start);
    let (t2, d2) = project(&overlay.end);
    if d1 > OVERLAY_DISTANCE_TOLERANCE || d2 > OVERLAY_DISTANCE_TOLERANCE {
        return None;
    }

    let lo = t1.min(t2);
    let hi = t1.max(t2);
    let length = base.length();
    (lo < length && hi > 0.0).then(|| (lo.max(0.0), hi.min(length)))
}

/// Whether `overlay` lies along `base` (parallel, close to its centerline, and overlapping in extent).
pub fn collinear_overlap(overlay: &Segment, base: &Segment) -> bool {
    overlay_interval(overlay, base).is_some()
}

/// Where the infinite line through `ray` meets `base`'s centerline, in meters from `base.start`.
///
/// The result depends only on the ray's direction, not its length. Parallel
/// or degenerate inputs return `None`.
pub fn ray_crossing_along(ray: &Segment, base: &Segment) -> Option<f64> {
    let (bx, by) = base.direction()?;
    let (rx, ry) = ray.direction()?;
    let denom = bx * ry - by * rx;
    if denom.abs() < 1e-9 {
        return None;
    }
    let (qx, qy) = (ray.start.x - base.start.x, ray.start.y - base.start.y);
    Some((qx * ry - qy * rx) / denom)
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Parameter range `[t_enter, t_exit]` of `line` that overlaps `polygon`, if any.
///
/// The range spans contained endpoints and every edge crossing; for concave
/// polygons it is the hull of those parameters.
pub fn polygon_overlap_range(line: &Segment, polygon: &[Point]) -> Option<(f64, f64)> {
    if line.is_degenerate() || polygon.len() < 3 {
        return None;
    }
    let mut params = Vec::with_capacity(4);
    if point_in_polygon(&line.start, polygon) {
        params.push(0.0);
    }
    if point_in_polygon(&line.end, polygon) {
        params.push(1.0);
    }
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let edge = Segment::new(*a, *b);
        if let Some((t, _)) = intersection_params(line, &edge) {
            params.push(t);
        } else if segments_intersect(&line.start, &line.end, a, b) {
            // Collinear with the edge: the whole shared stretch touches the boundary.
            params.push(project_param(line, a).clamp(0.0, 1.0));
            params.push(project_param(line, b).clamp(0.0, 1.0));
        }
    }

    let lo = params.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = params.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi.is_finite() {
        Some((lo.clamp(0.0, 1.0), hi.clamp(0.0, 1.0)))
    } else {
        None
    }
}

fn project_param(line: &Segment, p: &Point) -> f64 {
    let dx = line.end.x - line.start.x;
    let dy = line.end.y - line.start.y;
    let len_sq = dx * dx + dy * dy;
    ((p.x - line.start.x) * dx + (p.y - line.start.y) * dy) / len_sq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(2.0, 2.0),
            &Point::new(0.0, 2.0),
            &Point::new(2.0, 0.0)
        ));
        assert!(!segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(0.0, 1.0),
            &Point::new(1.0, 1.0)
        ));
    }

    #[test]
    fn touching_endpoint_counts_as_intersection() {
        assert!(segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(1.0, 1.0)
        ));
    }

    #[test]
    fn degenerate_segments_never_intersect() {
        let p = Point::new(1.0, 1.0);
        assert!(!segments_intersect(&p, &p, &Point::new(0.0, 0.0), &Point::new(2.0, 2.0)));
        assert!(!segment_intersects_thick_segment(
            &seg(0.0, 0.0, 5.0, 0.0),
            &seg(2.0, 0.0, 2.0, 0.0),
            0.5
        ));
        assert!(segment_intersection(&seg(0.0, 0.0, 0.0, 0.0), &seg(0.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn intersection_point_is_computed() {
        let hit = segment_intersection(&seg(0.0, 0.0, 2.0, 2.0), &seg(0.0, 2.0, 2.0, 0.0)).unwrap();
        assert!((hit.x - 1.0).abs() < 1e-9 && (hit.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn point_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        assert!((point_to_segment_distance(&Point::new(2.0, 3.0), &a, &b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_distance(&Point::new(7.0, 4.0), &a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn grazing_line_inside_thickness_is_detected() {
        let wall = seg(0.0, 0.0, 10.0, 0.0);
        // Runs parallel 0.1 m off the centerline, entering through the end cap.
        let line = seg(-1.0, 0.1, 5.0, 0.1);
        assert!(!segments_intersect(&line.start, &line.end, &wall.start, &wall.end));
        assert!(segment_intersects_thick_segment(&line, &wall, 0.4));
        assert!(!segment_intersects_thick_segment(&line, &wall, 0.1));
    }

    #[test]
    fn line_stopping_inside_wall_rectangle_is_detected() {
        let wall = seg(0.0, 0.0, 10.0, 0.0);
        let line = seg(5.0, 3.0, 5.0, 0.05);
        assert!(segment_intersects_thick_segment(&line, &wall, 0.2));
        assert!(!segment_intersects_thick_segment(&seg(5.0, 3.0, 5.0, 0.5), &wall, 0.2));
    }

    #[test]
    fn opening_on_wall_is_collinear_overlap() {
        let wall = seg(0.0, 0.0, 10.0, 0.0);
        assert!(collinear_overlap(&seg(4.0, 0.0, 5.2, 0.0), &wall));
        assert!(collinear_overlap(&seg(5.2, 0.05, 4.0, 0.05), &wall));
        assert!(!collinear_overlap(&seg(4.0, 1.0, 5.2, 1.0), &wall));
        assert!(!collinear_overlap(&seg(11.0, 0.0, 12.0, 0.0), &wall));
        assert!(!collinear_overlap(&seg(4.0, 0.0, 4.0, 1.2), &wall));
    }

    #[test]
    fn overlay_interval_is_clipped_to_the_wall() {
        let wall = seg(0.0, 0.0, 10.0, 0.0);
        assert_eq!(overlay_interval(&seg(5.2, 0.0, 4.0, 0.0), &wall), Some((4.0, 5.2)));
        assert_eq!(overlay_interval(&seg(9.0, 0.0, 11.0, 0.0), &wall), Some((9.0, 10.0)));
        assert_eq!(overlay_interval(&seg(4.0, 1.0, 5.2, 1.0), &wall), None);
    }

    #[test]
    fn ray_crossing_ignores_ray_length() {
        let wall = seg(0.0, 5.0, 10.0, 5.0);
        let short = seg(4.6, 2.0, 4.7, 2.5);
        let long = seg(4.6, 2.0, 5.2, 5.0);
        let a = ray_crossing_along(&short, &wall).unwrap();
        let b = ray_crossing_along(&long, &wall).unwrap();
        assert!((a - 5.2).abs() < 1e-9);
        assert!((a - b).abs() < 1e-9);
        assert!(ray_crossing_along(&seg(0.0, 1.0, 5.0, 1.0), &wall).is_none());
    }

    #[test]
    fn polygon_overlap_range_spans_crossing() {
        let square = [
            Point::new(2.0, -1.0),
            Point::new(4.0, -1.0),
            Point::new(4.0, 1.0),
            Point::new(2.0, 1.0),
        ];
        let (lo, hi) = polygon_overlap_range(&seg(0.0, 0.0, 10.0, 0.0), &square).unwrap();
        assert!((lo - 0.2).abs() < 1e-9);
        assert!((hi - 0.4).abs() < 1e-9);
        assert!(polygon_overlap_range(&seg(0.0, 5.0, 10.0, 5.0), &square).is_none());
        assert_eq!(
            polygon_overlap_range(&seg(3.0, 0.0, 10.0, 0.0), &square).map(|r| r.0),
            Some(0.0)
        );
    }
}
