//! Geometric AP layout proposals.
//!
//! Layouts ignore obstructions and signal values: positions sit on an evenly
//! spaced grid whose shape follows the area's aspect ratio, with edge margins
//! equal to the spacing between neighbors.

use crate::prelude::{Area, EngineResult, Point};

/// Grid shape in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    (3..)
        .step_by(2)
        .take_while(|i| i * i <= n)
        .all(|i| n % i != 0)
}

fn perfect_square_root(n: usize) -> Option<usize> {
    let root = (n as f64).sqrt().round() as usize;
    (root * root == n).then_some(root)
}

/// Factor pair of `n` whose column/row ratio is closest, in log space, to the area's aspect ratio.
///
/// Ties keep the pair with fewer rows.
pub fn best_grid_factors(n: usize, area: &Area) -> GridShape {
    let target = area.aspect_ratio().ln();
    let mut best = GridShape { rows: 1, cols: n };
    let mut best_diff = f64::INFINITY;
    let mut small = 1;
    while small * small <= n {
        if n % small == 0 {
            let large = n / small;
            for shape in [
                GridShape { rows: small, cols: large },
                GridShape { rows: large, cols: small },
            ] {
                let diff = ((shape.cols as f64 / shape.rows as f64).ln() - target).abs();
                if diff < best_diff {
                    best_diff = diff;
                    best = shape;
                }
            }
        }
        small += 1;
    }
    best
}

/// Row-major grid positions with spacing `width / (cols + 1)` and `height / (rows + 1)`.
pub fn grid_positions(shape: GridShape, area: &Area) -> Vec<Point> {
    let spacing_x = area.width / (shape.cols + 1) as f64;
    let spacing_y = area.height / (shape.rows + 1) as f64;
    (0..shape.rows)
        .flat_map(|row| {
            (0..shape.cols).map(move |col| {
                Point::new(
                    spacing_x * (col + 1) as f64,
                    spacing_y * (row + 1) as f64,
                )
            })
        })
        .collect()
}

fn square_or_factored(n: usize, area: &Area) -> Vec<Point> {
    let shape = match perfect_square_root(n) {
        Some(side) => GridShape { rows: side, cols: side },
        None => best_grid_factors(n, area),
    };
    grid_positions(shape, area)
}

/// Midpoint of the two points furthest apart; the first such pair wins ties.
fn farthest_pair_midpoint(points: &[Point]) -> Option<Point> {
    let mut best: Option<(f64, Point, Point)> = None;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = a.distance(b);
            if best.map_or(true, |(max, _, _)| d > max) {
                best = Some((d, *a, *b));
            }
        }
    }
    best.map(|(_, a, b)| a.midpoint(&b))
}

/// Proposes `count` AP positions inside a `width × height` area.
///
/// One AP goes to the center, perfect squares form a square grid, other
/// composites use the factor pair matching the area's shape, and primes lay
/// out `count - 1` points before adding one between the farthest pair.
pub fn propose_positions(count: usize, width: f64, height: f64) -> EngineResult<Vec<Point>> {
    let area = Area::new(width, height)?;
    let positions = match count {
        0 => Vec::new(),
        1 => vec![area.center()],
        2 => grid_positions(best_grid_factors(2, &area), &area),
        n if is_prime(n) => {
            let mut positions = square_or_factored(n - 1, &area);
            if let Some(extra) = farthest_pair_midpoint(&positions) {
                positions.push(extra);
            }
            positions
        }
        n => square_or_factored(n, &area),
    };
    log::debug!(
        "proposed {} positions for {:.1}x{:.1} m",
        positions.len(),
        width,
        height
    );
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Point, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9
    }

    #[test]
    fn primes_are_detected() {
        let primes: Vec<usize> = (0..20).filter(|n| is_prime(*n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn single_ap_goes_to_center() {
        let positions = propose_positions(1, 30.0, 20.0).unwrap();
        assert_eq!(positions, vec![Point::new(15.0, 10.0)]);
        assert!(propose_positions(0, 30.0, 20.0).unwrap().is_empty());
    }

    #[test]
    fn two_aps_follow_the_long_axis() {
        let positions = propose_positions(2, 30.0, 20.0).unwrap();
        assert!(close(&positions[0], 10.0, 10.0));
        assert!(close(&positions[1], 20.0, 10.0));
        let tall = propose_positions(2, 10.0, 30.0).unwrap();
        assert!(close(&tall[0], 5.0, 10.0));
        assert!(close(&tall[1], 5.0, 20.0));
    }

    #[test]
    fn four_aps_form_square_grid() {
        let positions = propose_positions(4, 30.0, 20.0).unwrap();
        let expected = [(10.0, 20.0 / 3.0), (20.0, 20.0 / 3.0), (10.0, 40.0 / 3.0), (20.0, 40.0 / 3.0)];
        assert_eq!(positions.len(), 4);
        for (p, (x, y)) in positions.iter().zip(expected) {
            assert!(close(p, x, y), "{:?} != ({}, {})", p, x, y);
        }
    }

    #[test]
    fn six_aps_match_aspect_ratio() {
        assert_eq!(
            best_grid_factors(6, &Area { width: 30.0, height: 20.0 }),
            GridShape { rows: 2, cols: 3 }
        );
        assert_eq!(propose_positions(6, 30.0, 20.0).unwrap().len(), 6);
    }

    #[test]
    fn seven_aps_add_midpoint_of_farthest_pair() {
        let positions = propose_positions(7, 30.0, 20.0).unwrap();
        assert_eq!(positions.len(), 7);
        let grid = grid_positions(GridShape { rows: 2, cols: 3 }, &Area { width: 30.0, height: 20.0 });
        assert_eq!(&positions[..6], grid.as_slice());
        // Opposite corners of the 3×2 grid: (7.5, 6.67) and (22.5, 13.33).
        assert!(close(&positions[6], 15.0, 10.0));
    }

    #[test]
    fn non_positive_area_is_rejected() {
        assert!(propose_positions(3, 0.0, 20.0).is_err());
    }
}
