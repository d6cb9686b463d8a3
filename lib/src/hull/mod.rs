//! Convex hull by gift wrapping.
//!
//! The sweep starts at the leftmost point (lowest y among ties) and keeps
//! pivoting to the point that makes the widest angle with the previous hull
//! edge. Near-ties, which resampled boundary runs produce constantly, go to
//! the candidate furthest from the pivot so collinear runs are skipped in one
//! step instead of terminating the sweep early.

use crate::geometry::tolerance::{EPSILON, HULL_ANGLE_EPSILON};
use crate::geometry::{Point, Segment};
use crate::{CoordF, Error, Result};

/// Convex hull of a point set, as a closed sequence.
///
/// The first hull point is repeated at the end. Every hull point is one of
/// the input points.
///
/// # Errors
/// [`Error::DegenerateInput`] for non-finite coordinates or fewer than three
/// distinct points.
///
/// # Example
/// ```
/// use bitpaver::convex_hull;
/// use bitpaver::geometry::Point;
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(2.0, 1.0),
///     Point::new(2.0, 4.0),
/// ];
/// let hull = convex_hull(&points).unwrap();
/// assert_eq!(hull.len(), 4);
/// assert_eq!(hull.first(), hull.last());
/// ```
pub fn convex_hull(points: &[Point]) -> Result<Vec<Point>> {
    if let Some(p) = points.iter().find(|p| !p.is_finite()) {
        return Err(Error::degenerate(format!("hull input has non-finite point {p:?}")));
    }
    let distinct = count_distinct(points);
    if distinct < 3 {
        return Err(Error::degenerate(format!(
            "hull needs at least 3 distinct points, got {distinct}"
        )));
    }

    let start = leftmost_point(points);
    let mut hull = vec![start];
    let mut pivot = start;
    // Pointing back from the pivot towards where the sweep came from.
    let mut back = Point::new(1.0, 0.0);

    for _ in 0..=points.len() {
        let angle_of = |c: &Point| back.angle_to(&(*c - pivot));
        let candidates = || points.iter().filter(|c| !c.approx_eq(&pivot));

        let max_angle = candidates().map(angle_of).fold(CoordF::MIN, CoordF::max);
        let tied: Vec<Point> = candidates()
            .filter(|c| angle_of(*c) >= max_angle - HULL_ANGLE_EPSILON)
            .copied()
            .collect();

        if hull.len() > 1 && tied.iter().any(|c| c.approx_eq(&start)) {
            hull.push(start);
            return Ok(hull);
        }

        let next = tied
            .iter()
            .copied()
            .max_by(|a, b| pivot.distance_squared(a).total_cmp(&pivot.distance_squared(b)))
            .ok_or_else(|| Error::degenerate("hull sweep found no candidate"))?;
        hull.push(next);
        back = pivot - next;
        pivot = next;
    }

    Err(Error::degenerate(format!(
        "hull sweep over {} points did not close",
        points.len()
    )))
}

/// Edges of a closed hull, including the closing edge.
pub fn hull_edges(hull: &[Point]) -> Vec<Segment> {
    hull.windows(2)
        .filter(|w| !w[0].approx_eq(&w[1]))
        .map(|w| Segment::new(w[0], w[1]))
        .collect()
}

/// Number of points that are pairwise not as good as equal.
pub fn count_distinct(points: &[Point]) -> usize {
    let mut distinct: Vec<Point> = Vec::new();
    for p in points {
        if !distinct.iter().any(|d| d.approx_eq(p)) {
            distinct.push(*p);
        }
    }
    distinct.len()
}

/// Leftmost point; ties (within tolerance) go to the lowest y.
fn leftmost_point(points: &[Point]) -> Point {
    let min_x = points.iter().map(|p| p.x).fold(CoordF::INFINITY, CoordF::min);
    points
        .iter()
        .filter(|p| p.x - min_x < EPSILON)
        .copied()
        .min_by(|a, b| a.y.total_cmp(&b.y))
        .unwrap_or_default()
}
