//! Tolerances shared by every component that compares geometry.
//!
//! Hull construction, chain linking, section termination and lift-point
//! clearance all judge equality through [`approx_eq`] and
//! [`points_approx_eq`], so two components never disagree on whether two
//! coordinates coincide.

use super::Point;
use crate::CoordF;

/// Number of decimal places considered significant.
pub const PRECISION: i32 = 5;

/// Equality epsilon, `10^-PRECISION`.
pub const EPSILON: CoordF = 1e-5;

/// Angular tolerance under which two hull candidates are considered tied.
pub const HULL_ANGLE_EPSILON: CoordF = 1e-10;

/// Adjacent segments whose normals have a dot product above this are merged.
pub const JOIN_MIN_COS_ANGLE: CoordF = 0.995;

/// Margin added around a segment's bounding box in the spatial index.
pub const SEGMENT_BOX_MARGIN: CoordF = 1.0;

/// Squared distance under which a dangling endpoint is linked to a neighbour.
pub const LINK_MAX_DISTANCE_SQUARED: CoordF = 0.01;

/// Distance used to probe which side of a segment is filled.
pub const INNER_PROBE_DISTANCE: CoordF = 0.1;

/// Check if two scalars are as good as equal.
#[inline]
pub fn approx_eq(a: CoordF, b: CoordF) -> bool {
    (a - b).abs() < EPSILON
}

/// Check if two points are as good as equal (Manhattan distance under [`EPSILON`]).
#[inline]
pub fn points_approx_eq(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() + (a.y - b.y).abs() < EPSILON
}

/// Check if `point` is as good as equal to any point of `points`.
#[inline]
pub fn contains_approx(points: &[Point], point: &Point) -> bool {
    points.iter().any(|p| points_approx_eq(p, point))
}
