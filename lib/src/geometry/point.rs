//! Point type for 2D geometry.
//!
//! [`Point`] doubles as a position and as a free vector; the kernel works in
//! floating-point millimetres, so there is no scaled integer variant.

use super::tolerance::{points_approx_eq, EPSILON};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D point (or vector) with floating-point coordinates.
///
/// Equality through `==` is exact; use [`Point::approx_eq`] for the
/// tolerance-based comparison the kernel relies on.
///
/// # Example
/// ```
/// use bitpaver::geometry::Point;
///
/// let a = Point::new(1.0, 2.0);
/// let b = Point::new(1.000001, 2.0);
/// assert!(a.approx_eq(&b));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: CoordF,
    pub y: CoordF,
}

impl Point {
    /// Create a new point with the given coordinates.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// Create a point, rejecting NaN and infinite coordinates.
    pub fn try_new(x: CoordF, y: CoordF) -> Result<Self> {
        let p = Self { x, y };
        if p.is_finite() {
            Ok(p)
        } else {
            Err(Error::degenerate(format!("non-finite coordinate ({x}, {y})")))
        }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Check that both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> CoordF {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        self.distance_squared(other).sqrt()
    }

    /// Squared length as a vector.
    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.x * self.x + self.y * self.y
    }

    /// Length as a vector.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.length_squared().sqrt()
    }

    /// Unit vector with the same direction.
    ///
    /// Vectors shorter than [`EPSILON`] have no meaningful direction and
    /// normalize to zero.
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len < EPSILON {
            Self::zero()
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    /// Rotate by 90 degrees counter-clockwise.
    #[inline]
    pub const fn rotate_90_ccw(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Rotate by 90 degrees clockwise.
    #[inline]
    pub const fn rotate_90_cw(&self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }

    /// Rotate the vector so that the x axis maps onto `direction` (a unit vector).
    #[inline]
    pub fn rotate_to(&self, direction: &Point) -> Self {
        Self {
            x: self.x * direction.x - self.y * direction.y,
            y: self.x * direction.y + self.y * direction.x,
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    pub fn cross(&self, other: &Point) -> CoordF {
        self.x * other.y - self.y * other.x
    }

    /// Unsigned angle in radians between two vectors, in `[0, PI]`.
    #[inline]
    pub fn angle_to(&self, other: &Point) -> CoordF {
        self.cross(other).abs().atan2(self.dot(other))
    }

    /// Signed length of the projection of `self - origin` onto `direction`.
    ///
    /// `direction` does not need to be normalized.
    #[inline]
    pub fn projection_along(&self, origin: &Point, direction: &Point) -> CoordF {
        (*self - *origin).dot(&direction.normalize())
    }

    /// Distance to the infinite line through `a` and `b`.
    pub fn distance_to_line(&self, a: &Point, b: &Point) -> CoordF {
        let ab = *b - *a;
        let len = ab.length();
        if len < EPSILON {
            return self.distance(a);
        }
        (ab.cross(&(*self - *a)) / len).abs()
    }

    /// Closest point to `self` on segment `[a, b]`.
    pub fn project_onto_segment(&self, a: &Point, b: &Point) -> Point {
        let ab = *b - *a;
        let len2 = ab.length_squared();
        if len2 == 0.0 {
            return *a;
        }
        let t = ((*self - *a).dot(&ab) / len2).clamp(0.0, 1.0);
        *a + ab * t
    }

    /// Distance to segment `[a, b]`.
    #[inline]
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> CoordF {
        self.distance(&self.project_onto_segment(a, b))
    }

    /// Check whether the point lies on segment `[a, b]`.
    ///
    /// Uses the triangle inequality: `|ap| + |pb| <= |ab| + EPSILON`.
    pub fn is_on_segment(&self, a: &Point, b: &Point) -> bool {
        a.distance(self) + self.distance(b) <= a.distance(b) + EPSILON
    }

    /// Tolerance-based equality.
    #[inline]
    pub fn approx_eq(&self, other: &Point) -> bool {
        points_approx_eq(self, other)
    }

    /// Index of the nearest point in a slice.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                self.distance_squared(a)
                    .total_cmp(&self.distance_squared(b))
            })
            .map(|(i, _)| i)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({:.6}, {:.6})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<CoordF> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: CoordF) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Div<CoordF> for Point {
    type Output = Self;

    #[inline]
    fn div(self, scalar: CoordF) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl From<(CoordF, CoordF)> for Point {
    #[inline]
    fn from((x, y): (CoordF, CoordF)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (CoordF, CoordF) {
    #[inline]
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl From<geo::Coord<CoordF>> for Point {
    #[inline]
    fn from(c: geo::Coord<CoordF>) -> Self {
        Self { x: c.x, y: c.y }
    }
}

impl From<Point> for geo::Coord<CoordF> {
    #[inline]
    fn from(p: Point) -> Self {
        geo::Coord { x: p.x, y: p.y }
    }
}

/// Type alias for a collection of points.
pub type Points = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_point_new() {
        let p = Point::new(100.0, 200.0);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 200.0);
    }

    #[test]
    fn test_try_new_rejects_nan() {
        assert!(Point::try_new(1.0, 2.0).is_ok());
        assert!(matches!(
            Point::try_new(f64::NAN, 0.0),
            Err(Error::DegenerateInput { .. })
        ));
        assert!(Point::try_new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
        assert!((p1.distance_squared(&p2) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_normalize() {
        let n = Point::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-10);
        assert!((n.x - 0.6).abs() < 1e-10);

        // Too short to have a direction.
        assert_eq!(Point::new(1e-6, 0.0).normalize(), Point::zero());
    }

    #[test]
    fn test_rotations() {
        let p = Point::new(1.0, 0.0);
        assert_eq!(p.rotate_90_ccw(), Point::new(0.0, 1.0));
        assert_eq!(p.rotate_90_cw(), Point::new(0.0, -1.0));

        let dir = Point::new(0.0, 1.0);
        let r = Point::new(2.0, 1.0).rotate_to(&dir);
        assert!(r.approx_eq(&Point::new(-1.0, 2.0)));
    }

    #[test]
    fn test_dot_cross_angle() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert_eq!(a.dot(&b), 0.0);
        assert_eq!(a.cross(&b), 1.0);
        assert!((a.angle_to(&b) - PI / 2.0).abs() < 1e-12);
        assert!((a.angle_to(&-a) - PI).abs() < 1e-12);
        assert!(a.angle_to(&(a * 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_projection_along() {
        let origin = Point::new(1.0, 1.0);
        let p = Point::new(4.0, 5.0);
        assert!((p.projection_along(&origin, &Point::new(2.0, 0.0)) - 3.0).abs() < 1e-12);
        assert!((p.projection_along(&origin, &Point::new(0.0, -1.0)) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_line_and_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let p = Point::new(15.0, 3.0);
        assert!((p.distance_to_line(&a, &b) - 3.0).abs() < 1e-12);
        assert!((p.distance_to_segment(&a, &b) - (25.0f64 + 9.0).sqrt()).abs() < 1e-12);
        assert_eq!(p.project_onto_segment(&a, &b), b);
    }

    #[test]
    fn test_is_on_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        assert!(Point::new(5.0, 5.0).is_on_segment(&a, &b));
        assert!(a.is_on_segment(&a, &b));
        assert!(!Point::new(5.0, 5.1).is_on_segment(&a, &b));
        assert!(!Point::new(11.0, 11.0).is_on_segment(&a, &b));
    }

    #[test]
    fn test_operators() {
        let p1 = Point::new(10.0, 20.0);
        let p2 = Point::new(5.0, 3.0);
        assert_eq!(p1 + p2, Point::new(15.0, 23.0));
        assert_eq!(p1 - p2, Point::new(5.0, 17.0));
        assert_eq!(-p1, Point::new(-10.0, -20.0));
        assert_eq!(p1 * 2.0, Point::new(20.0, 40.0));
        assert_eq!(p1 / 2.0, Point::new(5.0, 10.0));

        let mut p = p1;
        p += p2;
        p -= p2;
        assert_eq!(p, p1);
    }

    #[test]
    fn test_nearest_point_index() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(4.0, 1.0)];
        assert_eq!(Point::new(5.0, 0.0).nearest_point_index(&points), Some(2));
        assert_eq!(Point::zero().nearest_point_index(&[]), None);
    }
}
