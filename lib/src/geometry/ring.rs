//! Ring type for closed point loops.
//!
//! A [`Ring`] is the point-based counterpart of a [`Polygon`](super::Polygon):
//! the outline of one loop, implicitly closed. Areas, holes and lift-point
//! searches all work on rings.

use super::{BoundingBox, Point, Segment};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A closed loop defined by a sequence of points.
///
/// The last point connects back to the first. Counter-clockwise rings have
/// positive signed area.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Create a new empty ring.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a ring from points.
    ///
    /// A trailing point equal to the first one is dropped, so explicitly
    /// closed point lists are accepted too.
    pub fn from_points(mut points: Vec<Point>) -> Self {
        if points.len() > 1 {
            let first = points[0];
            if points.last().map_or(false, |p| p.approx_eq(&first)) {
                points.pop();
            }
        }
        Self { points }
    }

    /// Axis-aligned rectangle, counter-clockwise.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self {
            points: vec![
                min,
                Point::new(max.x, min.y),
                max,
                Point::new(min.x, max.y),
            ],
        }
    }

    /// Regular polygon approximating a circle, counter-clockwise.
    pub fn circle(center: Point, radius: CoordF, segments: usize) -> Self {
        let n = segments.max(3);
        let points = (0..n)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as CoordF / n as CoordF;
                center + Point::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points with the first one repeated at the end.
    pub fn closed_points(&self) -> Vec<Point> {
        let mut pts = self.points.clone();
        if let Some(first) = self.points.first() {
            pts.push(*first);
        }
        pts
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edge starting at `index`.
    #[inline]
    pub fn edge(&self, index: usize) -> Segment {
        let j = (index + 1) % self.points.len();
        Segment::new(self.points[index], self.points[j])
    }

    /// All edges, including the closing one.
    pub fn edges(&self) -> Vec<Segment> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        (0..self.points.len()).map(|i| self.edge(i)).collect()
    }

    /// Signed area (positive for counter-clockwise).
    pub fn signed_area(&self) -> CoordF {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..self.points.len() {
            let j = (i + 1) % self.points.len();
            sum += self.points[i].cross(&self.points[j]);
        }
        sum / 2.0
    }

    #[inline]
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn reversed(&self) -> Self {
        let mut r = self.clone();
        r.reverse();
        r
    }

    /// Perimeter including the closing edge.
    pub fn perimeter(&self) -> CoordF {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().iter().map(Segment::length).sum()
    }

    /// Area centroid from the shoelace formula.
    ///
    /// Falls back to the vertex average for degenerate (zero-area) rings.
    pub fn centroid(&self) -> Point {
        match self.points.len() {
            0 => return Point::zero(),
            1 => return self.points[0],
            _ => {}
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut area2 = 0.0;
        for i in 0..self.points.len() {
            let j = (i + 1) % self.points.len();
            let (pi, pj) = (self.points[i], self.points[j]);
            let cross = pi.cross(&pj);
            cx += (pi.x + pj.x) * cross;
            cy += (pi.y + pj.y) * cross;
            area2 += cross;
        }

        if area2.abs() < 1e-12 {
            let sum = self
                .points
                .iter()
                .fold(Point::zero(), |acc, p| acc + *p);
            return sum / self.points.len() as CoordF;
        }

        Point::new(cx / (3.0 * area2), cy / (3.0 * area2))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Even-odd point containment.
    pub fn contains_point(&self, p: &Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let pi = &self.points[i];
            let pj = &self.points[j];
            if (pi.y > p.y) != (pj.y > p.y)
                && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Check whether a point lies on the outline within tolerance.
    pub fn is_point_on_boundary(&self, p: &Point) -> bool {
        self.edges().iter().any(|e| e.contains_point(p))
    }

    /// Distance from a point to the outline.
    pub fn distance_to_point(&self, p: &Point) -> CoordF {
        self.edges()
            .iter()
            .map(|e| e.distance_to_point(p))
            .fold(CoordF::INFINITY, CoordF::min)
    }

    /// Convert to a `geo` polygon without holes.
    pub fn to_geo(&self) -> geo::Polygon<CoordF> {
        geo::Polygon::new(self.to_geo_line_string(), vec![])
    }

    /// Convert to a closed `geo` line string.
    pub fn to_geo_line_string(&self) -> geo::LineString<CoordF> {
        geo::LineString::from(
            self.closed_points()
                .into_iter()
                .map(geo::Coord::from)
                .collect::<Vec<_>>(),
        )
    }

    /// Build a ring from a closed `geo` line string.
    pub fn from_geo_line_string(ls: &geo::LineString<CoordF>) -> Self {
        Self::from_points(ls.coords().map(|c| Point::from(*c)).collect())
    }
}

impl Index<usize> for Ring {
    type Output = Point;

    #[inline]
    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ring({} points, area {:.3})", self.points.len(), self.area())
    }
}

impl From<Vec<Point>> for Ring {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Ring {
        Ring::rectangle(Point::new(0.0, 0.0), Point::new(size, size))
    }

    #[test]
    fn test_from_points_drops_closing_duplicate() {
        let r = Ring::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(r.len(), 3);
        assert_eq!(r.closed_points().len(), 4);
    }

    #[test]
    fn test_ring_area() {
        let r = square(10.0);
        assert!((r.signed_area() - 100.0).abs() < 1e-10);
        assert!(r.is_counter_clockwise());
        assert!((r.reversed().signed_area() + 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_ring_perimeter_and_edges() {
        let r = square(10.0);
        assert_eq!(r.edges().len(), 4);
        assert!((r.perimeter() - 40.0).abs() < 1e-10);
        assert_eq!(r.edge(3).end, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_ring_centroid() {
        let c = square(10.0).centroid();
        assert!(c.approx_eq(&Point::new(5.0, 5.0)));

        let line = Ring::from_points(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
        assert!(line.centroid().approx_eq(&Point::new(1.0, 0.0)));
    }

    #[test]
    fn test_ring_contains_point() {
        let r = square(10.0);
        assert!(r.contains_point(&Point::new(5.0, 5.0)));
        assert!(!r.contains_point(&Point::new(15.0, 5.0)));
        assert!(!r.contains_point(&Point::new(-0.1, 5.0)));
    }

    #[test]
    fn test_ring_distance_and_boundary() {
        let r = square(10.0);
        assert!((r.distance_to_point(&Point::new(5.0, 3.0)) - 3.0).abs() < 1e-10);
        assert!(r.is_point_on_boundary(&Point::new(10.0, 4.0)));
        assert!(!r.is_point_on_boundary(&Point::new(9.0, 4.0)));
    }

    #[test]
    fn test_ring_circle() {
        let c = Ring::circle(Point::new(1.0, 1.0), 5.0, 64);
        assert_eq!(c.len(), 64);
        assert!(c.is_counter_clockwise());
        let expected = std::f64::consts::PI * 25.0;
        assert!((c.area() - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_geo_round_trip_keeps_points() {
        let r = square(3.0);
        let back = Ring::from_geo_line_string(&r.to_geo_line_string());
        assert_eq!(back.points(), r.points());
    }
}
