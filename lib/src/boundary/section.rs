//! Section type: a contiguous run of boundary points.

use crate::geometry::tolerance::{contains_approx, EPSILON};
use crate::geometry::{Point, Segment};
use crate::hull::{convex_hull, hull_edges};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};

/// A run of boundary points starting at `start_point`.
///
/// Sections are cut from a loop by [`section_from`](super::section_from) and
/// consumed by the bit fitter. They are closed when the run wraps all the way
/// around the loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    start_point: Point,
    points: Vec<Point>,
}

impl Section {
    /// Create a section; the first point becomes the start point.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let Some(&start_point) = points.first() else {
            return Err(Error::degenerate("section has no points"));
        };
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(Error::degenerate(format!("section has non-finite point {p:?}")));
        }
        Ok(Self {
            start_point,
            points,
        })
    }

    #[inline]
    pub fn start_point(&self) -> Point {
        self.start_point
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Last point of the run.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points.last().copied().unwrap_or(self.start_point)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A section is closed when its first and last points coincide.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.start_point.approx_eq(&self.last_point())
    }

    /// Consecutive segments, skipping repeated points.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.points.len());
        let mut from = self.start_point;
        for p in self.points.iter().skip(1) {
            if !p.approx_eq(&from) {
                segments.push(Segment::new(from, *p));
                from = *p;
            }
        }
        segments
    }

    /// Length of the run measured along its points.
    pub fn length(&self) -> CoordF {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Convex hull of the points, closed.
    pub fn hull(&self) -> Result<Vec<Point>> {
        convex_hull(&self.points)
    }

    /// Edges of the convex hull, closing edge last.
    pub fn hull_segments(&self) -> Result<Vec<Segment>> {
        Ok(hull_edges(&self.hull()?))
    }

    /// Point furthest from `reference`.
    pub fn furthest_point(&self, reference: &Point) -> Point {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| reference.distance_squared(a).total_cmp(&reference.distance_squared(b)))
            .unwrap_or(self.start_point)
    }

    /// Point furthest from the infinite line through `segment`, with its distance.
    pub fn furthest_point_from_line(&self, segment: &Segment) -> (Point, CoordF) {
        self.points
            .iter()
            .map(|p| (*p, p.distance_to_line(&segment.start, &segment.end)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((self.start_point, 0.0))
    }

    /// Point with the largest projection on `direction` measured from `origin`.
    pub fn furthest_point_along(&self, origin: &Point, direction: &Point) -> Point {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| {
                a.projection_along(origin, direction)
                    .total_cmp(&b.projection_along(origin, direction))
            })
            .unwrap_or(self.start_point)
    }

    /// Check if a point is as good as equal to one of the section's points.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        contains_approx(&self.points, p)
    }

    /// Check if every point of `points` is part of the section.
    pub fn contains_all(&self, points: &[Point]) -> bool {
        points.iter().all(|p| self.contains_point(p))
    }

    /// Keep the first `len` points.
    pub fn truncated(&self, len: usize) -> Section {
        Section {
            start_point: self.start_point,
            points: self.points[..len.clamp(1, self.points.len())].to_vec(),
        }
    }

    /// Index of the last point as good as equal to any of `targets`.
    pub fn rposition_any(&self, targets: &[Point]) -> Option<usize> {
        self.points
            .iter()
            .rposition(|p| targets.iter().any(|t| t.approx_eq(p)))
    }

    /// Insert `count` evenly spaced points along the run, keeping the old ones.
    ///
    /// New points that land on an existing point are dropped, so the first
    /// and last points are preserved exactly.
    pub fn resampled(&self, count: usize) -> Section {
        if self.points.len() < 2 || count < 2 {
            return self.clone();
        }

        let mut cumulative = Vec::with_capacity(self.points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in self.points.windows(2) {
            total += w[0].distance(&w[1]);
            cumulative.push(total);
        }
        if total < EPSILON {
            return self.clone();
        }

        let spacing = total / (count - 1) as CoordF;
        let mut out: Vec<Point> = Vec::with_capacity(self.points.len() + count);
        let push = |out: &mut Vec<Point>, p: Point| {
            if out.last().map_or(true, |last| !last.approx_eq(&p)) {
                out.push(p);
            }
        };

        let mut old = 0;
        let mut edge = 0;
        for k in 0..count {
            let s = (spacing * k as CoordF).min(total);
            while old < self.points.len() && cumulative[old] <= s {
                push(&mut out, self.points[old]);
                old += 1;
            }
            while edge + 2 < self.points.len() && cumulative[edge + 1] < s {
                edge += 1;
            }
            let span = cumulative[edge + 1] - cumulative[edge];
            let t = if span > 0.0 {
                ((s - cumulative[edge]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let p = self.points[edge] + (self.points[edge + 1] - self.points[edge]) * t;
            let next_old = self.points.get(old);
            if next_old.map_or(true, |n| !n.approx_eq(&p)) {
                push(&mut out, p);
            }
        }
        for p in &self.points[old..] {
            push(&mut out, *p);
        }
        if let Some(last) = out.last_mut() {
            *last = self.last_point();
        }

        Section {
            start_point: self.start_point,
            points: out,
        }
    }
}
