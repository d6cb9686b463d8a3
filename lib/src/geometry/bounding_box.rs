//! Axis-aligned bounding boxes.

use super::Point;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box.
///
/// A box starts undefined and becomes defined once a point is merged into it.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl BoundingBox {
    /// Create a new empty (undefined) bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point::new(CoordF::MAX, CoordF::MAX),
            max: Point::new(CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    /// Create a bounding box from min and max corners.
    #[inline]
    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    /// Create the smallest box holding two arbitrary corners.
    #[inline]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_min_max(
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }

    /// Degenerate box holding a single point.
    #[inline]
    pub fn from_point(p: Point) -> Self {
        Self::from_min_max(p, p)
    }

    /// Create a bounding box from a slice of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Check if the bounding box is defined.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Extend the box to include a point.
    #[inline]
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Extend the box to include another box.
    #[inline]
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    /// The smallest box holding both boxes.
    #[inline]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bb = *self;
        bb.merge(other);
        bb
    }

    /// Grow the box by `margin` on every side.
    #[inline]
    pub fn inflated(&self, margin: CoordF) -> BoundingBox {
        if !self.defined {
            return *self;
        }
        Self::from_min_max(
            Point::new(self.min.x - margin, self.min.y - margin),
            Point::new(self.max.x + margin, self.max.y + margin),
        )
    }

    #[inline]
    pub fn width(&self) -> CoordF {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0.0
        }
    }

    #[inline]
    pub fn height(&self) -> CoordF {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0.0
        }
    }

    /// Perimeter of the box, the insertion cost metric of the spatial index.
    #[inline]
    pub fn perimeter(&self) -> CoordF {
        2.0 * (self.width() + self.height())
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Check if a point lies inside or on the box.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Check if `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.defined && self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Check if two boxes overlap. Touching boxes overlap.
    #[inline]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.defined
            && other.defined
            && !(other.min.x > self.max.x
                || other.min.y > self.max.y
                || self.min.x > other.max.x
                || self.min.y > other.max.y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.min, self.max)
    }
}
