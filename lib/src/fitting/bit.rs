//! The bit: a fixed-width oriented rectangle.

use crate::area::Area;
use crate::geometry::tolerance::EPSILON;
use crate::geometry::{BoundingBox, Point, Ring, Segment};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An oriented rectangle placed over the boundary.
///
/// `orientation` is the unit vector of the length axis. Bits are produced
/// by the fitter and never changed afterwards.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bit {
    center: Point,
    orientation: Point,
    length: CoordF,
    width: CoordF,
}

impl Bit {
    /// Create a bit; `orientation` is normalized.
    pub fn new(center: Point, orientation: Point, length: CoordF, width: CoordF) -> Self {
        Self {
            center,
            orientation: orientation.normalize(),
            length,
            width,
        }
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn orientation(&self) -> Point {
        self.orientation
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.length
    }

    #[inline]
    pub fn width(&self) -> CoordF {
        self.width
    }

    /// Unit vector across the bit, to the left of the orientation.
    #[inline]
    fn across(&self) -> Point {
        self.orientation.rotate_90_ccw()
    }

    /// Bit-local coordinates: along the length axis, then across it.
    fn to_local(&self, p: &Point) -> (CoordF, CoordF) {
        let d = *p - self.center;
        (d.dot(&self.orientation), d.dot(&self.across()))
    }

    fn from_local(&self, along: CoordF, across: CoordF) -> Point {
        self.center + self.orientation * along + self.across() * across
    }

    /// Corners in counter-clockwise order, starting behind and to the right.
    pub fn corners(&self) -> [Point; 4] {
        let (hl, hw) = (self.length / 2.0, self.width / 2.0);
        [
            self.from_local(-hl, -hw),
            self.from_local(hl, -hw),
            self.from_local(hl, hw),
            self.from_local(-hl, hw),
        ]
    }

    /// The four sides, following [`Bit::corners`].
    pub fn sides(&self) -> [Segment; 4] {
        let c = self.corners();
        [
            Segment::new(c[0], c[1]),
            Segment::new(c[1], c[2]),
            Segment::new(c[2], c[3]),
            Segment::new(c[3], c[0]),
        ]
    }

    pub fn outline(&self) -> Ring {
        Ring::from_points(self.corners().to_vec())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.corners())
    }

    /// Check if a point is inside the rectangle or on its sides.
    pub fn contains_point(&self, p: &Point) -> bool {
        let (along, across) = self.to_local(p);
        along.abs() <= self.length / 2.0 + EPSILON && across.abs() <= self.width / 2.0 + EPSILON
    }

    /// Parameter range `(t_in, t_out)` of `segment` that lies inside the
    /// rectangle, or `None` if the segment misses it.
    pub fn clip_segment(&self, segment: &Segment) -> Option<(CoordF, CoordF)> {
        let (sx, sy) = self.to_local(&segment.start);
        let (ex, ey) = self.to_local(&segment.end);
        let (dx, dy) = (ex - sx, ey - sy);
        let (hl, hw) = (self.length / 2.0, self.width / 2.0);

        let mut t_in: CoordF = 0.0;
        let mut t_out: CoordF = 1.0;
        // Liang-Barsky: one (p, q) pair per slab side.
        for (p, q) in [(-dx, sx + hl), (dx, hl - sx), (-dy, sy + hw), (dy, hw - sy)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t_in = t_in.max(r);
            } else {
                t_out = t_out.min(r);
            }
            if t_in > t_out {
                return None;
            }
        }
        Some((t_in, t_out))
    }

    /// Part of `area` covered by the bit.
    pub fn material_footprint(&self, area: &Area) -> Area {
        area.intersection_with_ring(&self.outline())
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bit(center: {}, dir: {}, {:.3} x {:.3})",
            self.center, self.orientation, self.length, self.width
        )
    }
}
