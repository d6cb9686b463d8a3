//! Oriented segments and the arena that links them into chains.
//!
//! Chains are stored as indices: a [`SegmentArena`] owns every segment of a
//! slice and records the optional `prev` / `next` neighbour of each one. The
//! arena enforces `prev(next(s)) == s` and `next(prev(s)) == s` on every link
//! change.

use super::tolerance::SEGMENT_BOX_MARGIN;
use super::{BoundingBox, Point};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An oriented segment with a cached unit normal.
///
/// The normal is the direction rotated clockwise, so for a counter-clockwise
/// loop it points out of the enclosed region.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    normal: Point,
}

impl Segment {
    /// Create a segment from two points.
    #[inline]
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            normal: (end - start).rotate_90_cw().normalize(),
        }
    }

    /// Create a segment, rejecting non-finite coordinates.
    pub fn try_new(start: Point, end: Point) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(Error::degenerate(format!(
                "segment {start} -> {end} has a non-finite coordinate"
            )));
        }
        Ok(Self::new(start, end))
    }

    /// Unit normal of the segment.
    #[inline]
    pub fn normal(&self) -> Point {
        self.normal
    }

    /// Vector from start to end.
    #[inline]
    pub fn vector(&self) -> Point {
        self.end - self.start
    }

    /// Unit direction from start to end.
    #[inline]
    pub fn direction(&self) -> Point {
        self.vector().normalize()
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.start.distance(&self.end)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        (self.start + self.end) * 0.5
    }

    /// Point at parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn point_at(&self, t: CoordF) -> Point {
        self.start + self.vector() * t
    }

    /// Check whether the endpoints are as good as equal.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start.approx_eq(&self.end)
    }

    /// Same segment walked the other way.
    #[inline]
    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }

    /// Bounding box inflated by [`SEGMENT_BOX_MARGIN`].
    ///
    /// The margin lets endpoints drift slightly when segments are re-linked
    /// without the spatial index going stale.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.start, self.end).inflated(SEGMENT_BOX_MARGIN)
    }

    /// Distance from a point to the segment.
    #[inline]
    pub fn distance_to_point(&self, p: &Point) -> CoordF {
        p.distance_to_segment(&self.start, &self.end)
    }

    /// Check whether a point lies on the segment within tolerance.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        p.is_on_segment(&self.start, &self.end)
    }

    /// Intersection point with another segment, if any.
    ///
    /// Endpoint contacts count as intersections. Overlapping collinear
    /// segments return the first shared endpoint found.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let r = self.vector();
        let s = other.vector();
        let denom = r.cross(&s);
        let qp = other.start - self.start;

        if denom.abs() < 1e-12 {
            // Parallel: only endpoint contacts can be reported.
            return [self.start, self.end]
                .into_iter()
                .find(|p| other.contains_point(p))
                .or_else(|| {
                    [other.start, other.end]
                        .into_iter()
                        .find(|p| self.contains_point(p))
                });
        }

        let t = qp.cross(&s) / denom;
        let u = qp.cross(&r) / denom;
        let slack = 1e-9;
        if (-slack..=1.0 + slack).contains(&t) && (-slack..=1.0 + slack).contains(&u) {
            Some(self.point_at(t.clamp(0.0, 1.0)))
        } else {
            None
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment({:?} -> {:?})", self.start, self.end)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// Index of a segment inside a [`SegmentArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub usize);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Link {
    segment: Segment,
    prev: Option<SegmentId>,
    next: Option<SegmentId>,
}

/// Owner of every segment of one slice, with index-based chain links.
#[derive(Clone, Debug, Default)]
pub struct SegmentArena {
    links: Vec<Link>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Add an unlinked segment.
    pub fn push(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.links.len());
        self.links.push(Link {
            segment,
            prev: None,
            next: None,
        });
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// All segment ids, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.links.len()).map(SegmentId)
    }

    /// Geometry of a segment.
    #[inline]
    pub fn get(&self, id: SegmentId) -> &Segment {
        &self.links[id.0].segment
    }

    #[inline]
    pub fn prev(&self, id: SegmentId) -> Option<SegmentId> {
        self.links[id.0].prev
    }

    #[inline]
    pub fn next(&self, id: SegmentId) -> Option<SegmentId> {
        self.links[id.0].next
    }

    /// Make `to` follow `from`.
    ///
    /// # Panics
    /// If `from` already has a different successor or `to` a different
    /// predecessor. Re-linking silently would corrupt both chains.
    pub fn link(&mut self, from: SegmentId, to: SegmentId) {
        let current_next = self.links[from.0].next;
        let current_prev = self.links[to.0].prev;
        assert!(
            current_next.is_none() || current_next == Some(to),
            "segment {from} is already followed by {current_next:?}"
        );
        assert!(
            current_prev.is_none() || current_prev == Some(from),
            "segment {to} is already preceded by {current_prev:?}"
        );
        self.links[from.0].next = Some(to);
        self.links[to.0].prev = Some(from);
    }

    /// Detach the successor of `id`, if any, and return it.
    pub fn unlink_next(&mut self, id: SegmentId) -> Option<SegmentId> {
        let next = self.links[id.0].next.take()?;
        self.links[next.0].prev = None;
        Some(next)
    }

    /// Detach the predecessor of `id`, if any, and return it.
    pub fn unlink_prev(&mut self, id: SegmentId) -> Option<SegmentId> {
        let prev = self.links[id.0].prev.take()?;
        self.links[prev.0].next = None;
        Some(prev)
    }

    /// Replace the geometry of a segment, keeping its links.
    pub fn update(&mut self, id: SegmentId, start: Point, end: Point) {
        self.links[id.0].segment = Segment::new(start, end);
    }

    /// Check the link symmetry of one segment.
    pub fn is_consistent(&self, id: SegmentId) -> bool {
        let link = &self.links[id.0];
        link.next.map_or(true, |n| self.links[n.0].prev == Some(id))
            && link.prev.map_or(true, |p| self.links[p.0].next == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_normal_points_right() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        assert!(s.normal().approx_eq(&Point::new(0.0, -1.0)));
        assert!((s.length() - 10.0).abs() < 1e-12);
        assert_eq!(s.midpoint(), Point::new(5.0, 0.0));
    }

    #[test]
    fn test_try_new_rejects_nan() {
        assert!(Segment::try_new(Point::new(f64::NAN, 0.0), Point::zero()).is_err());
        assert!(Segment::try_new(Point::zero(), Point::new(1.0, 0.0)).is_ok());
    }

    #[test]
    fn test_bounding_box_is_inflated() {
        let bb = seg(0.0, 0.0, 10.0, 5.0).bounding_box();
        assert_eq!(bb.min, Point::new(-1.0, -1.0));
        assert_eq!(bb.max, Point::new(11.0, 6.0));
    }

    #[test]
    fn test_intersection_crossing() {
        let a = seg(0.0, 0.0, 10.0, 10.0);
        let b = seg(0.0, 10.0, 10.0, 0.0);
        let p = a.intersection(&b).unwrap();
        assert!(p.approx_eq(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_intersection_endpoint_and_miss() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let touching = seg(10.0, 0.0, 10.0, 5.0);
        assert!(a.intersection(&touching).unwrap().approx_eq(&Point::new(10.0, 0.0)));

        let miss = seg(11.0, -1.0, 11.0, 1.0);
        assert!(a.intersection(&miss).is_none());

        let parallel = seg(0.0, 1.0, 10.0, 1.0);
        assert!(a.intersection(&parallel).is_none());

        let collinear = seg(10.0, 0.0, 20.0, 0.0);
        assert!(a.intersection(&collinear).unwrap().approx_eq(&Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_arena_links() {
        let mut arena = SegmentArena::new();
        let a = arena.push(seg(0.0, 0.0, 1.0, 0.0));
        let b = arena.push(seg(1.0, 0.0, 1.0, 1.0));
        arena.link(a, b);
        assert_eq!(arena.next(a), Some(b));
        assert_eq!(arena.prev(b), Some(a));
        assert!(arena.is_consistent(a) && arena.is_consistent(b));

        // Linking the same pair again is a no-op.
        arena.link(a, b);

        assert_eq!(arena.unlink_next(a), Some(b));
        assert_eq!(arena.prev(b), None);
        assert_eq!(arena.unlink_prev(b), None);
    }

    #[test]
    #[should_panic(expected = "already followed")]
    fn test_arena_relink_panics() {
        let mut arena = SegmentArena::new();
        let a = arena.push(seg(0.0, 0.0, 1.0, 0.0));
        let b = arena.push(seg(1.0, 0.0, 1.0, 1.0));
        let c = arena.push(seg(1.0, 0.0, 2.0, 0.0));
        arena.link(a, b);
        arena.link(a, c);
    }

    #[test]
    fn test_arena_update_recomputes_normal() {
        let mut arena = SegmentArena::new();
        let a = arena.push(seg(0.0, 0.0, 1.0, 0.0));
        arena.update(a, Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!(arena.get(a).normal().approx_eq(&Point::new(1.0, 0.0)));
    }
}
