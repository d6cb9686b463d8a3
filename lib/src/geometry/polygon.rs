//! Polygon type for chains of arena segments.
//!
//! A [`Polygon`] does not own geometry: it names the first and last segment
//! of a chain living in a [`SegmentArena`] and walks `next` links to visit the
//! rest. The point outline is built lazily and cached until the chain changes.

use super::{BoundingBox, Point, Ring, SegmentArena, SegmentId};
use crate::{CoordF, Error, Result};
use std::sync::OnceLock;

/// An ordered, possibly closed chain of segments.
///
/// Closed means `next(last) == first`.
#[derive(Debug, Default)]
pub struct Polygon {
    first: Option<SegmentId>,
    last: Option<SegmentId>,
    closed: bool,
    outline: OnceLock<Ring>,
}

impl Clone for Polygon {
    fn clone(&self) -> Self {
        Self {
            first: self.first,
            last: self.last,
            closed: self.closed,
            outline: self.outline.get().cloned().map_or_else(OnceLock::new, OnceLock::from),
        }
    }
}

impl Polygon {
    /// Create an empty polygon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a polygon from the chain starting at `start`.
    ///
    /// The walk stops when the chain ends or loops back to `start`; in the
    /// latter case the polygon is closed.
    pub fn from_chain(arena: &SegmentArena, start: SegmentId) -> Self {
        let mut last = start;
        let mut closed = false;
        let mut steps = 0;
        while let Some(next) = arena.next(last) {
            if next == start {
                closed = true;
                break;
            }
            last = next;
            steps += 1;
            assert!(steps <= arena.len(), "segment chain from {start} loops without reaching it");
        }
        Self {
            first: Some(start),
            last: Some(last),
            closed,
            outline: OnceLock::new(),
        }
    }

    #[inline]
    pub fn first(&self) -> Option<SegmentId> {
        self.first
    }

    #[inline]
    pub fn last(&self) -> Option<SegmentId> {
        self.last
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Append a segment after the current last one.
    ///
    /// # Panics
    /// If the polygon is already closed.
    pub fn add_end(&mut self, arena: &mut SegmentArena, id: SegmentId) {
        assert!(!self.closed, "cannot extend closed polygon");
        match self.last {
            Some(last) => arena.link(last, id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        self.invalidate();
    }

    /// Link the last segment back to the first.
    pub fn close(&mut self, arena: &mut SegmentArena) {
        if let (Some(first), Some(last)) = (self.first, self.last) {
            arena.link(last, first);
            self.closed = true;
            self.invalidate();
        }
    }

    /// Verify that the chain from `first` reaches `last` through consistent links.
    pub fn check(&self, arena: &SegmentArena) -> Result<()> {
        let (Some(first), Some(last)) = (self.first, self.last) else {
            return Ok(());
        };
        let mut current = first;
        let mut steps = 0;
        loop {
            if !arena.is_consistent(current) {
                return Err(not_manifold(arena, current));
            }
            if current == last {
                break;
            }
            current = arena.next(current).ok_or_else(|| not_manifold(arena, current))?;
            steps += 1;
            if steps > arena.len() {
                return Err(not_manifold(arena, current));
            }
        }
        if self.closed && arena.next(last) != Some(first) {
            return Err(not_manifold(arena, last));
        }
        Ok(())
    }

    /// Segment ids in chain order.
    pub fn segment_ids(&self, arena: &SegmentArena) -> Vec<SegmentId> {
        let mut ids = Vec::new();
        let (Some(first), Some(last)) = (self.first, self.last) else {
            return ids;
        };
        let mut current = first;
        loop {
            ids.push(current);
            if current == last {
                break;
            }
            match arena.next(current) {
                Some(next) if next != first => current = next,
                _ => break,
            }
        }
        ids
    }

    /// Number of segments in the chain.
    pub fn len(&self, arena: &SegmentArena) -> usize {
        self.segment_ids(arena).len()
    }

    /// Remove segment `id` from the chain, dropping the vertex at its end.
    ///
    /// The following segment is re-anchored to start where `id` started, so
    /// the outline stays connected. Returns the re-anchored segment, which
    /// callers holding a spatial index must re-insert.
    pub fn remove(&mut self, arena: &mut SegmentArena, id: SegmentId) -> Option<SegmentId> {
        let prev = arena.prev(id);
        let next = arena.next(id);

        let anchor = arena.get(id).start;
        if let Some(n) = next {
            let end = arena.get(n).end;
            arena.update(n, anchor, end);
        }

        arena.unlink_prev(id);
        arena.unlink_next(id);
        if let (Some(p), Some(n)) = (prev, next) {
            if p != id && n != id {
                arena.link(p, n);
            }
        }

        if self.first == Some(id) {
            self.first = next.filter(|n| *n != id);
        }
        if self.last == Some(id) {
            self.last = prev.filter(|p| *p != id);
        }
        if self.first.is_none() || self.last.is_none() {
            self.first = None;
            self.last = None;
            self.closed = false;
        }
        self.invalidate();
        next
    }

    /// Cached outline: the start point of every segment, in chain order.
    pub fn outline(&self, arena: &SegmentArena) -> &Ring {
        self.outline.get_or_init(|| {
            let mut points: Vec<Point> = self
                .segment_ids(arena)
                .into_iter()
                .map(|id| arena.get(id).start)
                .collect();
            if !self.closed {
                if let Some(last) = self.last {
                    points.push(arena.get(last).end);
                }
            }
            Ring::from_points(points)
        })
    }

    /// Drop the cached outline.
    #[inline]
    pub fn invalidate(&mut self) {
        self.outline.take();
    }

    /// Check whether the cached outline is present.
    #[inline]
    pub fn has_cached_outline(&self) -> bool {
        self.outline.get().is_some()
    }

    /// Even-odd containment against the closed outline.
    pub fn contains_point(&self, arena: &SegmentArena, p: &Point) -> bool {
        self.outline(arena).contains_point(p)
    }

    /// Check that every vertex of `other` lies inside this polygon.
    pub fn contains_polygon(&self, arena: &SegmentArena, other: &Polygon) -> bool {
        !other.is_empty()
            && other
                .segment_ids(arena)
                .into_iter()
                .all(|id| self.contains_point(arena, &arena.get(id).start))
    }

    /// Segment whose distance to `p` is smallest.
    pub fn closest_segment(&self, arena: &SegmentArena, p: &Point) -> Option<SegmentId> {
        self.segment_ids(arena).into_iter().min_by(|a, b| {
            arena
                .get(*a)
                .distance_to_point(p)
                .total_cmp(&arena.get(*b).distance_to_point(p))
        })
    }

    pub fn bounding_box(&self, arena: &SegmentArena) -> BoundingBox {
        self.outline(arena).bounding_box()
    }

    /// Sum of segment lengths.
    pub fn perimeter(&self, arena: &SegmentArena) -> CoordF {
        self.segment_ids(arena)
            .into_iter()
            .map(|id| arena.get(id).length())
            .sum()
    }
}

fn not_manifold(arena: &SegmentArena, id: SegmentId) -> Error {
    let seg = arena.get(id);
    Error::NotManifold {
        segment: id.index(),
        start: seg.start,
        end: seg.end,
    }
}
