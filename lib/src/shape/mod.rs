//! Shape assembly: joining loose slice segments into closed polygons.
//!
//! A mesh slicer emits the boundary of a slice as an unordered bag of
//! segments whose endpoints only nearly coincide. [`Shape::optimize`] links
//! each segment to its neighbours through the spatial index, walks the
//! resulting chains into closed [`Polygon`]s and merges runs of nearly
//! collinear segments.

use crate::geometry::tolerance::{JOIN_MIN_COS_ANGLE, LINK_MAX_DISTANCE_SQUARED};
use crate::geometry::{AabbTree, BoundingBox, LeafId, Point, Polygon, Ring, Segment, SegmentArena, SegmentId};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Minimum number of segments kept when merging collinear runs.
const MIN_POLYGON_SEGMENTS: usize = 3;

/// The boundary of one slice: raw segments plus the polygons assembled from them.
#[derive(Debug, Default)]
pub struct Shape {
    arena: SegmentArena,
    /// Live segments; merged segments are dropped from this list.
    segments: Vec<SegmentId>,
    /// Spatial index leaf of each arena segment, by segment index.
    leaves: Vec<Option<LeafId>>,
    tree: AabbTree<SegmentId>,
    polygons: Vec<Polygon>,
}

impl Shape {
    /// Create an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a shape from `(start, end)` pairs.
    pub fn from_segments<I>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Point, Point)>,
    {
        let mut shape = Self::new();
        for (start, end) in segments {
            shape.add_segment(start, end)?;
        }
        Ok(shape)
    }

    /// Build an already-optimized shape from closed point loops.
    pub fn from_rings(rings: &[Ring]) -> Result<Self> {
        let mut shape = Self::new();
        for ring in rings {
            let pts = ring.closed_points();
            for pair in pts.windows(2) {
                shape.add_segment(pair[0], pair[1])?;
            }
        }
        shape.optimize()?;
        Ok(shape)
    }

    /// Add a raw segment.
    ///
    /// Zero-length segments are skipped and yield `None`; non-finite
    /// coordinates are rejected.
    pub fn add_segment(&mut self, start: Point, end: Point) -> Result<Option<SegmentId>> {
        let segment = Segment::try_new(start, end)?;
        if segment.is_degenerate() {
            log::trace!("Skipping zero-length segment at {start}");
            return Ok(None);
        }
        let id = self.arena.push(segment);
        let leaf = self.tree.insert(segment.bounding_box(), id);
        self.leaves.push(Some(leaf));
        self.segments.push(id);
        Ok(Some(id))
    }

    /// Segment arena backing the polygons.
    #[inline]
    pub fn arena(&self) -> &SegmentArena {
        &self.arena
    }

    /// Live segment ids.
    #[inline]
    pub fn segment_ids(&self) -> &[SegmentId] {
        &self.segments
    }

    /// Live segments, by value.
    pub fn segments(&self) -> Vec<Segment> {
        self.segments.iter().map(|id| *self.arena.get(*id)).collect()
    }

    /// Assembled polygons (empty until [`Shape::optimize`] succeeds).
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Outline of every assembled polygon.
    pub fn rings(&self) -> Vec<Ring> {
        self.polygons
            .iter()
            .map(|p| p.outline(&self.arena).clone())
            .collect()
    }

    /// Spatial index over the live segments.
    #[inline]
    pub fn tree(&self) -> &AabbTree<SegmentId> {
        &self.tree
    }

    /// Segments whose (inflated) box overlaps `bbox`.
    pub fn query(&self, bbox: &BoundingBox) -> impl Iterator<Item = SegmentId> + '_ {
        self.tree.query(bbox).map(|(_, id)| *id)
    }

    /// Link every segment into closed polygons.
    ///
    /// # Errors
    /// [`Error::NotManifold`] if a chain does not close on itself.
    pub fn optimize(&mut self) -> Result<&[Polygon]> {
        self.polygons.clear();

        for id in self.segments.clone() {
            if self.arena.prev(id).is_none() {
                self.link_predecessor(id);
            }
        }
        for id in self.segments.clone() {
            if self.arena.next(id).is_none() {
                self.link_successor(id);
            }
        }

        for id in &self.segments {
            assert!(self.arena.is_consistent(*id), "inconsistent links at segment {id}");
        }

        let mut unvisited: BTreeSet<SegmentId> = self.segments.iter().copied().collect();
        while let Some(&start) = unvisited.iter().next() {
            let mut current = start;
            loop {
                unvisited.remove(&current);
                match self.arena.next(current) {
                    Some(next) if next == start => break,
                    Some(next) if unvisited.contains(&next) => current = next,
                    _ => {
                        let seg = self.arena.get(current);
                        log::warn!(
                            "Chain starting at segment {start} breaks at {current} ({} -> {})",
                            seg.start,
                            seg.end
                        );
                        return Err(Error::NotManifold {
                            segment: current.index(),
                            start: seg.start,
                            end: seg.end,
                        });
                    }
                }
            }

            let mut polygon = Polygon::from_chain(&self.arena, start);
            self.merge_collinear(&mut polygon);
            polygon.check(&self.arena)?;
            self.polygons.push(polygon);
        }

        log::debug!(
            "Assembled {} polygons from {} segments",
            self.polygons.len(),
            self.segments.len()
        );
        Ok(&self.polygons)
    }

    fn link_predecessor(&mut self, id: SegmentId) {
        let start = self.arena.get(id).start;
        let best = self.closest_candidate(id, &start, |arena, other| {
            arena.next(other).is_none() && arena.get(other).end.approx_eq(&start)
        }, |seg| seg.end);
        if let Some(prev) = best {
            let end = self.arena.get(id).end;
            let anchor = self.arena.get(prev).end;
            self.arena.update(id, anchor, end);
            self.arena.link(prev, id);
        }
    }

    fn link_successor(&mut self, id: SegmentId) {
        let end = self.arena.get(id).end;
        let best = self.closest_candidate(id, &end, |arena, other| {
            arena.prev(other).is_none() && arena.get(other).start.approx_eq(&end)
        }, |seg| seg.start);
        if let Some(next) = best {
            let start = self.arena.get(id).start;
            let anchor = self.arena.get(next).start;
            self.arena.update(id, start, anchor);
            self.arena.link(id, next);
        }
    }

    /// Closest segment (other than `id`) passing `accept` whose `endpoint`
    /// lies within the link distance of `target`.
    fn closest_candidate<A, E>(
        &self,
        id: SegmentId,
        target: &Point,
        accept: A,
        endpoint: E,
    ) -> Option<SegmentId>
    where
        A: Fn(&SegmentArena, SegmentId) -> bool,
        E: Fn(&Segment) -> Point,
    {
        let mut best = None;
        let mut best_dist2 = LINK_MAX_DISTANCE_SQUARED;
        for (_, &other) in self.tree.query(&BoundingBox::from_point(*target)) {
            if other == id || !accept(&self.arena, other) {
                continue;
            }
            let dist2 = endpoint(self.arena.get(other)).distance_squared(target);
            if dist2 < best_dist2 {
                best_dist2 = dist2;
                best = Some(other);
            }
        }
        best
    }

    /// Drop vertices between nearly parallel segments.
    fn merge_collinear(&mut self, polygon: &mut Polygon) {
        let ids = polygon.segment_ids(&self.arena);
        let mut remaining = ids.len();
        for id in ids {
            if remaining <= MIN_POLYGON_SEGMENTS {
                break;
            }
            // Skip segments already merged away.
            if self.leaves[id.index()].is_none() {
                continue;
            }
            let Some(next) = self.arena.next(id) else {
                continue;
            };
            let cos = self.arena.get(id).normal().dot(&self.arena.get(next).normal());
            if cos <= JOIN_MIN_COS_ANGLE {
                continue;
            }

            if let Some(leaf) = self.leaves[id.index()].take() {
                self.tree.remove(leaf);
            }
            self.segments.retain(|s| *s != id);

            if let Some(reanchored) = polygon.remove(&mut self.arena, id) {
                if let Some(leaf) = self.leaves[reanchored.index()].take() {
                    self.tree.remove(leaf);
                }
                let bbox = self.arena.get(reanchored).bounding_box();
                self.leaves[reanchored.index()] = Some(self.tree.insert(bbox, reanchored));
            }
            remaining -= 1;
            log::trace!("Merged collinear segment {id}");
        }
    }
}
