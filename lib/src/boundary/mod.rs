//! Boundary traversal: ordering loops and cutting sections out of them.
//!
//! Loops are plain point vectors. A closed loop repeats its first point at
//! the end and, once canonicalized, starts at its maximum-x point.

mod section;

pub use section::Section;

use crate::fitting::Bit;
use crate::geometry::tolerance::EPSILON;
use crate::geometry::{AabbTree, BoundingBox, Point, Segment};
use crate::shape::Shape;
use crate::{CoordF, Error, Result};

/// Largest number of step halvings in [`circle_segment_intersection`].
const MAX_HALVINGS: usize = 64;

/// Where a loop leaves a bit, measured from the walk's start point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopExit {
    pub point: Point,
    /// Arc length from the start point to `point`.
    pub distance_along: CoordF,
}

/// Chain raw segments into ordered point loops.
///
/// Segments are joined whenever one's end is as good as equal to another's
/// start. Each chain becomes one loop; closed loops repeat their first point
/// and are rotated to begin at their maximum-x point. Zero-length segments
/// are ignored.
pub fn ordered_loops(segments: &[Segment]) -> Vec<Vec<Point>> {
    let mut tree: AabbTree<usize> = AabbTree::new();
    let mut leaves = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        if seg.is_degenerate() {
            leaves.push(None);
        } else {
            leaves.push(Some(tree.insert(BoundingBox::from_point(seg.start).inflated(EPSILON), i)));
        }
    }

    let mut loops = Vec::new();
    for first in 0..segments.len() {
        let Some(leaf) = leaves[first].take() else {
            continue;
        };
        tree.remove(leaf);

        let mut points = vec![segments[first].start];
        let mut current = first;
        loop {
            let end = segments[current].end;
            points.push(end);
            let next = tree
                .query(&BoundingBox::from_point(end))
                .map(|(_, &i)| i)
                .filter(|&i| segments[i].start.approx_eq(&end))
                .min();
            let Some(next) = next else {
                break;
            };
            if let Some(leaf) = leaves[next].take() {
                tree.remove(leaf);
            }
            current = next;
        }

        if points.len() < 2 {
            continue;
        }
        if points.len() > 3 && points[0].approx_eq(&points[points.len() - 1]) {
            let last = points.len() - 1;
            points[last] = points[0];
            points = rotate_to_max_x(points);
        }
        loops.push(points);
    }
    log::debug!("Ordered {} segments into {} loops", segments.len(), loops.len());
    loops
}

/// Ordered loops of an assembled shape.
pub fn loops_from_shape(shape: &Shape) -> Vec<Vec<Point>> {
    ordered_loops(&shape.segments())
}

/// Rotate a closed loop so it starts (and ends) at its maximum-x point.
///
/// Ties keep the earliest point. Open sequences are returned untouched.
pub fn rotate_to_max_x(mut points: Vec<Point>) -> Vec<Point> {
    if points.len() < 3 || !points[0].approx_eq(&points[points.len() - 1]) {
        return points;
    }
    points.pop();
    let mut best = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x > points[best].x {
            best = i;
        }
    }
    points.rotate_left(best);
    points.push(points[0]);
    points
}

/// Index `i` of the loop piece `[loop[i], loop[i + 1]]` holding `p`.
///
/// A point sitting on a vertex belongs to the piece starting there.
pub fn locate_on_loop(points: &[Point], p: &Point) -> Option<usize> {
    let on_piece = |i: &usize| p.distance_to_segment(&points[*i], &points[*i + 1]) < EPSILON;
    let pieces = 0..points.len().saturating_sub(1);
    pieces
        .clone()
        .filter(on_piece)
        .find(|&i| !p.approx_eq(&points[i + 1]))
        .or_else(|| pieces.clone().find(on_piece))
}

/// Cut a section of boundary points starting at `start`.
///
/// The walk follows the loop forward while the straight-line distance from
/// `start` stays below `target_length`. The last point is where the loop
/// crosses the circle of radius `target_length` around `start`. When the
/// whole loop fits in that circle the section wraps around and ends on
/// `start`, which makes it closed.
///
/// # Errors
/// [`Error::StartPointNotOnBoundary`] when `start` is on no piece of the
/// loop, [`Error::DegenerateInput`] for loops of fewer than two points,
/// non-finite values or a non-positive target length.
pub fn section_from(points: &[Point], start: Point, target_length: CoordF) -> Result<Section> {
    if points.len() < 2 {
        return Err(Error::degenerate(format!("loop of {} points", points.len())));
    }
    if !start.is_finite() || points.iter().any(|p| !p.is_finite()) {
        return Err(Error::degenerate("loop or start point has non-finite coordinates"));
    }
    if !target_length.is_finite() || target_length <= 0.0 {
        return Err(Error::degenerate(format!("section target length {target_length}")));
    }
    let Some(first) = locate_on_loop(points, &start) else {
        return Err(Error::StartPointNotOnBoundary {
            point: start,
            loop_len: points.len(),
        });
    };

    let pieces = points.len() - 1;
    let closed = points[0].approx_eq(&points[pieces]);
    let steps = if closed { pieces } else { pieces - first };

    let mut section = vec![start];
    let mut from = start;
    for k in 0..steps {
        let end = points[(first + k) % pieces + 1];
        if start.distance(&end) >= target_length {
            if let Some(p) = circle_segment_intersection(start, target_length, from, end) {
                section.push(p);
            }
            return Section::new(section);
        }
        if !end.approx_eq(&from) {
            section.push(end);
            from = end;
        }
    }

    if closed {
        // Full revolution: finish exactly on the start point.
        let last = section.len() - 1;
        if last > 0 && section[last].approx_eq(&start) {
            section[last] = start;
        } else {
            section.push(start);
        }
    }
    Section::new(section)
}

/// Point of segment `[a, b]` at distance `radius` from `center`.
///
/// `a` must be inside (or on) the circle and `b` outside (or on) it;
/// otherwise there is no crossing to find and `None` is returned. The
/// crossing is located by step-halving along the segment.
pub fn circle_segment_intersection(center: Point, radius: CoordF, a: Point, b: Point) -> Option<Point> {
    let tolerance = EPSILON * 1e-3;
    let da = center.distance(&a);
    let db = center.distance(&b);
    if da > radius + tolerance || db < radius - tolerance {
        return None;
    }
    if (db - radius).abs() <= tolerance {
        return Some(b);
    }
    if (da - radius).abs() <= tolerance {
        return Some(a);
    }

    let ab = b - a;
    let mut t = 0.0;
    let mut step = 0.5;
    let mut p = a;
    for _ in 0..MAX_HALVINGS {
        p = a + ab * (t + step);
        let d = center.distance(&p);
        if (d - radius).abs() <= tolerance {
            return Some(p);
        }
        if d < radius {
            t += step;
        }
        step *= 0.5;
    }
    Some(p)
}

/// First point where the loop, walked forward from `start`, leaves `bit`.
///
/// Returns `Ok(None)` when no piece of the loop crosses out of the bit, for
/// instance when the bit covers the whole loop.
///
/// # Errors
/// [`Error::StartPointNotOnBoundary`] when `start` is not on the loop.
pub fn exit_point(bit: &Bit, points: &[Point], start: Point) -> Result<Option<LoopExit>> {
    let Some(first) = locate_on_loop(points, &start) else {
        return Err(Error::StartPointNotOnBoundary {
            point: start,
            loop_len: points.len(),
        });
    };

    let pieces = points.len() - 1;
    let closed = points[0].approx_eq(&points[pieces]);
    let steps = if closed { pieces + 1 } else { pieces - first };

    let mut from = start;
    let mut walked = 0.0;
    for k in 0..steps {
        // The last step of a revolution comes back to the start point.
        let end = if closed && k == pieces {
            start
        } else {
            points[(first + k) % pieces + 1]
        };
        let piece = Segment::new(from, end);
        if !bit.contains_point(&end) {
            if let Some((_, t_out)) = bit.clip_segment(&piece) {
                let exit = piece.point_at(t_out);
                let distance_along = walked + from.distance(&exit);
                if distance_along > EPSILON {
                    return Ok(Some(LoopExit {
                        point: exit,
                        distance_along,
                    }));
                }
            }
        }
        walked += piece.length();
        from = end;
    }
    Ok(None)
}
