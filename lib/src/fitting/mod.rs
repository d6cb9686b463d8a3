//! Bit fitting: shrink a section until a bit can cover it, then place one.
//!
//! The width of a section is measured on its convex hull: the longest hull
//! edge is the *constraint segment* and the hull vertex furthest from that
//! edge's line is the *constraint point*. Reduction cuts the section back to
//! the last occurrence of one of those three points until the width fits
//! under a bit.
//!
//! Placement orients the bit along the constraint segment and resolves the
//! offset across it with four geometric cases. The cases are heuristics
//! that behave well on slice outlines; they are not guaranteed to find the
//! best placement (see [`NormalCase::Realigned`]).

mod bit;

pub use bit::Bit;

use crate::area::Area;
use crate::boundary::Section;
use crate::config::PaverConfig;
use crate::geometry::tolerance::{EPSILON, INNER_PROBE_DISTANCE};
use crate::geometry::{Point, Segment};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};

/// Offset of the probe used to tell which side of the constraint segment is filled.
const CHECK_OFFSET: CoordF = 1e-5;

/// Width of a section as measured on its hull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidthConstraint {
    /// Longest hull edge.
    pub segment: Segment,
    /// Hull vertex furthest from the line through `segment`.
    pub point: Point,
    /// Distance from `point` to that line.
    pub width: CoordF,
}

impl WidthConstraint {
    /// Measure a closed hull given as its edges; the edge starts are the
    /// hull vertices.
    ///
    /// # Errors
    /// [`Error::DegenerateInput`] if there is no edge.
    pub fn from_edges(edges: &[Segment]) -> Result<Self> {
        let segment = longest(edges).ok_or_else(|| Error::degenerate("hull has no edge"))?;
        let (point, width) = edges
            .iter()
            .map(|e| (e.start, e.start.distance_to_line(&segment.start, &segment.end)))
            .fold((segment.start, 0.0), |best, cand| if cand.1 > best.1 { cand } else { best });
        Ok(Self {
            segment,
            point,
            width,
        })
    }

    /// Measure a section.
    pub fn of_section(section: &Section) -> Result<Self> {
        Self::from_edges(&section.hull_segments()?)
    }

    /// The hull collapsed to a line: the constraint point lies on the segment.
    pub fn is_flat(&self) -> bool {
        self.point.is_on_segment(&self.segment.start, &self.segment.end)
    }
}

/// First longest segment.
fn longest(segments: &[Segment]) -> Option<Segment> {
    let mut best: Option<Segment> = None;
    for s in segments {
        if best.map_or(true, |b| s.length() > b.length()) {
            best = Some(*s);
        }
    }
    best
}

/// How the bit offset across its length axis was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalCase {
    /// The hull is a straight line; the bit goes on the filled side of it.
    Line,
    /// The section wraps a whole small feature.
    Closed,
    /// The longest hull edge runs through material, so the bit is aligned
    /// on the longest non-closing hull edge instead. This is known to be
    /// incomplete on some outlines.
    Realigned,
    /// The longest hull edge lies outside the material; the common case.
    Outside,
}

/// A placed bit and the part of the boundary it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub bit: Bit,
    /// The reduced section the bit was fitted on.
    pub section_covered: Section,
    /// Where the next section starts. The fitter sets the end of the
    /// covered section; the paver may move it to where the loop leaves
    /// the bit.
    pub next_start_point: Point,
    pub case: NormalCase,
}

/// Fits bits on sections.
#[derive(Clone, Debug, Default)]
pub struct BitFitter {
    config: PaverConfig,
}

impl BitFitter {
    pub fn new(config: PaverConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PaverConfig {
        &self.config
    }

    /// Widest hull a section may have and still fit under a bit.
    pub fn width_limit(&self, section: &Section, margin: CoordF) -> CoordF {
        if section.is_closed() {
            self.config.bit_width
        } else {
            self.config.bit_width - margin
        }
    }

    /// Shrink a section from its end until its hull width fits.
    ///
    /// The section is resampled once, then cut back to the last point equal
    /// to an end of the constraint segment or to the constraint point, that
    /// point excluded, until the width fits.
    ///
    /// # Errors
    /// [`Error::SectionUnshrinkable`] if no cut point leaves at least three
    /// points or the iteration limit is reached, [`Error::DegenerateInput`]
    /// if the hull cannot be built.
    pub fn reduce(&self, section: &Section, margin: CoordF) -> Result<Section> {
        let mut current = section.resampled(self.config.resample_points);
        let mut last_width = 0.0;
        let mut last_limit = self.width_limit(&current, margin);

        for iteration in 0..self.config.max_reduction_iterations {
            let constraint = WidthConstraint::of_section(&current)?;
            let limit = self.width_limit(&current, margin);
            (last_width, last_limit) = (constraint.width, limit);
            if constraint.width <= limit {
                log::debug!(
                    "Section reduced to {} points after {} passes (width {:.4} <= {:.4})",
                    current.len(),
                    iteration,
                    constraint.width,
                    limit
                );
                return Ok(current);
            }

            let targets = [constraint.segment.start, constraint.segment.end, constraint.point];
            match current.rposition_any(&targets) {
                Some(cut) if cut >= 3 => {
                    log::trace!(
                        "Pass {iteration}: width {:.4} > {:.4}, cutting at point {cut}/{}",
                        constraint.width,
                        limit,
                        current.len()
                    );
                    current = current.truncated(cut);
                }
                _ => break,
            }
        }

        log::warn!(
            "Section of {} points starting at {} cannot be reduced below width {:.4}",
            current.len(),
            current.start_point(),
            last_width
        );
        Err(Error::SectionUnshrinkable {
            points: current.len(),
            width: last_width,
            limit: last_limit,
        })
    }

    /// Reduce a section and place a bit over it.
    ///
    /// The bit is oriented along the constraint segment of the reduced
    /// section, starts at the section point furthest behind the start point
    /// and is long enough to reach the furthest point ahead, plus `margin`.
    ///
    /// The length is measured from that rear point, not from the section
    /// start: a section that bends back behind its start is still covered
    /// end to end along the bit axis.
    pub fn place(&self, section: &Section, area: &Area, margin: CoordF) -> Result<Placement> {
        let reduced = self.reduce(section, margin)?;
        let edges = reduced.hull_segments()?;
        let constraint = WidthConstraint::from_edges(&edges)?;

        let start = reduced.start_point();
        let furthest = reduced.furthest_point(&start);
        let mut direction = constraint.segment.direction();
        if direction.dot(&(furthest - start)) < 0.0 {
            direction = -direction;
        }

        let bit_start = reduced.furthest_point_along(&start, &-direction);
        let reach = reduced
            .furthest_point_along(&bit_start, &direction)
            .projection_along(&bit_start, &direction);
        let length = reach + margin;

        let (case, offset) =
            self.normal_offset(&reduced, &edges, &constraint, direction, bit_start, area);
        let center = bit_start + direction * (length / 2.0) + offset;
        let bit = Bit::new(center, direction, length, self.config.bit_width);
        log::debug!("Placed {bit:?} ({case:?}) over {} points", reduced.len());

        Ok(Placement {
            bit,
            next_start_point: reduced.last_point(),
            section_covered: reduced,
            case,
        })
    }

    /// Offset of the bit center across its length axis, from `bit_start`.
    ///
    /// The returned vector is always perpendicular to `direction`.
    fn normal_offset(
        &self,
        reduced: &Section,
        edges: &[Segment],
        constraint: &WidthConstraint,
        direction: Point,
        bit_start: Point,
        area: &Area,
    ) -> (NormalCase, Point) {
        let half_width = self.config.bit_width / 2.0;
        let segment = constraint.segment;
        let mid = segment.midpoint();
        let to_mid = mid - constraint.point;
        let check = mid + to_mid.normalize() * CHECK_OFFSET;

        if constraint.is_flat() {
            return (NormalCase::Line, inner_normal(&segment, area) * half_width);
        }

        if reduced.is_closed() {
            let across = half_width - bit_start.distance_to_line(&segment.start, &segment.end);
            return (NormalCase::Closed, segment.normal() * across);
        }

        if area.contains_point(&check) {
            // Every hull edge but the closing one.
            let open_edges = &edges[..edges.len().saturating_sub(1)];
            let realigned = longest(open_edges).unwrap_or(segment);
            let mut normal = realigned.normal();
            if normal.dot(&to_mid) < 0.0 {
                normal = -normal;
            }
            let across = half_width - bit_start.projection_along(&constraint.point, &normal);
            // The realigned edge only sets the side and the distance; the
            // offset itself stays square to the bit axis.
            let mut side = direction.rotate_90_ccw();
            if side.dot(&normal) < 0.0 {
                side = -side;
            }
            return (NormalCase::Realigned, side * across);
        }

        let mut normal = segment.normal();
        if normal.dot(&to_mid) > 0.0 {
            normal = -normal;
        }
        let across = half_width - bit_start.projection_along(&mid, &normal);
        (NormalCase::Outside, normal * across)
    }
}

/// Normal of `segment` pointing into the filled side of `area`.
pub fn inner_normal(segment: &Segment, area: &Area) -> Point {
    let normal = segment.normal();
    let probe = segment.midpoint() + normal * INNER_PROBE_DISTANCE;
    if area.contains_point(&probe) {
        normal
    } else {
        -normal
    }
}

/// Check that every point of the section lies under the bit.
pub fn covers(bit: &Bit, section: &Section) -> bool {
    section.points().iter().all(|p| bit.contains_point(p))
}

/// Check that every point of the section projects onto the bit's length,
/// measured from the bit center along its orientation.
pub fn covers_axially(bit: &Bit, section: &Section) -> bool {
    let axis = bit.orientation();
    let center = bit.center();
    let half_length = bit.length() / 2.0;
    section
        .points()
        .iter()
        .all(|p| p.projection_along(&center, &axis).abs() <= half_length + EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ring;

    fn section(coords: &[(f64, f64)]) -> Section {
        Section::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    }

    fn square_area(size: f64) -> Area {
        Area::from_rings(&[Ring::rectangle(Point::new(0.0, 0.0), Point::new(size, size))])
    }

    #[test]
    fn test_width_constraint_of_triangle() {
        let c = WidthConstraint::of_section(&section(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)])).unwrap();
        assert!((c.segment.length() - 5.0).abs() < 1e-12);
        assert_eq!(c.point, Point::new(0.0, 0.0));
        assert!((c.width - 2.4).abs() < 1e-12);
        assert!(!c.is_flat());
    }

    #[test]
    fn test_reduce_straight_section_is_untouched() {
        let fitter = BitFitter::default();
        let s = section(&[(0.0, 0.0), (40.0, 0.0)]);
        let reduced = fitter.reduce(&s, 3.0).unwrap();
        assert_eq!(reduced.start_point(), s.start_point());
        assert_eq!(reduced.last_point(), s.last_point());

        let again = fitter.reduce(&reduced, 3.0).unwrap();
        assert_eq!(again.last_point(), reduced.last_point());
    }

    #[test]
    fn test_reduce_cuts_corner() {
        let fitter = BitFitter::default();
        let s = section(&[(0.0, 0.0), (60.0, 0.0), (60.0, 60.0)]);
        let reduced = fitter.reduce(&s, 3.0).unwrap();

        let width = WidthConstraint::of_section(&reduced).unwrap().width;
        assert!(width <= 21.0);
        let end = reduced.last_point();
        assert!((end.x - 60.0).abs() < 1e-9);
        assert!(end.y > 15.0 && end.y < 22.5);
        assert_eq!(reduced.start_point(), Point::new(0.0, 0.0));

        // Already fitting: nothing more to cut.
        let again = fitter.reduce(&reduced, 3.0).unwrap();
        assert_eq!(again.last_point(), end);
    }

    #[test]
    fn test_reduce_gives_up_at_iteration_limit() {
        let fitter = BitFitter::new(PaverConfig::new().with_max_reduction_iterations(1));
        let s = section(&[(0.0, 0.0), (60.0, 0.0), (60.0, 60.0)]);
        assert!(matches!(
            fitter.reduce(&s, 3.0),
            Err(Error::SectionUnshrinkable { limit, .. }) if (limit - 21.0).abs() < 1e-12
        ));
    }

    #[test]
    fn test_reduce_rejects_point_section() {
        let fitter = BitFitter::default();
        let s = section(&[(1.0, 1.0), (1.0, 1.0)]);
        assert!(matches!(fitter.reduce(&s, 3.0), Err(Error::DegenerateInput { .. })));
    }

    #[test]
    fn test_place_on_straight_edge() {
        let fitter = BitFitter::default();
        let placement = fitter
            .place(&section(&[(0.0, 0.0), (40.0, 0.0)]), &square_area(100.0), 3.0)
            .unwrap();
        let bit = placement.bit;
        assert_eq!(placement.case, NormalCase::Line);
        assert!((bit.length() - 43.0).abs() < 1e-9);
        assert_eq!(bit.width(), 24.0);
        assert!(bit.center().distance(&Point::new(21.5, 12.0)) < 1e-9);
        assert!(bit.orientation().approx_eq(&Point::new(1.0, 0.0)));
        assert!(covers(&bit, &placement.section_covered));
        assert_eq!(placement.next_start_point, Point::new(40.0, 0.0));
    }

    #[test]
    fn test_place_on_convex_corner() {
        let fitter = BitFitter::default();
        let placement = fitter
            .place(&section(&[(70.0, 0.0), (100.0, 0.0), (100.0, 10.0)]), &square_area(100.0), 3.0)
            .unwrap();
        assert_eq!(placement.case, NormalCase::Realigned);
        assert!(covers(&placement.bit, &placement.section_covered));
        assert!(covers_axially(&placement.bit, &placement.section_covered));
        let side = placement.bit.center() - Point::new(70.0, 0.0);
        let along = side.dot(&placement.bit.orientation());
        assert!((along - placement.bit.length() / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_place_on_closed_section() {
        let fitter = BitFitter::default();
        let s = section(&[(5.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0), (5.0, 0.0)]);
        let placement = fitter.place(&s, &square_area(10.0), 3.0).unwrap();
        assert_eq!(placement.case, NormalCase::Closed);
        assert!(covers(&placement.bit, &placement.section_covered));
    }

    #[test]
    fn test_inner_normal() {
        let area = square_area(10.0);
        let bottom = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(inner_normal(&bottom, &area), Point::new(0.0, 1.0));
        assert_eq!(inner_normal(&bottom.reversed(), &area), Point::new(0.0, 1.0));
    }
}
