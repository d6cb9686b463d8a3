//! Lift-point search: where a vacuum pickup can grab a bit.
//!
//! A lift point must be inside the material and at least `min_radius` away
//! from every boundary, holes included. The centroid of the largest contour
//! is tried first; if it fails, a grid over the bounding box is searched,
//! nearest-to-centroid first.

use crate::area::Area;
use crate::fitting::Bit;
use crate::geometry::Point;
use crate::{CoordF, Error, Result};

/// Default grid step of the fallback search.
pub const DEFAULT_GRID_STEP: CoordF = 1.0;

/// Find a point of `area` with `min_radius` clearance, or `None`.
///
/// Repeated calls on the same input return the same point.
pub fn lift_point(area: &Area, min_radius: CoordF) -> Option<Point> {
    lift_point_with_step(area, min_radius, DEFAULT_GRID_STEP)
}

/// [`lift_point`] with an explicit grid step for the fallback search.
pub fn lift_point_with_step(area: &Area, min_radius: CoordF, step: CoordF) -> Option<Point> {
    let centroid = area.centroid()?;
    if has_clearance(area, &centroid, min_radius) {
        return Some(centroid);
    }
    if !(step.is_finite() && step > 0.0) {
        return None;
    }

    let bb = area.bounding_box();
    if !bb.is_defined() {
        return None;
    }
    log::debug!(
        "Centroid {centroid} lacks clearance {min_radius:.3}, searching a {step:.3} grid over {bb}"
    );

    let columns = ((bb.max.x - bb.min.x) / step).floor() as usize;
    let rows = ((bb.max.y - bb.min.y) / step).floor() as usize;
    let mut samples: Vec<Point> = (0..=columns)
        .flat_map(|i| {
            (0..=rows).map(move |j| Point::new(bb.min.x + i as CoordF * step, bb.min.y + j as CoordF * step))
        })
        .filter(|p| area.contains_point(p))
        .collect();
    // Stable sort, so ties keep grid order.
    samples.sort_by(|a, b| {
        a.distance_squared(&centroid)
            .total_cmp(&b.distance_squared(&centroid))
    });

    let found = samples
        .into_iter()
        .find(|p| area.distance_to_boundary(p) >= min_radius);
    if found.is_none() {
        log::debug!("No lift point with clearance {min_radius:.3}");
    }
    found
}

/// Like [`lift_point`], but infeasibility is an error.
///
/// # Errors
/// [`Error::LiftPointInfeasible`] when no point has the clearance.
pub fn require_lift_point(area: &Area, min_radius: CoordF) -> Result<Point> {
    lift_point(area, min_radius).ok_or(Error::LiftPointInfeasible { min_radius })
}

/// Lift point within the material a bit cuts out of `area`.
pub fn bit_lift_point(bit: &Bit, area: &Area, min_radius: CoordF) -> Option<Point> {
    lift_point(&bit.material_footprint(area), min_radius)
}

/// Check if `p` is inside `area` and at least `min_radius` from its boundary.
pub fn has_clearance(area: &Area, p: &Point, min_radius: CoordF) -> bool {
    area.contains_point(p) && area.distance_to_boundary(p) >= min_radius
}
