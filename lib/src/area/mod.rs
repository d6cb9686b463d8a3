//! Area decomposition: from nested loops to filled surfaces.
//!
//! A slice outline is a set of closed loops that may nest arbitrarily: outer
//! walls, holes in them, islands inside the holes, and so on. The inclusion
//! depth of a loop (how many other loops contain it) decides its role: even
//! depths bound material, odd depths bound holes.

mod surface;

pub use surface::Surface;

use crate::geometry::tolerance::EPSILON;
use crate::geometry::{BoundingBox, Point, Ring, Segment};
use crate::shape::Shape;
use crate::CoordF;
use geo::{Area as _, BooleanOps};
use serde::{Deserialize, Serialize};

/// A possibly multiply-connected filled region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    surfaces: Vec<Surface>,
}

impl Area {
    /// Create an empty area.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_surfaces(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    /// Resolve nesting of `loops` into filled surfaces.
    pub fn from_rings(loops: &[Ring]) -> Self {
        Self {
            surfaces: level_zero_areas(loops),
        }
    }

    /// Filled area bounded by the polygons of an optimized shape.
    pub fn from_shape(shape: &Shape) -> Self {
        Self::from_rings(&shape.rings())
    }

    #[inline]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.iter().all(Surface::is_empty)
    }

    /// Every ring of every surface.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.surfaces.iter().flat_map(Surface::rings)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        self.surfaces.iter().any(|s| s.contains_point(p))
    }

    /// Every boundary segment, holes included.
    pub fn boundary_segments(&self) -> Vec<Segment> {
        self.surfaces.iter().flat_map(Surface::edges).collect()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        for s in &self.surfaces {
            bb.merge(&s.bounding_box());
        }
        bb
    }

    /// Sum of surface areas net of holes.
    pub fn net_area(&self) -> CoordF {
        self.surfaces.iter().map(Surface::area).sum()
    }

    /// Outer contour with the largest perimeter.
    pub fn largest_contour(&self) -> Option<&Ring> {
        self.surfaces
            .iter()
            .map(|s| &s.contour)
            .max_by(|a, b| a.perimeter().total_cmp(&b.perimeter()))
    }

    /// Shoelace centroid of the largest contour.
    pub fn centroid(&self) -> Option<Point> {
        self.largest_contour().map(Ring::centroid)
    }

    /// Distance from a point to the nearest boundary segment.
    pub fn distance_to_boundary(&self, p: &Point) -> CoordF {
        self.surfaces
            .iter()
            .map(|s| s.distance_to_boundary(p))
            .fold(CoordF::INFINITY, CoordF::min)
    }

    /// Part of this area inside `ring`.
    pub fn intersection_with_ring(&self, ring: &Ring) -> Area {
        let clip = geo::MultiPolygon::new(vec![ring.to_geo()]);
        let clipped = self.to_geo().intersection(&clip);
        let mut surfaces: Vec<Surface> = clipped.0.iter().map(Surface::from_geo).collect();
        surfaces.retain(|s| s.contour.len() >= 3 && s.area() > EPSILON);
        for s in &mut surfaces {
            s.make_canonical();
        }
        Area { surfaces }
    }

    pub fn to_geo(&self) -> geo::MultiPolygon<CoordF> {
        geo::MultiPolygon::new(self.surfaces.iter().map(Surface::to_geo).collect())
    }
}

impl From<Surface> for Area {
    fn from(surface: Surface) -> Self {
        Self {
            surfaces: vec![surface],
        }
    }
}

/// Check whether `outer` entirely contains `inner`.
///
/// Containment holds when clipping `inner` by `outer` leaves `inner`
/// unchanged, compared by area.
pub fn ring_contains(outer: &Ring, inner: &Ring) -> bool {
    if outer.len() < 3 || inner.len() < 3 {
        return false;
    }
    if !outer.bounding_box().inflated(EPSILON).contains(&inner.bounding_box()) {
        return false;
    }
    let inner_area = inner.area();
    let clipped = inner.to_geo().intersection(&outer.to_geo()).unsigned_area();
    (clipped - inner_area).abs() <= EPSILON * inner_area.max(1.0)
}

/// Number of other loops containing each loop.
pub fn inclusion_depths(loops: &[Ring]) -> Vec<usize> {
    depths(&containment_matrix(loops))
}

/// Filled surfaces of a set of nested loops.
///
/// Every even-depth loop becomes the contour of a surface; the loops one
/// level deeper that it contains become its holes. Islands inside holes come
/// out as separate surfaces.
pub fn level_zero_areas(loops: &[Ring]) -> Vec<Surface> {
    let contains = containment_matrix(loops);
    let depths = depths(&contains);

    let mut surfaces = Vec::new();
    for (i, ring) in loops.iter().enumerate() {
        if depths[i] % 2 != 0 {
            continue;
        }
        let holes: Vec<Ring> = (0..loops.len())
            .filter(|&j| depths[j] == depths[i] + 1 && contains[i][j])
            .map(|j| loops[j].clone())
            .collect();
        let mut surface = Surface::with_holes(ring.clone(), holes);
        surface.make_canonical();
        if surface.area() > 0.0 {
            surfaces.push(surface);
        }
    }
    log::debug!(
        "Resolved {} loops into {} surfaces (depths {:?})",
        loops.len(),
        surfaces.len(),
        depths
    );
    surfaces
}

/// `m[i][j]` is true when loop `i` contains loop `j`; the diagonal is false.
fn containment_matrix(loops: &[Ring]) -> Vec<Vec<bool>> {
    (0..loops.len())
        .map(|i| {
            (0..loops.len())
                .map(|j| i != j && ring_contains(&loops[i], &loops[j]))
                .collect()
        })
        .collect()
}

fn depths(contains: &[Vec<bool>]) -> Vec<usize> {
    (0..contains.len())
        .map(|i| contains.iter().filter(|row| row[i]).count())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Ring {
        Ring::rectangle(Point::new(min, min), Point::new(max, max))
    }

    #[test]
    fn test_ring_contains() {
        assert!(ring_contains(&square(0.0, 10.0), &square(2.0, 8.0)));
        assert!(!ring_contains(&square(2.0, 8.0), &square(0.0, 10.0)));
        assert!(!ring_contains(&square(0.0, 10.0), &square(5.0, 15.0)));
    }

    #[test]
    fn test_inclusion_depths_nested() {
        let loops = vec![square(0.0, 100.0), square(10.0, 90.0), square(20.0, 80.0), square(200.0, 210.0)];
        assert_eq!(inclusion_depths(&loops), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_level_zero_areas_parity() {
        let loops = vec![square(10.0, 90.0), square(0.0, 100.0), square(20.0, 80.0)];
        let surfaces = level_zero_areas(&loops);
        assert_eq!(surfaces.len(), 2);

        let outer = surfaces.iter().find(|s| !s.holes.is_empty()).unwrap();
        assert!((outer.area() - (100.0 * 100.0 - 80.0 * 80.0)).abs() < 1e-6);

        let island = surfaces.iter().find(|s| s.holes.is_empty()).unwrap();
        assert!((island.area() - 60.0 * 60.0).abs() < 1e-6);

        let area = Area::from_surfaces(surfaces);
        assert!(area.contains_point(&Point::new(5.0, 5.0)));
        assert!(!area.contains_point(&Point::new(15.0, 15.0)));
        assert!(area.contains_point(&Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_area_queries() {
        let area = Area::from_rings(&[square(0.0, 10.0), square(4.0, 6.0)]);
        assert_eq!(area.surfaces().len(), 1);
        assert_eq!(area.boundary_segments().len(), 8);
        assert!((area.net_area() - 96.0).abs() < 1e-6);
        assert!(area.centroid().unwrap().approx_eq(&Point::new(5.0, 5.0)));
        assert!((area.distance_to_boundary(&Point::new(2.0, 5.0)) - 2.0).abs() < 1e-10);
        assert_eq!(area.largest_contour().unwrap().len(), 4);
    }

    #[test]
    fn test_intersection_with_ring() {
        let area = Area::from_rings(&[square(0.0, 10.0)]);
        let clip = Ring::rectangle(Point::new(5.0, -5.0), Point::new(15.0, 5.0));
        let clipped = area.intersection_with_ring(&clip);
        assert_eq!(clipped.surfaces().len(), 1);
        assert!((clipped.net_area() - 25.0).abs() < 1e-6);
        assert!(clipped.surfaces()[0].contour.is_counter_clockwise());
    }

    #[test]
    fn test_from_shape() {
        let shape = Shape::from_rings(&[square(0.0, 10.0), square(3.0, 7.0)]).unwrap();
        let area = Area::from_shape(&shape);
        assert!((area.net_area() - 84.0).abs() < 1e-6);
    }
}
