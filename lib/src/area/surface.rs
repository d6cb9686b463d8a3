//! Surface type for filled regions with holes.

use crate::geometry::{BoundingBox, Point, Ring, Segment};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A filled region: an outer contour minus its holes.
///
/// Canonical surfaces have a counter-clockwise contour and clockwise holes.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// The outer boundary.
    pub contour: Ring,
    /// Interior boundaries cut out of the contour.
    pub holes: Vec<Ring>,
}

impl Surface {
    /// Create a surface with only a contour.
    #[inline]
    pub fn new(contour: Ring) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Create a surface with a contour and holes.
    #[inline]
    pub fn with_holes(contour: Ring, holes: Vec<Ring>) -> Self {
        Self { contour, holes }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// Contour area minus hole areas.
    pub fn area(&self) -> CoordF {
        let holes: CoordF = self.holes.iter().map(Ring::area).sum();
        self.contour.area() - holes
    }

    /// Orient the contour counter-clockwise and the holes clockwise.
    pub fn make_canonical(&mut self) {
        if !self.contour.is_counter_clockwise() {
            self.contour.reverse();
        }
        for hole in &mut self.holes {
            if hole.is_counter_clockwise() {
                hole.reverse();
            }
        }
    }

    /// Check if a point is inside the contour and outside every hole.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// The contour followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.contour).chain(self.holes.iter())
    }

    /// Every boundary edge, holes included.
    pub fn edges(&self) -> Vec<Segment> {
        self.rings().flat_map(Ring::edges).collect()
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Distance from a point to the nearest boundary, holes included.
    pub fn distance_to_boundary(&self, p: &Point) -> CoordF {
        self.rings()
            .map(|r| r.distance_to_point(p))
            .fold(CoordF::INFINITY, CoordF::min)
    }

    pub fn to_geo(&self) -> geo::Polygon<CoordF> {
        geo::Polygon::new(
            self.contour.to_geo_line_string(),
            self.holes.iter().map(Ring::to_geo_line_string).collect(),
        )
    }

    pub fn from_geo(polygon: &geo::Polygon<CoordF>) -> Self {
        Self {
            contour: Ring::from_geo_line_string(polygon.exterior()),
            holes: polygon
                .interiors()
                .iter()
                .map(Ring::from_geo_line_string)
                .collect(),
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({} points, {} holes, area {:.3})",
            self.contour.len(),
            self.holes.len(),
            self.area()
        )
    }
}
