//! Geometry primitives shared by every stage of the kernel.
//!
//! - [`Point`]: floating-point 2D point and vector
//! - [`BoundingBox`]: axis-aligned box used by the spatial index
//! - [`Segment`] / [`SegmentArena`]: oriented segments linked into chains by index
//! - [`Polygon`]: a chain of arena segments
//! - [`Ring`]: a closed sequence of points
//! - [`AabbTree`]: dynamic balanced bounding-volume tree
//!
//! All tolerance-based comparisons go through [`tolerance`].

pub mod aabb_tree;
pub mod bounding_box;
pub mod point;
pub mod polygon;
pub mod ring;
pub mod segment;
pub mod tolerance;

pub use aabb_tree::{AabbTree, LeafId};
pub use bounding_box::BoundingBox;
pub use point::{Point, Points};
pub use polygon::Polygon;
pub use ring::Ring;
pub use segment::{Segment, SegmentArena, SegmentId};
pub use tolerance::{approx_eq, points_approx_eq, EPSILON};
