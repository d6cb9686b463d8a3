//! # bitpaver
//!
//! A 2D geometry kernel that covers the boundary of a slice with fixed-size
//! oriented rectangles ("bits").
//!
//! The pipeline mirrors how a border paver walks a slice:
//!
//! 1. **Assembly** - raw, unordered segments are linked into closed polygons
//!    ([`shape::Shape`]) with the help of a dynamic bounding-volume tree
//!    ([`geometry::AabbTree`]).
//! 2. **Decomposition** - loops are nested by inclusion depth into filled
//!    surfaces with holes ([`area::Area`]).
//! 3. **Traversal** - loops are ordered and canonicalized, and bounded-length
//!    sections are cut from them ([`boundary`]).
//! 4. **Fitting** - each section is reduced until it fits under a bit, and a
//!    rectangle is derived from it ([`fitting::BitFitter`]).
//! 5. **Lift points** - a vacuum pickup location with clearance is searched
//!    inside each bit's material footprint ([`lift`]).
//!
//! [`paver::BorderPaver`] drives steps 3 and 4 around every loop of a slice.
//!
//! ## Example
//!
//! ```
//! use bitpaver::boundary::section_from;
//! use bitpaver::geometry::Point;
//!
//! let square = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(100.0, 100.0),
//!     Point::new(0.0, 100.0),
//!     Point::new(0.0, 0.0),
//! ];
//! let section = section_from(&square, Point::new(0.0, 0.0), 40.0).unwrap();
//! assert_eq!(section.len(), 2);
//! ```

pub mod area;
pub mod boundary;
pub mod config;
pub mod fitting;
pub mod geometry;
pub mod hull;
pub mod lift;
pub mod paver;
pub mod shape;

pub use area::{Area, Surface};
pub use boundary::{circle_segment_intersection, exit_point, ordered_loops, section_from, Section};
pub use config::PaverConfig;
pub use fitting::{Bit, BitFitter, NormalCase, Placement};
pub use geometry::{AabbTree, BoundingBox, Point, Polygon, Ring, Segment, SegmentArena, SegmentId};
pub use hull::convex_hull;
pub use lift::lift_point;
pub use paver::BorderPaver;
pub use shape::Shape;

use thiserror::Error;

/// Floating-point coordinate type used throughout the kernel.
pub type CoordF = f64;

/// Errors raised by the kernel.
#[derive(Debug, Error)]
pub enum Error {
    /// Input geometry the kernel cannot work with.
    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    /// A segment chain could not be closed into a loop.
    #[error("Shape is not manifold: segment {segment} ({start} -> {end}) does not close into a loop")]
    NotManifold {
        segment: usize,
        start: geometry::Point,
        end: geometry::Point,
    },

    /// A section start point that lies on none of the loop's segments.
    #[error("Start point {point} is not on the boundary ({loop_len} loop points)")]
    StartPointNotOnBoundary { point: geometry::Point, loop_len: usize },

    /// Section reduction ran out of cut points before the width fit.
    #[error("Section of {points} points cannot be reduced: width {width:.6} exceeds {limit:.6}")]
    SectionUnshrinkable {
        points: usize,
        width: CoordF,
        limit: CoordF,
    },

    /// No pickup point with the requested clearance exists.
    #[error("No lift point with clearance {min_radius:.6} in area")]
    LiftPointInfeasible { min_radius: CoordF },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::DegenerateInput`] error.
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Error::DegenerateInput {
            reason: reason.into(),
        }
    }
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;
