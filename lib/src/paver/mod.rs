//! Border paving: walking every loop of a slice and placing bits along it.

use crate::area::Area;
use crate::boundary::{exit_point, loops_from_shape, section_from};
use crate::config::PaverConfig;
use crate::fitting::{BitFitter, Placement};
use crate::geometry::tolerance::EPSILON;
use crate::geometry::Point;
use crate::lift::lift_point_with_step;
use crate::shape::Shape;
use crate::{Error, Result};
use rayon::prelude::*;

/// Places bits around slice boundaries.
#[derive(Clone, Debug, Default)]
pub struct BorderPaver {
    fitter: BitFitter,
}

impl BorderPaver {
    /// Create a paver after validating `config`.
    pub fn new(config: PaverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fitter: BitFitter::new(config),
        })
    }

    #[inline]
    pub fn config(&self) -> &PaverConfig {
        self.fitter.config()
    }

    #[inline]
    pub fn fitter(&self) -> &BitFitter {
        &self.fitter
    }

    /// Place bits one after the other along a loop, starting at its first point.
    ///
    /// Each bit covers a section of `bit_length` cut from the current start
    /// point. The next start is where the loop leaves the bit, or the end of
    /// the covered section when that exit is not further along. Paving stops
    /// once a later section covers the loop's first point, a section covers
    /// every loop point, the whole loop length has been walked, or
    /// `max_bits_per_loop` bits are placed.
    pub fn pave_loop(&self, points: &[Point], area: &Area) -> Result<Vec<Placement>> {
        let Some(&first) = points.first() else {
            return Err(Error::degenerate("cannot pave an empty loop"));
        };
        let config = self.config();
        let perimeter: f64 = points.windows(2).map(|w| w[0].distance(&w[1])).sum();

        let mut placements: Vec<Placement> = Vec::new();
        let mut start = first;
        let mut travelled = 0.0;
        loop {
            let section = section_from(points, start, config.bit_length)?;
            let mut placement = self.fitter.place(&section, area, config.margin_to_keep)?;

            let covered = &placement.section_covered;
            let mut advance = covered.length();
            match exit_point(&placement.bit, points, start)? {
                Some(exit) if exit.distance_along + EPSILON >= advance => {
                    placement.next_start_point = exit.point;
                    advance = exit.distance_along;
                }
                _ => {}
            }
            travelled += advance;

            let wrapped = !placements.is_empty() && covered.contains_point(&first);
            let done = wrapped || covered.contains_all(points) || travelled + EPSILON >= perimeter;
            let stalled = placement.next_start_point.approx_eq(&start);
            log::debug!(
                "Bit {} at {} ({:?}), next start {}",
                placements.len(),
                placement.bit.center(),
                placement.case,
                placement.next_start_point
            );
            start = placement.next_start_point;
            placements.push(placement);

            if done {
                break;
            }
            if stalled {
                log::warn!("Paving stalled at {start} after {} bits", placements.len());
                break;
            }
            if placements.len() >= config.max_bits_per_loop {
                log::warn!(
                    "Stopped after {} bits with {:.3} of {:.3} walked",
                    placements.len(),
                    travelled,
                    perimeter
                );
                break;
            }
        }
        Ok(placements)
    }

    /// Pave every loop of an optimized shape.
    ///
    /// # Errors
    /// [`Error::DegenerateInput`] if the shape has segments but no polygons,
    /// i.e. [`Shape::optimize`] has not run.
    pub fn pave_shape(&self, shape: &Shape) -> Result<Vec<Placement>> {
        if shape.polygons().is_empty() && !shape.segment_ids().is_empty() {
            return Err(Error::degenerate("shape must be optimized before paving"));
        }
        let area = Area::from_shape(shape);
        let mut placements = Vec::new();
        for (index, points) in loops_from_shape(shape).iter().enumerate() {
            let bits = self.pave_loop(points, &area)?;
            log::debug!("Loop {index}: {} bits", bits.len());
            placements.extend(bits);
        }
        Ok(placements)
    }

    /// Pickup point inside the material under a placed bit.
    ///
    /// Uses the configured sucker radius and grid step; `None` when the
    /// footprint has no point with enough clearance.
    pub fn lift_point(&self, placement: &Placement, area: &Area) -> Option<Point> {
        let config = self.config();
        lift_point_with_step(
            &placement.bit.material_footprint(area),
            config.lift_min_radius(),
            config.lift_grid_step,
        )
    }

    /// Pave independent slices in parallel.
    ///
    /// The result keeps the slice order. The first failing slice's error is
    /// returned.
    pub fn pave_slices(&self, shapes: &[Shape]) -> Result<Vec<Vec<Placement>>> {
        shapes.par_iter().map(|shape| self.pave_shape(shape)).collect()
    }
}
