//! Paving Integration Tests
//!
//! End-to-end runs from raw segments to placed bits and lift points.

use approx::assert_abs_diff_eq;
use bitpaver::boundary::{loops_from_shape, ordered_loops, section_from};
use bitpaver::fitting::{covers, covers_axially};
use bitpaver::geometry::{Point, Ring, Segment};
use bitpaver::lift::{bit_lift_point, has_clearance};
use bitpaver::{lift_point, Area, BorderPaver, Error, NormalCase, PaverConfig, Shape};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn square_segments(min: f64, max: f64) -> Vec<(Point, Point)> {
    let p = [
        Point::new(min, min),
        Point::new(max, min),
        Point::new(max, max),
        Point::new(min, max),
    ];
    (0..4).map(|i| (p[i], p[(i + 1) % 4])).collect()
}

/// Square of side 100 with a start point at a corner and a target length of
/// 40: the section is the corner and the point 40 along the first edge.
#[test]
fn test_square_section_from_corner() {
    init_logger();
    let mut shape = Shape::from_segments(square_segments(0.0, 100.0)).unwrap();
    shape.optimize().unwrap();

    let loops = loops_from_shape(&shape);
    assert_eq!(loops.len(), 1);
    let l = &loops[0];
    assert_eq!(l[0], Point::new(100.0, 0.0));

    let section = section_from(l, l[0], 40.0).unwrap();
    assert_eq!(section.len(), 2);
    assert_eq!(section.points()[0], Point::new(100.0, 0.0));
    assert_abs_diff_eq!(section.points()[1].x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(section.points()[1].y, 40.0, epsilon = 1e-6);
}

#[test]
fn test_section_length_is_bounded_by_loop() {
    let l = Ring::rectangle(Point::new(0.0, 0.0), Point::new(30.0, 20.0)).closed_points();
    for target in [5.0, 25.0, 35.0, 500.0] {
        let section = section_from(&l, Point::new(10.0, 0.0), target).unwrap();
        let reach = section.start_point().distance(&section.last_point());
        if section.is_closed() {
            assert_abs_diff_eq!(reach, 0.0);
        } else {
            assert_abs_diff_eq!(reach, target, epsilon = 1e-6);
        }
    }
}

/// A centroid lift point on a rectangle whose short side is more than twice
/// the radius.
#[test]
fn test_rectangle_centroid_lift_point() {
    let area = Area::from_rings(&[Ring::rectangle(Point::new(0.0, 0.0), Point::new(50.0, 20.0))]);
    let p = lift_point(&area, 9.0).unwrap();
    assert_abs_diff_eq!(p.x, 25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.y, 10.0, epsilon = 1e-9);
}

#[test]
fn test_ordered_loops_of_raw_segments() {
    let mut raw: Vec<Segment> = square_segments(0.0, 10.0)
        .into_iter()
        .chain(square_segments(3.0, 6.0))
        .map(|(a, b)| Segment::new(a, b))
        .collect();
    raw.reverse();
    let loops = ordered_loops(&raw);
    assert_eq!(loops.len(), 2);
    for l in &loops {
        assert_eq!(l.first(), l.last());
        let max_x = l.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert_eq!(l[0].x, max_x);
    }
}

#[test]
fn test_pave_square() {
    init_logger();
    let mut shape = Shape::from_segments(square_segments(0.0, 100.0)).unwrap();
    shape.optimize().unwrap();
    let paver = BorderPaver::new(PaverConfig::new()).unwrap();

    let placements = paver.pave_shape(&shape).unwrap();
    assert!(placements.len() >= 2);
    assert!(placements.len() < paver.config().max_bits_per_loop);
    for placement in &placements {
        assert_eq!(placement.bit.width(), 24.0);
        assert!(placement.bit.length() > paver.config().margin_to_keep);
        assert!(covers_axially(&placement.bit, &placement.section_covered));
    }
}

/// Bits realigned on another hull edge stay square to their own axis, so
/// the section behind the bit start is not left uncovered.
#[test]
fn test_realigned_bits_cover_their_section_along_the_axis() {
    init_logger();
    let square = Ring::rectangle(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
    let area = Area::from_rings(&[square.clone()]);
    let placements = BorderPaver::default()
        .pave_loop(&square.closed_points(), &area)
        .unwrap();

    assert!(placements.iter().any(|p| p.case == NormalCase::Realigned));
    for placement in &placements {
        let axis = placement.bit.orientation();
        let center = placement.bit.center();
        let half_length = placement.bit.length() / 2.0;
        for p in placement.section_covered.points() {
            let along = p.projection_along(&center, &axis);
            assert!(
                along.abs() <= half_length + 1e-6,
                "{:?} bit leaves {p} at {along:.4} outside +/-{half_length:.4}",
                placement.case
            );
        }
    }
}

#[test]
fn test_pave_annulus() {
    init_logger();
    let mut segments = square_segments(0.0, 200.0);
    segments.extend(square_segments(60.0, 140.0));
    let mut shape = Shape::from_segments(segments).unwrap();
    shape.optimize().unwrap();

    let area = Area::from_shape(&shape);
    assert_eq!(area.surfaces().len(), 1);
    assert_abs_diff_eq!(area.net_area(), 200.0 * 200.0 - 80.0 * 80.0, epsilon = 1e-6);

    let paver = BorderPaver::default();
    let loops = loops_from_shape(&shape);
    assert_eq!(loops.len(), 2);
    for l in &loops {
        let placements = paver.pave_loop(l, &area).unwrap();
        assert!(!placements.is_empty());
        assert_eq!(placements[0].section_covered.start_point(), l[0]);
    }
}

#[test]
fn test_straight_sections_are_covered() {
    let strip = Ring::rectangle(Point::new(0.0, 0.0), Point::new(500.0, 10.0));
    let area = Area::from_rings(&[strip.clone()]);
    let placements = BorderPaver::default()
        .pave_loop(&strip.closed_points(), &area)
        .unwrap();
    // The first bits run along the bottom edge.
    for placement in placements.iter().take(3) {
        assert!(covers(&placement.bit, &placement.section_covered));
        assert_abs_diff_eq!(placement.bit.orientation().y, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_bit_lift_points_have_clearance() {
    let ring = Ring::rectangle(Point::new(0.0, 0.0), Point::new(300.0, 40.0));
    let area = Area::from_rings(&[ring.clone()]);
    let paver = BorderPaver::default();
    let min_radius = paver.config().lift_min_radius();

    let placements = paver.pave_loop(&ring.closed_points(), &area).unwrap();
    let first = &placements[0];
    let footprint = first.bit.material_footprint(&area);
    let p = bit_lift_point(&first.bit, &area, min_radius).unwrap();
    assert!(has_clearance(&footprint, &p, min_radius));
}

#[test]
fn test_open_shape_is_not_manifold() {
    let mut segments = square_segments(0.0, 10.0);
    segments.truncate(3);
    let mut shape = Shape::from_segments(segments).unwrap();
    match shape.optimize() {
        Err(Error::NotManifold { start, .. }) => assert!(start.is_finite()),
        other => panic!("expected NotManifold, got {other:?}"),
    }
}
