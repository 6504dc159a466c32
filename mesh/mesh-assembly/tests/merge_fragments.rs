//! Merging swept and extruded fragments onto host meshes.
//!
//! Run with: cargo test -p mesh-assembly --test merge_fragments

use std::f64::consts::PI;

use approx::assert_relative_eq;
use curve_types::{CurvePath, circle};
use mesh_assembly::{InsertionBoundary, MergeError, MergeOptions, merge, weld};
use mesh_from_curves::{Caps, extrude};
use mesh_repair::classify;
use mesh_types::{Isometry3, MeshGraph, Point3, Vector3, unit_cube};

// =============================================================================
// Fixtures
// =============================================================================

fn prism(sides: usize, radius: f64, base: f64, height: f64, caps: Caps) -> MeshGraph {
    let ring = circle(Point3::new(0.0, 0.0, base), radius, Vector3::z(), sides).unwrap();
    extrude(&ring, Vector3::z() * height, caps).unwrap()
}

fn polygon_area(sides: usize, radius: f64) -> f64 {
    0.5 * sides as f64 * radius * radius * (2.0 * PI / sides as f64).sin()
}

fn square_at(z: f64, min: f64, max: f64) -> CurvePath {
    CurvePath::closed(vec![
        Point3::new(min, min, z),
        Point3::new(max, min, z),
        Point3::new(max, max, z),
        Point3::new(min, max, z),
    ])
    .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn chimney_on_inset_roof() {
    let mut house = unit_cube();
    let inset = house.inset_face(1, 0.5).unwrap();

    let chimney = extrude(&square_at(1.0, 0.25, 0.75), Vector3::z(), Caps::END).unwrap();
    let report = merge(
        &mut house,
        &chimney,
        &InsertionBoundary::Face(inset.face),
        &MergeOptions::default(),
    )
    .unwrap();

    assert_eq!(report.weld.boundary_vertices, 4);
    assert!(!report.repair.had_changes());
    assert!(classify(&house).unwrap().is_printable());
    assert_relative_eq!(house.signed_volume(), 1.25, epsilon = 1e-12);
}

#[test]
fn inset_loop_accepts_only_matching_fragments() {
    let mut host = prism(6, 1.0, 0.0, 1.0, Caps::BOTH);
    let top = host.face_count() - 1;
    let before = host.clone();

    let square = extrude(&square_at(1.0, -0.5, 0.5), Vector3::z(), Caps::END).unwrap();
    let err = merge(&mut host, &square, &InsertionBoundary::Face(top), &MergeOptions::default())
        .unwrap_err();
    assert!(matches!(err, MergeError::BoundaryMismatch { expected: 6, actual: 4 }));
    assert_eq!(host.faces(), before.faces());
}

#[test]
fn fragment_index_order_is_irrelevant() {
    // Same hexagonal drum, vertices renumbered by a rotation of one sixth
    let turn = Isometry3::rotation(Vector3::z() * (PI / 3.0));
    let ring = circle(Point3::new(0.0, 0.0, 1.0), 1.0, Vector3::z(), 6)
        .unwrap()
        .transformed(&turn);
    let drum = extrude(&ring, Vector3::z(), Caps::END).unwrap();

    let mut host = prism(6, 1.0, 0.0, 1.0, Caps::BOTH);
    let top = host.face_count() - 1;
    let report = weld(&mut host, &drum, &InsertionBoundary::Face(top)).unwrap();

    assert!(report.max_snap_distance < 1e-9);
    assert!(host.adjacency().is_watertight());
    assert_relative_eq!(host.signed_volume(), 2.0 * polygon_area(6, 1.0), epsilon = 1e-9);
}
