//! Property-based tests for fragment merging.
//!
//! Run with: cargo test -p mesh-assembly --test proptest_merge

use std::f64::consts::PI;

use curve_types::circle;
use mesh_assembly::{InsertionBoundary, MergeOptions, merge};
use mesh_from_curves::{Caps, extrude};
use mesh_repair::classify;
use mesh_types::{Isometry3, MeshGraph, Point3, Vector3};
use proptest::prelude::*;

fn prism(sides: usize, radius: f64, base: f64, height: f64, caps: Caps) -> MeshGraph {
    let ring = circle(Point3::new(0.0, 0.0, base), radius, Vector3::z(), sides).unwrap();
    extrude(&ring, Vector3::z() * height, caps).unwrap()
}

fn polygon_area(sides: usize, radius: f64) -> f64 {
    0.5 * sides as f64 * radius * radius * (2.0 * PI / sides as f64).sin()
}

proptest! {
    #[test]
    fn stacked_prisms_merge_watertight(
        sides in 3usize..12,
        radius in 0.2..3.0f64,
        lower in 0.2..2.0f64,
        upper in 0.2..2.0f64,
        inverted in any::<bool>(),
    ) {
        let mut host = prism(sides, radius, 0.0, lower, Caps::BOTH);
        let top = host.face_count() - 1;
        let mut fragment = prism(sides, radius, lower, upper, Caps::END);
        if inverted {
            fragment.flip_all();
        }

        let report = merge(
            &mut host,
            &fragment,
            &InsertionBoundary::Face(top),
            &MergeOptions::default(),
        )
        .unwrap();

        prop_assert_eq!(report.weld.flipped, inverted);
        prop_assert_eq!(host.face_count(), 2 * sides + 2);
        prop_assert!(classify(&host).unwrap().is_printable());
        let expected = polygon_area(sides, radius) * (lower + upper);
        prop_assert!((host.signed_volume() - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn loop_pairing_ignores_where_the_fragment_loop_starts(
        sides in 3usize..12,
        shift in 0usize..12,
        reversed in any::<bool>(),
        height in 0.2..2.0f64,
    ) {
        // Same ring, renumbered so its first vertex sits `shift` corners on
        let turn = Isometry3::rotation(Vector3::z() * (2.0 * PI * (shift % sides) as f64 / sides as f64));
        let mut ring = circle(Point3::new(0.0, 0.0, 1.0), 1.0, Vector3::z(), sides)
            .unwrap()
            .transformed(&turn);
        if reversed {
            ring = ring.reversed();
        }
        let drum = extrude(&ring, Vector3::z() * height, Caps::END).unwrap();

        let mut host = prism(sides, 1.0, 0.0, 1.0, Caps::BOTH);
        let top = host.face_count() - 1;
        let report = merge(
            &mut host,
            &drum,
            &InsertionBoundary::Face(top),
            &MergeOptions::default(),
        )
        .unwrap();

        prop_assert_eq!(report.weld.boundary_vertices, sides);
        prop_assert!(report.weld.max_snap_distance < 1e-9);
        prop_assert!(!report.weld.flipped);
        prop_assert!(classify(&host).unwrap().is_printable());
        let expected = polygon_area(sides, 1.0) * (1.0 + height);
        prop_assert!((host.signed_volume() - expected).abs() < 1e-9 * expected.max(1.0));
    }
}
