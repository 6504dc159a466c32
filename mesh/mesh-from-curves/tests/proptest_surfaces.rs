//! Property-based tests for extrusion, lofting and sweeping.

use curve_types::{CurvePath, Point3, Vector3, circle};
use mesh_from_curves::{Caps, LoftOptions, SweepOptions, extrude, loft, polygon_profile, sweep};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Regular polygon in the XY plane, in either orientation.
fn polygon(sides: usize, radius: f64, clockwise: bool) -> CurvePath {
    let ring = circle(Point3::origin(), radius, Vector3::z(), sides).unwrap();
    if clockwise { ring.reversed() } else { ring }
}

fn offset() -> impl Strategy<Value = Vector3<f64>> {
    (-2.0..2.0f64, -2.0..2.0f64, 0.2..3.0f64, any::<bool>())
        .prop_map(|(x, y, z, down)| Vector3::new(x, y, if down { -z } else { z }))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn extrusion_is_closed_outward_prism(
        sides in 3usize..12,
        radius in 0.1..5.0f64,
        clockwise in any::<bool>(),
        offset in offset(),
    ) {
        let profile = polygon(sides, radius, clockwise);
        let area = profile.newell_normal().norm() / 2.0;
        let mesh = extrude(&profile, offset, Caps::BOTH).unwrap();

        prop_assert_eq!(mesh.face_count(), sides + 2);
        prop_assert!(mesh.adjacency().is_watertight());
        let expected = area * offset.z.abs();
        prop_assert!((mesh.signed_volume() - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn loft_counts_match_sections(
        sides in 3usize..10,
        levels in 2usize..6,
        apex in any::<bool>(),
    ) {
        let sections: Vec<CurvePath> = (0..levels)
            .map(|k| {
                let z = k as f64;
                circle(Point3::new(0.0, 0.0, z), 2.0 - 0.3 * z, Vector3::z(), sides).unwrap()
            })
            .collect();
        let mut options = LoftOptions::default();
        if apex {
            options = options.with_apex(Point3::new(0.0, 0.0, levels as f64));
        }
        let mesh = loft(&sections, &options).unwrap();

        let fan = if apex { sides } else { 1 };
        prop_assert_eq!(mesh.face_count(), sides * (levels - 1) + 1 + fan);
        prop_assert!(mesh.adjacency().is_watertight());
        prop_assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn closed_sweep_has_torus_topology(
        sides in 3usize..8,
        steps in 3usize..24,
    ) {
        let path = circle(Point3::origin(), 3.0, Vector3::y(), steps).unwrap();
        let profile = polygon_profile(0.5, sides).unwrap();
        let mesh = sweep(&profile, &path, &SweepOptions::default()).unwrap();

        let euler = mesh.vertex_count() as i64 - mesh.edge_count() as i64
            + mesh.face_count() as i64;
        prop_assert_eq!(euler, 0);
        prop_assert!(mesh.adjacency().is_watertight());
    }
}
