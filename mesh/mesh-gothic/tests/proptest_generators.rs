//! Property-based tests for the generators.
//!
//! Run with: cargo test -p mesh-gothic --test proptest_generators

use mesh_gothic::{
    ArchParams, SpireParams, TraceryParams, arch_outline, generate_arch, generate_spire,
    generate_tracery,
};
use proptest::prelude::*;

fn band_area(params: &ArchParams) -> f64 {
    let outline = arch_outline(params).unwrap();
    let p = outline.points();
    let n = p.len();
    (0..n)
        .map(|i| p[i].x * p[(i + 1) % n].z - p[(i + 1) % n].x * p[i].z)
        .sum::<f64>()
        .abs()
        / 2.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arch_ring_is_a_prism(
        span in 0.5f64..5.0,
        rise in 0.3f64..4.0,
        band in 0.05f64..0.5,
        thickness in 0.1f64..1.0,
        segments in 3usize..16,
    ) {
        let params = ArchParams::new(span, rise)
            .unwrap()
            .with_band_width(band)
            .with_thickness(thickness)
            .with_segments(segments);
        let arch = generate_arch(&params).unwrap();
        let mesh = &arch.mesh;

        prop_assert_eq!(mesh.vertex_count(), 4 * segments);
        prop_assert_eq!(mesh.face_count(), 2 * segments + 2);
        prop_assert!(mesh.adjacency().is_watertight());

        let expected = band_area(&params) * thickness;
        prop_assert!((mesh.signed_volume() - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn spire_body_closes_at_tip(
        sides in 3usize..12,
        tiers in 1usize..7,
        curvature in 0.0f64..=1.0,
        height in 1.0f64..10.0,
    ) {
        let params = SpireParams::new(1.0, height)
            .unwrap()
            .with_sides(sides)
            .with_profile(tiers, curvature);
        let spire = generate_spire(&params).unwrap();
        let mesh = &spire.mesh;

        prop_assert_eq!(mesh.vertex_count(), sides * tiers + 1);
        prop_assert!(mesh.adjacency().is_watertight());
        prop_assert!(mesh.signed_volume() > 0.0);
        prop_assert!((mesh.bounds().max.z - height).abs() < 1e-12);
    }

    #[test]
    fn tracery_stays_inside_its_ring(
        radius in 0.5f64..3.0,
        repeat in 3usize..10,
        segments in 6usize..32,
        width_fraction in 0.01f64..0.1,
    ) {
        let params = TraceryParams {
            radius,
            repeat,
            segments,
            line_width: radius * width_fraction,
            ..TraceryParams::default()
        };
        prop_assume!(params.validate().is_ok());

        let tracery = generate_tracery(&params).unwrap();
        prop_assert_eq!(tracery.element_count(), repeat + 1);
        prop_assert!(tracery.mesh.adjacency().is_watertight());

        let bounds = tracery.mesh.bounds();
        let reach = radius + params.line_width / 2.0 + 1e-9;
        prop_assert!(bounds.max.x <= reach && bounds.min.x >= -reach);
        prop_assert!(bounds.max.z <= reach && bounds.min.z >= -reach);
    }
}
