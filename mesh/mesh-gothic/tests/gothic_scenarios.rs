//! End-to-end generation scenarios.
//!
//! Run with: cargo test -p mesh-gothic --test gothic_scenarios

use curve_types::{CurvePath, pointed_arch};
use mesh_assembly::{InsertionBoundary, MergeError, MergeOptions, merge};
use mesh_from_curves::{Caps, extrude};
use mesh_gothic::{
    ArchParams, DivineButtressParams, FlyingButtressParams, GargoyleParams, GenerateError,
    SpireParams, Structure, StructureKind, WallParams, WindowHead, WindowParams, arch_outline,
    build_window_wall, generate_arch, generate_divine_buttress, generate_flying_buttress,
    generate_gargoyles, generate_spire, generate_window, wall_with_opening, window_outline,
};
use mesh_repair::{RepairOptions, classify, repair};
use mesh_types::{InsetFace, MeshGraph};
use nalgebra::Vector3;

// =============================================================================
// Helpers
// =============================================================================

fn opening_area(outline: &CurvePath) -> f64 {
    let p = outline.points();
    let n = p.len();
    (0..n)
        .map(|i| p[i].x * p[(i + 1) % n].z - p[(i + 1) % n].x * p[i].z)
        .sum::<f64>()
        .abs()
        / 2.0
}

/// A wall block whose front face is the closed intrados of a 2 x 1 arch,
/// with that face inset by a quarter.
fn inset_arch_block(segments: usize) -> (MeshGraph, InsetFace) {
    let intrados = pointed_arch(2.0, 1.0, segments).unwrap();
    let face = CurvePath::closed(intrados.into_points()).unwrap();
    let mut block = extrude(&face, Vector3::y() * 0.5, Caps::BOTH).unwrap();
    let front = block.face_count() - 1;
    let inset = block.inset_face(front, 0.25).unwrap();
    (block, inset)
}

fn assert_closed_and_clean(structure: &Structure) {
    let mut mesh = structure.mesh.clone();
    assert!(mesh.adjacency().is_watertight(), "{structure}");
    let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
    assert!(!report.had_changes(), "{structure}: {report}");
}

// =============================================================================
// Arch and window wall
// =============================================================================

#[test]
fn arch_outline_has_both_curves() {
    let outline = arch_outline(&ArchParams::default()).unwrap();
    assert_eq!(outline.len(), 2 * 8);
    assert!(outline.is_closed());

    // Intrados springs from the span, extrados from span plus both bands
    let points = outline.points();
    assert!((points[0].x + 1.0).abs() < 1e-12);
    assert!((points[15].x + 1.25).abs() < 1e-12);
}

#[test]
fn eight_vertex_window_fills_matching_opening() {
    let window = WindowParams::default().with_start_fraction(0.0);
    assert_eq!(window_outline(&window).unwrap().len(), 8);

    let (wall, report) =
        build_window_wall(&WallParams::default(), &window, &MergeOptions::default()).unwrap();
    assert_eq!(wall.kind, StructureKind::WindowWall);
    assert_eq!(report.weld.boundary_vertices, 8);
    assert!(classify(&wall.mesh).unwrap().is_printable());
}

#[test]
fn six_vertex_opening_rejects_eight_vertex_window() {
    let arch = pointed_arch(1.0, 1.5, 6).unwrap();
    let outline = CurvePath::closed(arch.translated(Vector3::z() * 1.0).into_points()).unwrap();
    let mut wall = wall_with_opening(&WallParams::default(), &outline).unwrap();
    let before = wall.mesh.clone();

    let recess = generate_window(&WindowParams::default().with_start_fraction(0.0)).unwrap();
    let err = merge(
        &mut wall.mesh,
        &recess.mesh,
        &InsertionBoundary::Face(wall.opening_face),
        &MergeOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        MergeError::BoundaryMismatch {
            expected: 6,
            actual: 8
        }
    ));
    let wrapped = GenerateError::from(err);
    assert!(wrapped.to_string().contains("6 vertices"));

    // Target untouched by the failed merge
    assert_eq!(wall.mesh.faces(), before.faces());
    assert_eq!(wall.mesh.vertex_count(), before.vertex_count());
}

#[test]
fn two_by_one_arch_merges_onto_matching_inset_loop() {
    let params = ArchParams::new(2.0, 1.0).unwrap().with_segments(8);
    let outline = arch_outline(&params).unwrap();
    assert_eq!(outline.len(), 2 * 8);
    let intrados = &outline.points()[..8];
    let top = intrados.iter().map(|p| p.z).fold(f64::MIN, f64::max);
    assert!((top - 1.0).abs() < 1e-12);

    let (mut block, inset) = inset_arch_block(8);
    assert_eq!(inset.inner_loop.len(), 8);
    let front_area = opening_area(&CurvePath::closed(intrados.to_vec()).unwrap());

    // Open-backed arch recess built on the inner loop, projecting forward
    let inner: Vec<_> = inset
        .inner_loop
        .iter()
        .map(|&v| block.position(v).unwrap())
        .collect();
    let recess = extrude(
        &CurvePath::closed(inner).unwrap(),
        Vector3::y() * 0.4,
        Caps::END,
    )
    .unwrap();

    let report = merge(
        &mut block,
        &recess,
        &InsertionBoundary::Face(inset.face),
        &MergeOptions::default(),
    )
    .unwrap();
    assert_eq!(report.weld.boundary_vertices, 8);
    assert!(report.weld.max_snap_distance < 1e-12);
    assert!(classify(&block).unwrap().is_printable());

    let expected = front_area * 0.5 + front_area * 0.75 * 0.75 * 0.4;
    assert!((block.signed_volume() - expected).abs() < 1e-9);

    // The same recess cannot enter a six-sided opening
    let (mut narrow, six) = inset_arch_block(6);
    let before = narrow.clone();
    let err = merge(
        &mut narrow,
        &recess,
        &InsertionBoundary::Face(six.face),
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MergeError::BoundaryMismatch {
            expected: 6,
            actual: 8
        }
    ));
    assert_eq!(narrow.faces(), before.faces());
}

#[test]
fn window_walls_remove_exactly_the_recess() {
    let wall = WallParams::default();
    let windows = [
        WindowParams::default(),
        WindowParams::default().with_start_fraction(0.0),
        WindowParams::default().with_segments(12),
        WindowParams::default().with_head(WindowHead::Lancet { curvature: 0.0 }),
        WindowParams::default()
            .with_head(WindowHead::Lancet { curvature: 1.0 })
            .with_segments(7)
            .with_depth(0.2),
    ];

    for window in windows {
        let (built, report) = build_window_wall(&wall, &window, &MergeOptions::default()).unwrap();
        assert!(!report.weld.flipped, "{window:?}");
        assert!(classify(&built.mesh).unwrap().is_printable(), "{window:?}");

        let area = opening_area(&window_outline(&window).unwrap());
        let solid = wall.width * wall.height * wall.thickness;
        let volume = built.mesh.signed_volume();
        assert!(
            (volume - (solid - area * window.depth)).abs() < 1e-9,
            "{window:?}: volume {volume}"
        );
    }
}

// =============================================================================
// Closed structures
// =============================================================================

#[test]
fn closed_structures_need_no_repair() {
    assert_closed_and_clean(&generate_arch(&ArchParams::default()).unwrap());
    assert_closed_and_clean(&generate_flying_buttress(&FlyingButtressParams::default()).unwrap());
    assert_closed_and_clean(&generate_divine_buttress(&DivineButtressParams::default()).unwrap());
    assert_closed_and_clean(&generate_gargoyles(&GargoyleParams::default()).unwrap());
    assert_closed_and_clean(&generate_spire(&SpireParams::default().with_apex_loop(0.3)).unwrap());
}

#[test]
fn arch_volume_is_band_area_times_thickness() {
    let params = ArchParams::new(3.0, 2.5).unwrap().with_thickness(0.4);
    let arch = generate_arch(&params).unwrap();
    let band = opening_area(&arch_outline(&params).unwrap());
    assert!((arch.mesh.signed_volume() - band * 0.4).abs() < 1e-9);
}
