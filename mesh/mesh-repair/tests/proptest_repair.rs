//! Property-based tests for classification and repair.
//!
//! Run with: cargo test -p mesh-repair --test proptest_repair

use std::f64::consts::PI;

use mesh_repair::holes::{FillMethod, triangulate_loop, walk_boundaries};
use mesh_repair::{
    EdgeClass, RepairOptions, classify, collapse_duplicate_groups, find_duplicate_groups, repair,
};
use mesh_types::{MeshGraph, Point3};
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

const CUBE_CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

const CUBE_QUADS: [[u32; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// A cube in which the chosen (face, corner) references point at fresh
/// copies of their vertex instead of the shared one.
fn split_cube(splits: &[(usize, usize)]) -> MeshGraph {
    let mut points: Vec<Point3<f64>> = CUBE_CORNERS
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    let mut quads: Vec<Vec<u32>> = CUBE_QUADS.iter().map(|q| q.to_vec()).collect();
    for &(face, corner) in splits {
        let original = quads[face][corner] as usize;
        points.push(points[original]);
        quads[face][corner] = (points.len() - 1) as u32;
    }
    MeshGraph::from_polygons(&points, quads).unwrap()
}

/// A star polygon: radii alternate when `spiky`, making it concave.
fn star(n: usize, radius: f64, spiky: bool) -> MeshGraph {
    let points: Vec<Point3<f64>> = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            let r = if spiky && i % 2 == 1 { radius * 0.4 } else { radius };
            Point3::new(r * angle.cos(), r * angle.sin(), 0.0)
        })
        .collect();
    MeshGraph::from_polygons(&points, vec![(0..n as u32).collect::<Vec<_>>()]).unwrap()
}

fn arb_splits() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::hash_set((0..6usize, 0..4usize), 0..12)
        .prop_map(|set| set.into_iter().collect())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn collapse_removes_exactly_the_redundant_vertices(splits in arb_splits()) {
        let mut mesh = split_cube(&splits);
        prop_assert_eq!(mesh.vertex_count(), 8 + splits.len());

        let groups = find_duplicate_groups(&mesh, 1e-6);
        let redundant: usize = groups.iter().map(|g| g.members.len() - 1).sum();
        prop_assert_eq!(redundant, splits.len());

        let before = mesh.vertex_count();
        collapse_duplicate_groups(&mut mesh, &groups).unwrap();
        prop_assert_eq!(mesh.vertex_count(), before - redundant);
        prop_assert!(mesh.adjacency().is_watertight());
    }

    #[test]
    fn repair_of_split_cube_is_printable(splits in arb_splits()) {
        let mut mesh = split_cube(&splits);
        repair(&mut mesh, &RepairOptions::default()).unwrap();
        prop_assert_eq!(mesh.vertex_count(), 8);
        prop_assert!(classify(&mesh).unwrap().is_printable());
        prop_assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hole_fill_adds_l_minus_two_triangles(n in 3usize..48, radius in 0.1f64..50.0, spiky in any::<bool>()) {
        let n = if spiky && n % 2 == 1 { n + 1 } else { n };
        let mesh = star(n, radius, spiky && n >= 6);
        let walk = walk_boundaries(&mesh, 1000).unwrap();
        prop_assert_eq!(walk.loops.len(), 1);
        let fill = triangulate_loop(&mesh, &walk.loops[0]).unwrap();
        prop_assert_eq!(fill.triangles.len(), n - 2);
        if !(spiky && n >= 6) {
            prop_assert_eq!(fill.method, FillMethod::Fan);
        }
    }

    #[test]
    fn repair_restores_any_flipped_subset(flips in prop::collection::vec(any::<bool>(), 6)) {
        let mut mesh = split_cube(&[]);
        for (face, &flip) in flips.iter().enumerate() {
            if flip {
                mesh.flip_face(face).unwrap();
            }
        }
        repair(&mut mesh, &RepairOptions::default()).unwrap();
        prop_assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);

        let second = repair(&mut mesh, &RepairOptions::default()).unwrap();
        prop_assert_eq!(second.fix_count(), 0);
    }

    #[test]
    fn edge_classes_partition_the_edges(removed in prop::collection::hash_set(0..6usize, 0..4)) {
        let mut mesh = split_cube(&[]);
        let mut removed: Vec<usize> = removed.into_iter().collect();
        removed.sort_unstable();
        mesh.remove_faces(&removed).unwrap();
        let report = classify(&mesh).unwrap();
        let total = report.count(EdgeClass::Manifold)
            + report.count(EdgeClass::Boundary)
            + report.count(EdgeClass::NonManifold)
            + report.count(EdgeClass::Isolated);
        prop_assert_eq!(total, report.edges.len());
        prop_assert_eq!(report.edges.len(), mesh.adjacency().edge_count());
    }
}
