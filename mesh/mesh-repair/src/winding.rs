//! Winding consistency and outward orientation.
//!
//! Faces are grouped into regions connected through edges with exactly two
//! faces. Within a region each face is compared with its neighbours: two
//! faces sharing an edge agree when they traverse it in opposite
//! directions. The minority orientation of each region is reported as
//! flipped.

use std::collections::VecDeque;

use mesh_types::MeshGraph;
use tracing::{debug, info};

use crate::RepairResult;

/// Orientation of every face relative to its region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrientationAnalysis {
    /// Face indices per region, each sorted ascending. Regions are ordered
    /// by their lowest face.
    pub regions: Vec<Vec<usize>>,
    /// `flipped[f]` is true when face `f` disagrees with its region's
    /// majority.
    pub flipped: Vec<bool>,
}

impl OrientationAnalysis {
    /// Indices of the flipped faces, ascending.
    #[must_use]
    pub fn flipped_faces(&self) -> Vec<usize> {
        self.flipped
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }
}

/// Propagate orientation across every region of the mesh.
///
/// Each region is seeded from its lowest face. When a region splits evenly
/// the seed's side wins.
#[must_use]
pub fn analyze_orientation(mesh: &MeshGraph) -> OrientationAnalysis {
    let face_count = mesh.face_count();
    let faces = mesh.faces();
    let mut orientation: Vec<Option<bool>> = vec![None; face_count];
    let mut flipped = vec![false; face_count];
    let mut regions = Vec::new();

    for seed in 0..face_count {
        if orientation[seed].is_some() {
            continue;
        }
        orientation[seed] = Some(true);
        let mut region = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(f) = queue.pop_front() {
            let o_f = orientation[f].unwrap_or(true);
            for (a, b) in faces[f].directed_edges() {
                let shared = mesh.faces_on_edge(a, b);
                if shared.len() != 2 {
                    continue;
                }
                let g = if shared[0] == f { shared[1] } else { shared[0] };
                if g == f || orientation[g].is_some() {
                    continue;
                }
                let dir_g = faces[g].traverses(a, b).unwrap_or(false);
                orientation[g] = Some(dir_g != o_f);
                region.push(g);
                queue.push_back(g);
            }
        }

        let agreeing = region
            .iter()
            .filter(|&&f| orientation[f] == Some(true))
            .count();
        let minority = agreeing * 2 < region.len();
        for &f in &region {
            flipped[f] = orientation[f] == Some(minority);
        }
        region.sort_unstable();
        regions.push(region);
    }

    OrientationAnalysis { regions, flipped }
}

/// Faces whose winding disagrees with the majority of their region.
#[must_use]
pub fn find_flipped_faces(mesh: &MeshGraph) -> Vec<usize> {
    analyze_orientation(mesh).flipped_faces()
}

/// Count faces that disagree with their region's majority.
#[must_use]
pub fn count_inconsistent_faces(mesh: &MeshGraph) -> usize {
    analyze_orientation(mesh)
        .flipped
        .iter()
        .filter(|&&f| f)
        .count()
}

/// Reverse the winding of the given faces.
///
/// Returns the number of faces flipped.
///
/// # Errors
///
/// Returns an error for an out-of-range face index; faces before it in the
/// list have already been flipped.
pub fn flip_faces(mesh: &mut MeshGraph, faces: &[usize]) -> RepairResult<usize> {
    for &f in faces {
        mesh.flip_face(f)?;
    }
    if !faces.is_empty() {
        debug!("Flipped {} faces", faces.len());
    }
    Ok(faces.len())
}

/// Flip every face that disagrees with its region.
///
/// Returns the number of faces flipped.
///
/// # Errors
///
/// Propagates mesh errors from [`flip_faces`].
pub fn fix_winding_order(mesh: &mut MeshGraph) -> RepairResult<usize> {
    let flipped = find_flipped_faces(mesh);
    flip_faces(mesh, &flipped)
}

/// Turn closed, consistently wound regions with negative volume inside out.
///
/// A region is closed when every edge of every face in it has exactly two
/// faces. Open regions have no inside and are left alone.
///
/// Returns the number of regions reversed.
///
/// # Errors
///
/// Propagates mesh errors from face flipping.
pub fn orient_outward(mesh: &mut MeshGraph) -> RepairResult<usize> {
    let analysis = analyze_orientation(mesh);
    let mut to_flip = Vec::new();
    let mut reversed = 0;

    for region in &analysis.regions {
        if region.iter().any(|&f| analysis.flipped[f]) {
            continue;
        }
        let closed = region.iter().all(|&f| {
            mesh.faces()[f]
                .directed_edges()
                .all(|(a, b)| mesh.faces_on_edge(a, b).len() == 2)
        });
        if !closed {
            continue;
        }
        let volume = mesh.signed_volume_of(region);
        let scale = mesh.bounds().size().norm().powi(3);
        if volume < -1e-12 * scale.max(1.0) {
            to_flip.extend_from_slice(region);
            reversed += 1;
        }
    }

    flip_faces(mesh, &to_flip)?;
    if reversed > 0 {
        info!("Reversed {} inside-out regions", reversed);
    }
    Ok(reversed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, Vector3};

    #[test]
    fn test_consistent_cube() {
        let analysis = analyze_orientation(&unit_cube());
        assert_eq!(analysis.regions, vec![vec![0, 1, 2, 3, 4, 5]]);
        assert!(analysis.flipped_faces().is_empty());
    }

    #[test]
    fn test_single_flipped_face() {
        for face in 0..6 {
            let mut mesh = unit_cube();
            mesh.flip_face(face).unwrap();
            assert_eq!(find_flipped_faces(&mesh), vec![face], "flipped face {face}");
        }
    }

    #[test]
    fn test_fix_winding_restores_volume() {
        let mut mesh = unit_cube();
        mesh.flip_face(3).unwrap();
        assert_eq!(fix_winding_order(&mut mesh).unwrap(), 1);
        assert_eq!(count_inconsistent_faces(&mesh), 0);
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tie_keeps_seed_side() {
        // Two triangles sharing an edge with the same direction
        let mesh = MeshGraph::from_polygons(
            &[
                mesh_types::Point3::new(0.0, 0.0, 0.0),
                mesh_types::Point3::new(1.0, 0.0, 0.0),
                mesh_types::Point3::new(0.0, 1.0, 0.0),
                mesh_types::Point3::new(1.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![1, 2, 3]],
        )
        .unwrap();
        assert_eq!(find_flipped_faces(&mesh), vec![1]);
    }

    #[test]
    fn test_orient_outward_reverses_inside_out_cube() {
        let mut mesh = unit_cube();
        mesh.flip_all();
        assert!(mesh.signed_volume() < 0.0);
        assert_eq!(orient_outward(&mut mesh).unwrap(), 1);
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orient_outward_per_region() {
        let mut mesh = unit_cube();
        let mut inverted = unit_cube();
        inverted.flip_all();
        inverted.translate(Vector3::new(3.0, 0.0, 0.0));
        mesh.append(&inverted);
        assert_eq!(orient_outward(&mut mesh).unwrap(), 1);
        assert_relative_eq!(mesh.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orient_outward_skips_open_regions() {
        let mut mesh = unit_cube();
        mesh.flip_all();
        mesh.remove_face(0).unwrap();
        assert_eq!(orient_outward(&mut mesh).unwrap(), 0);
    }
}
