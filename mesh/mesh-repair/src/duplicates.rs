//! Coincident vertex detection and collapse.
//!
//! Vertices closer than the weld tolerance are grouped with a spatial hash
//! and union-find, so chains of near neighbours end up in one group even
//! when the chain's ends are further apart than the tolerance.

use hashbrown::{HashMap, HashSet};
use mesh_types::MeshGraph;
use nalgebra::Point3;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RepairResult;

/// A set of vertices sharing (nearly) the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DuplicateVertexGroup {
    /// The vertex that survives a collapse: the lowest index in the group.
    pub representative: u32,
    /// Every vertex in the group, sorted ascending, representative included.
    pub members: Vec<u32>,
}

impl DuplicateVertexGroup {
    /// Vertices removed by collapsing this group.
    pub fn redundant(&self) -> impl Iterator<Item = u32> + '_ {
        self.members
            .iter()
            .copied()
            .filter(move |&v| v != self.representative)
    }

    /// Number of vertices merged away by collapsing this group.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

/// Outcome of [`collapse_duplicate_groups`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Groups collapsed.
    pub groups: usize,
    /// Vertices merged into a representative and removed.
    pub vertices_merged: usize,
    /// Faces dropped because the merge repeated one of their vertices.
    pub degenerate_faces_removed: usize,
}

/// Find groups of vertices whose positions lie within `epsilon` of each other.
///
/// Distances are compared inclusively, so `epsilon = 0.0` groups exactly
/// coincident vertices. Groups are returned sorted by representative.
///
/// # Example
///
/// ```
/// use mesh_types::{MeshGraph, Point3};
/// use mesh_repair::find_duplicate_groups;
///
/// let mut mesh = MeshGraph::new();
/// mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(Point3::new(1.0 + 1e-9, 0.0, 0.0));
///
/// let groups = find_duplicate_groups(&mesh, 1e-6);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].members, vec![1, 2]);
/// ```
#[must_use]
pub fn find_duplicate_groups(mesh: &MeshGraph, epsilon: f64) -> Vec<DuplicateVertexGroup> {
    let count = mesh.vertex_count();
    if count < 2 {
        return Vec::new();
    }

    let cell_size = if epsilon > 0.0 { epsilon * 2.0 } else { 1.0 };
    let positions: Vec<Point3<f64>> = mesh.vertices().iter().map(|v| v.position).collect();

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, p) in positions.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(p, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut sets = UnionFind::new(count);
    for (idx, p) in positions.iter().enumerate() {
        let cell = pos_to_cell(p, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if (other as usize) <= idx {
                            continue;
                        }
                        if (p - positions[other as usize]).norm() <= epsilon {
                            sets.union(idx, other as usize);
                        }
                    }
                }
            }
        }
    }

    let mut by_root: HashMap<usize, Vec<u32>> = HashMap::new();
    for idx in 0..count {
        by_root.entry(sets.find(idx)).or_default().push(idx as u32);
    }

    let mut groups: Vec<DuplicateVertexGroup> = by_root
        .into_values()
        .filter(|members| members.len() > 1)
        .map(|mut members| {
            members.sort_unstable();
            DuplicateVertexGroup {
                representative: members[0],
                members,
            }
        })
        .collect();
    groups.sort_by_key(|g| g.representative);
    groups
}

/// Collapse every group into its representative.
///
/// Faces that would repeat a vertex after the collapse are removed first.
/// The representative moves to the centroid of its group, every other member
/// is merged into it and then deleted, so the vertex count drops by exactly
/// the sum of `members.len() - 1` over all groups.
///
/// # Errors
///
/// Returns an error if a group names a vertex that does not exist.
pub fn collapse_duplicate_groups(
    mesh: &mut MeshGraph,
    groups: &[DuplicateVertexGroup],
) -> RepairResult<CollapseSummary> {
    let mut remap: HashMap<u32, u32> = HashMap::new();
    for group in groups {
        for v in group.redundant() {
            remap.insert(v, group.representative);
        }
    }
    if remap.is_empty() {
        return Ok(CollapseSummary::default());
    }

    let mut centroids = Vec::with_capacity(groups.len());
    for group in groups {
        let mut sum = nalgebra::Vector3::zeros();
        for &v in &group.members {
            let p = mesh.position(v).ok_or(mesh_types::MeshError::VertexOutOfRange {
                index: v,
                count: mesh.vertex_count(),
            })?;
            sum += p.coords;
        }
        centroids.push(Point3::from(sum / group.members.len() as f64));
    }

    let degenerate_faces_removed = mesh.retain_faces(|_, face| {
        let mut seen = HashSet::with_capacity(face.len());
        face.vertices()
            .iter()
            .all(|v| seen.insert(remap.get(v).copied().unwrap_or(*v)))
    });

    let mut redundant = Vec::with_capacity(remap.len());
    for (group, centroid) in groups.iter().zip(centroids) {
        mesh.set_position(group.representative, centroid)?;
        for v in group.redundant() {
            mesh.merge_vertices(group.representative, v)?;
            redundant.push(v);
        }
    }
    mesh.remove_vertices(&redundant)?;

    debug!(
        "Collapsed {} duplicate groups ({} vertices merged, {} degenerate faces)",
        groups.len(),
        redundant.len(),
        degenerate_faces_removed
    );

    Ok(CollapseSummary {
        groups: groups.len(),
        vertices_merged: redundant.len(),
        degenerate_faces_removed,
    })
}

fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Disjoint sets over `0..n` with path halving.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower root wins so the representative is stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    fn two_cubes_touching_at_corner() -> MeshGraph {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(nalgebra::Vector3::new(1.0, 1.0, 1.0));
        mesh.append(&other);
        mesh
    }

    #[test]
    fn test_no_duplicates_in_cube() {
        assert!(find_duplicate_groups(&unit_cube(), 1e-6).is_empty());
    }

    #[test]
    fn test_corner_duplicate_detected() {
        let mesh = two_cubes_touching_at_corner();
        let groups = find_duplicate_groups(&mesh, 1e-6);
        assert_eq!(groups.len(), 1);
        // Corner (1,1,1) of the first cube and corner (0,0,0) of the second
        assert_eq!(groups[0].members, vec![6, 8]);
        assert_eq!(groups[0].representative, 6);
    }

    #[test]
    fn test_transitive_chain_joins_one_group() {
        let mut mesh = MeshGraph::new();
        for i in 0..4 {
            mesh.add_vertex(Point3::new(f64::from(i) * 0.8e-6, 0.0, 0.0));
        }
        let groups = find_duplicate_groups(&mesh, 1e-6);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_epsilon_matches_exact_only() {
        let mut mesh = MeshGraph::new();
        mesh.add_vertex(Point3::new(0.5, 0.5, 0.5));
        mesh.add_vertex(Point3::new(0.5, 0.5, 0.5));
        mesh.add_vertex(Point3::new(0.5, 0.5, 0.5 + 1e-12));
        let groups = find_duplicate_groups(&mesh, 0.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1]);
    }

    #[test]
    fn test_collapse_reduces_vertex_count() {
        let mut mesh = two_cubes_touching_at_corner();
        let groups = find_duplicate_groups(&mesh, 1e-6);
        let summary = collapse_duplicate_groups(&mut mesh, &groups).unwrap();
        assert_eq!(summary.vertices_merged, 1);
        assert_eq!(summary.degenerate_faces_removed, 0);
        assert_eq!(mesh.vertex_count(), 15);
        assert_eq!(mesh.face_count(), 12);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_collapse_moves_representative_to_centroid() {
        let mut mesh = MeshGraph::from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 1e-7),
            ],
            vec![vec![0, 1, 2], vec![2, 3, 0]],
        )
        .unwrap();
        let groups = find_duplicate_groups(&mesh, 1e-6);
        collapse_duplicate_groups(&mut mesh, &groups).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_relative_eq!(mesh.position(1).unwrap().z, 0.5e-7, epsilon = 1e-15);
        assert_eq!(mesh.faces()[1].vertices(), &[2, 1, 0]);
    }

    #[test]
    fn test_collapse_drops_faces_that_degenerate() {
        let mut mesh = MeshGraph::from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![0, 1, 3]],
        )
        .unwrap();
        let groups = find_duplicate_groups(&mesh, 1e-6);
        let summary = collapse_duplicate_groups(&mut mesh, &groups).unwrap();
        assert_eq!(summary.degenerate_faces_removed, 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_collapse_nothing() {
        let mut mesh = unit_cube();
        let summary = collapse_duplicate_groups(&mut mesh, &[]).unwrap();
        assert_eq!(summary, CollapseSummary::default());
        assert_eq!(mesh.vertex_count(), 8);
    }
}
