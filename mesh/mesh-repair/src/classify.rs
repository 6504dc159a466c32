//! Topology classification.
//!
//! Classification never mutates the mesh. It labels every edge, walks the
//! boundary into loops and chains, finds coincident vertices and faces
//! whose winding disagrees with their neighbours, and collects it all into
//! a [`ClassificationReport`].

use hashbrown::HashMap;
use mesh_types::{EdgeKey, MeshGraph};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::duplicates::{DuplicateVertexGroup, find_duplicate_groups};
use crate::holes::{BoundaryLoop, walk_boundaries};
use crate::winding::analyze_orientation;
use crate::RepairResult;

/// Topological class of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeClass {
    /// Two faces traversing it in opposite directions.
    Manifold,
    /// Exactly one face.
    Boundary,
    /// Three or more faces, or two faces traversing it the same way.
    NonManifold,
    /// A loose edge no face uses.
    Isolated,
}

impl std::fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Manifold => "manifold",
            Self::Boundary => "boundary",
            Self::NonManifold => "non-manifold",
            Self::Isolated => "isolated",
        };
        f.write_str(name)
    }
}

/// Options for [`classify_with_options`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifyOptions {
    /// Vertices within this distance count as duplicates.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Boundary walks longer than this fail with
    /// [`RepairError::UnclosedBoundary`](crate::RepairError::UnclosedBoundary).
    ///
    /// Default: `100_000`
    pub max_loop_length: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            max_loop_length: 100_000,
        }
    }
}

impl ClassifyOptions {
    /// Set the duplicate-vertex distance.
    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the boundary walk limit.
    #[must_use]
    pub fn with_max_loop_length(mut self, limit: usize) -> Self {
        self.max_loop_length = limit;
        self
    }
}

/// Everything classification found in a mesh.
#[derive(Debug, Clone, Default)]
pub struct ClassificationReport {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of faces.
    pub face_count: usize,
    /// Every edge with its class, in adjacency order.
    pub edges: Vec<(EdgeKey, EdgeClass)>,
    /// Non-manifold edges, sorted.
    pub non_manifold_edges: Vec<EdgeKey>,
    /// Isolated (face-less loose) edges, sorted.
    pub isolated_edges: Vec<EdgeKey>,
    /// Closed boundary loops.
    pub boundary_loops: Vec<BoundaryLoop>,
    /// Boundary paths that do not close.
    pub open_chains: Vec<Vec<u32>>,
    /// Groups of coincident vertices.
    pub duplicate_groups: Vec<DuplicateVertexGroup>,
    /// Vertices whose faces form more than one fan (bowties).
    pub non_manifold_vertices: Vec<u32>,
    /// `flipped[f]` is true when face `f`'s winding disagrees with its region.
    pub flipped: Vec<bool>,
}

impl ClassificationReport {
    /// Number of edges of a given class.
    #[must_use]
    pub fn count(&self, class: EdgeClass) -> usize {
        self.edges.iter().filter(|(_, c)| *c == class).count()
    }

    /// Number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.count(EdgeClass::Boundary)
    }

    /// Class of one edge, if the mesh has it.
    #[must_use]
    pub fn edge_class(&self, a: u32, b: u32) -> Option<EdgeClass> {
        let key = EdgeKey::new(a, b);
        self.edges.iter().find(|(e, _)| *e == key).map(|(_, c)| *c)
    }

    /// Indices of flipped faces, ascending.
    #[must_use]
    pub fn flipped_faces(&self) -> Vec<usize> {
        self.flipped
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    /// Whether every edge has exactly two consistently wound faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        !self.edges.is_empty() && self.edges.iter().all(|(_, c)| *c == EdgeClass::Manifold)
    }

    /// Whether there is nothing for repair to fix.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.non_manifold_edges.is_empty()
            && self.isolated_edges.is_empty()
            && self.boundary_loops.is_empty()
            && self.open_chains.is_empty()
            && self.duplicate_groups.is_empty()
            && !self.flipped.iter().any(|&f| f)
    }

    /// Whether the mesh is a closed two-manifold: clean, watertight and
    /// free of bowtie vertices.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_clean() && self.is_watertight() && self.non_manifold_vertices.is_empty()
    }
}

impl std::fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Mesh: {} vertices, {} faces, {} edges",
            self.vertex_count,
            self.face_count,
            self.edges.len()
        )?;
        writeln!(
            f,
            "  Edges: {} manifold, {} boundary, {} non-manifold, {} isolated",
            self.count(EdgeClass::Manifold),
            self.count(EdgeClass::Boundary),
            self.count(EdgeClass::NonManifold),
            self.count(EdgeClass::Isolated)
        )?;
        writeln!(
            f,
            "  Boundary: {} loops, {} open chains",
            self.boundary_loops.len(),
            self.open_chains.len()
        )?;
        write!(
            f,
            "  Defects: {} duplicate groups, {} flipped faces, {} non-manifold vertices",
            self.duplicate_groups.len(),
            self.flipped.iter().filter(|&&x| x).count(),
            self.non_manifold_vertices.len()
        )
    }
}

/// Classify a mesh with default options.
///
/// # Errors
///
/// Returns [`RepairError::UnclosedBoundary`](crate::RepairError::UnclosedBoundary)
/// if a boundary walk runs past the default loop limit.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{classify, EdgeClass};
///
/// let mut mesh = unit_cube();
/// mesh.remove_face(1).unwrap();
///
/// let report = classify(&mesh).unwrap();
/// assert_eq!(report.boundary_edge_count(), 4);
/// assert_eq!(report.boundary_loops.len(), 1);
/// assert_eq!(report.edge_class(4, 5), Some(EdgeClass::Boundary));
/// assert!(!report.is_clean());
/// ```
pub fn classify(mesh: &MeshGraph) -> RepairResult<ClassificationReport> {
    classify_with_options(mesh, &ClassifyOptions::default())
}

/// Classify a mesh.
///
/// # Errors
///
/// Returns [`RepairError::UnclosedBoundary`](crate::RepairError::UnclosedBoundary)
/// if a boundary walk runs past `options.max_loop_length`.
pub fn classify_with_options(
    mesh: &MeshGraph,
    options: &ClassifyOptions,
) -> RepairResult<ClassificationReport> {
    let edges = classify_edges(mesh);

    let mut non_manifold_edges: Vec<EdgeKey> = edges
        .iter()
        .filter(|(_, c)| *c == EdgeClass::NonManifold)
        .map(|(e, _)| *e)
        .collect();
    non_manifold_edges.sort_unstable();
    let mut isolated_edges: Vec<EdgeKey> = edges
        .iter()
        .filter(|(_, c)| *c == EdgeClass::Isolated)
        .map(|(e, _)| *e)
        .collect();
    isolated_edges.sort_unstable();

    let walk = walk_boundaries(mesh, options.max_loop_length)?;
    let duplicate_groups = find_duplicate_groups(mesh, options.weld_epsilon);
    let flipped = analyze_orientation(mesh).flipped;
    let non_manifold_vertices = non_manifold_vertices(mesh);

    let report = ClassificationReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edges,
        non_manifold_edges,
        isolated_edges,
        boundary_loops: walk.loops,
        open_chains: walk.open_chains,
        duplicate_groups,
        non_manifold_vertices,
        flipped,
    };

    debug!(
        "Classified {} edges: {} non-manifold, {} boundary",
        report.edges.len(),
        report.non_manifold_edges.len(),
        report.boundary_edge_count()
    );
    if !report.is_clean() {
        info!("Classification found defects: {}", report);
    }
    Ok(report)
}

/// Class of a single edge.
#[must_use]
pub fn classify_edge(mesh: &MeshGraph, a: u32, b: u32) -> EdgeClass {
    let faces = mesh.faces_on_edge(a, b);
    match faces {
        [] => EdgeClass::Isolated,
        [_] => EdgeClass::Boundary,
        [f, g] => {
            let (df, dg) = (mesh.faces()[*f].traverses(a, b), mesh.faces()[*g].traverses(a, b));
            if df == dg {
                EdgeClass::NonManifold
            } else {
                EdgeClass::Manifold
            }
        }
        _ => EdgeClass::NonManifold,
    }
}

/// Every edge of the mesh with its class, in adjacency order.
#[must_use]
pub fn classify_edges(mesh: &MeshGraph) -> Vec<(EdgeKey, EdgeClass)> {
    mesh.adjacency()
        .edges()
        .iter()
        .map(|&e| (e, classify_edge(mesh, e.low(), e.high())))
        .collect()
}

/// Non-manifold edges only, sorted. Cheaper than a full classification.
#[must_use]
pub fn non_manifold_edges(mesh: &MeshGraph) -> Vec<EdgeKey> {
    let mut edges: Vec<EdgeKey> = mesh
        .adjacency()
        .edges()
        .iter()
        .copied()
        .filter(|e| classify_edge(mesh, e.low(), e.high()) == EdgeClass::NonManifold)
        .collect();
    edges.sort_unstable();
    edges
}

/// Vertices whose incident faces split into several fans.
///
/// Faces around a vertex are joined when they share an edge at that vertex
/// with exactly two faces. More than one resulting group means the surface
/// pinches at the vertex.
#[must_use]
pub fn non_manifold_vertices(mesh: &MeshGraph) -> Vec<u32> {
    let adjacency = mesh.adjacency();
    let mut result = Vec::new();

    for v in 0..mesh.vertex_count() as u32 {
        let faces = adjacency.faces_of_vertex(v);
        if faces.len() < 2 {
            continue;
        }
        let local: HashMap<usize, usize> = faces.iter().enumerate().map(|(i, &f)| (f, i)).collect();
        let mut parent: Vec<usize> = (0..faces.len()).collect();
        let find = |parent: &mut Vec<usize>, mut x: usize| {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        };

        for &edge in adjacency.edges_of_vertex(v) {
            let shared = adjacency.faces_of_edge(edge);
            if let [f, g] = shared {
                if let (Some(&i), Some(&j)) = (local.get(f), local.get(g)) {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[ri.max(rj)] = ri.min(rj);
                    }
                }
            }
        }

        let fans = (0..faces.len()).filter(|&i| find(&mut parent, i) == i).count();
        if fans > 1 {
            result.push(v);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Point3, Vector3};

    fn open_box() -> MeshGraph {
        let mut mesh = unit_cube();
        mesh.remove_face(1).unwrap();
        mesh
    }

    fn bowtie() -> MeshGraph {
        // Two triangles touching at vertex 0 only
        MeshGraph::from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(-1.0, -1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![0, 3, 4]],
        )
        .unwrap()
    }

    #[test]
    fn test_closed_cube_is_printable() {
        let report = classify(&unit_cube()).unwrap();
        assert_eq!(report.edges.len(), 12);
        assert_eq!(report.count(EdgeClass::Manifold), 12);
        assert!(report.is_watertight());
        assert!(report.is_clean());
        assert!(report.is_printable());
    }

    #[test]
    fn test_open_box_boundary() {
        let report = classify(&open_box()).unwrap();
        assert_eq!(report.boundary_edge_count(), 4);
        assert_eq!(report.boundary_loops.len(), 1);
        assert_eq!(report.boundary_loops[0].edge_count(), 4);
        assert!(report.non_manifold_edges.is_empty());
        assert!(!report.is_watertight());
        assert!(report.non_manifold_vertices.is_empty());
    }

    #[test]
    fn test_flipped_face_makes_edges_non_manifold() {
        let mut mesh = unit_cube();
        mesh.flip_face(2).unwrap();
        let report = classify(&mesh).unwrap();
        assert_eq!(report.flipped_faces(), vec![2]);
        // Every edge of the flipped quad now runs the same way as its neighbour
        assert_eq!(report.non_manifold_edges.len(), 4);
        assert!(report.boundary_loops.is_empty());
    }

    #[test]
    fn test_isolated_edge() {
        let mut mesh = unit_cube();
        let v = mesh.add_vertex(Point3::new(3.0, 0.0, 0.0));
        mesh.add_edge(0, v).unwrap();
        // Loose edge along an existing face edge is not isolated
        mesh.add_edge(0, 1).unwrap();
        let report = classify(&mesh).unwrap();
        assert_eq!(report.isolated_edges, vec![EdgeKey::new(0, v)]);
        assert_eq!(report.edge_class(0, 1), Some(EdgeClass::Manifold));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_duplicates_reported() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(1.0, 1.0, 1.0));
        mesh.append(&other);
        let report = classify(&mesh).unwrap();
        assert_eq!(report.duplicate_groups.len(), 1);
        assert!(report.non_manifold_vertices.is_empty());
    }

    #[test]
    fn test_bowtie_vertex() {
        let report = classify(&bowtie()).unwrap();
        assert_eq!(report.non_manifold_vertices, vec![0]);
        // The walk closes each triangle separately at the pinch
        assert_eq!(report.boundary_loops.len(), 2);
    }

    #[test]
    fn test_loop_limit_propagates() {
        let options = ClassifyOptions::default().with_max_loop_length(3);
        assert!(classify_with_options(&open_box(), &options).is_err());
    }

    #[test]
    fn test_display() {
        let text = classify(&open_box()).unwrap().to_string();
        assert!(text.contains("4 boundary"));
        assert!(text.contains("1 loops"));
    }
}
