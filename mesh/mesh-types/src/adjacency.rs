//! Derived adjacency for a [`MeshGraph`](crate::MeshGraph).
//!
//! Edge → faces, vertex → edges and vertex → faces lookups. The graph builds
//! this lazily on first query and drops it on every mutation.

use crate::{EdgeKey, Face};
use hashbrown::HashMap;

/// Adjacency information for a mesh.
///
/// Edges are numbered in order of first appearance: face edges in face order,
/// then loose edges. Every per-edge and per-vertex list is therefore
/// deterministic for a given mesh.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<EdgeKey>,
    edge_ids: HashMap<EdgeKey, usize>,
    edge_faces: Vec<Vec<usize>>,
    vertex_edges: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build adjacency from faces and loose edges.
    ///
    /// Indices outside `0..vertex_count` are ignored.
    #[must_use]
    pub fn build(vertex_count: usize, faces: &[Face], loose_edges: &[EdgeKey]) -> Self {
        let mut adjacency = Self {
            vertex_edges: vec![Vec::new(); vertex_count],
            vertex_faces: vec![Vec::new(); vertex_count],
            ..Self::default()
        };

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face.vertices() {
                if let Some(list) = adjacency.vertex_faces.get_mut(v as usize) {
                    list.push(face_idx);
                }
            }
            for (a, b) in face.directed_edges() {
                let id = adjacency.intern(EdgeKey::new(a, b));
                adjacency.edge_faces[id].push(face_idx);
            }
        }

        for &edge in loose_edges {
            adjacency.intern(edge);
        }

        adjacency
    }

    fn intern(&mut self, edge: EdgeKey) -> usize {
        if let Some(&id) = self.edge_ids.get(&edge) {
            return id;
        }
        let id = self.edges.len();
        self.edges.push(edge);
        self.edge_ids.insert(edge, id);
        self.edge_faces.push(Vec::new());
        for v in [edge.low(), edge.high()] {
            if let Some(list) = self.vertex_edges.get_mut(v as usize) {
                list.push(id);
            }
        }
        id
    }

    /// All edges, in order of first appearance.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    /// Number of distinct edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Dense id of an edge, if it exists.
    #[must_use]
    pub fn edge_id(&self, a: u32, b: u32) -> Option<usize> {
        self.edge_ids.get(&EdgeKey::new(a, b)).copied()
    }

    /// Faces incident to the edge `a`-`b`; empty if the edge doesn't exist.
    #[must_use]
    pub fn faces_on_edge(&self, a: u32, b: u32) -> &[usize] {
        self.edge_id(a, b)
            .map_or(&[], |id| self.edge_faces[id].as_slice())
    }

    /// Faces incident to the edge with dense id `edge`.
    #[must_use]
    pub fn faces_of_edge(&self, edge: usize) -> &[usize] {
        self.edge_faces.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Edge ids incident to a vertex.
    #[must_use]
    pub fn edges_of_vertex(&self, vertex: u32) -> &[usize] {
        self.vertex_edges
            .get(vertex as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Faces incident to a vertex.
    #[must_use]
    pub fn faces_of_vertex(&self, vertex: u32) -> &[usize] {
        self.vertex_faces
            .get(vertex as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Vertices sharing an edge with `vertex`, in edge order.
    pub fn neighbors(&self, vertex: u32) -> impl Iterator<Item = u32> + '_ {
        self.edges_of_vertex(vertex)
            .iter()
            .filter_map(move |&id| self.edges[id].other(vertex))
    }

    /// Edges paired with their incident faces.
    pub fn edges_with_faces(&self) -> impl Iterator<Item = (EdgeKey, &[usize])> + '_ {
        self.edges
            .iter()
            .zip(&self.edge_faces)
            .map(|(&edge, faces)| (edge, faces.as_slice()))
    }

    /// Edges with exactly one incident face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges_with_faces()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| edge)
    }

    /// Edges with more than two incident faces.
    pub fn over_shared_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges_with_faces()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(edge, _)| edge)
    }

    /// Edges with no incident face (loose wire edges).
    pub fn isolated_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges_with_faces()
            .filter(|(_, faces)| faces.is_empty())
            .map(|(edge, _)| edge)
    }

    /// Count edges with exactly one incident face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Whether no edge has more than two incident faces.
    #[must_use]
    pub fn is_edge_manifold(&self) -> bool {
        self.edge_faces.iter().all(|faces| faces.len() <= 2)
    }

    /// Whether every edge has exactly two incident faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_faces.iter().all(|faces| faces.len() == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quads() -> Vec<Face> {
        // Two quads sharing edge 1-4
        vec![
            Face::from_vec(vec![0, 1, 4, 3]),
            Face::from_vec(vec![1, 2, 5, 4]),
        ]
    }

    #[test]
    fn test_edge_numbering_is_first_appearance() {
        let adj = Adjacency::build(6, &quads(), &[]);
        assert_eq!(adj.edge_count(), 7);
        assert_eq!(adj.edges()[0], EdgeKey::new(0, 1));
        assert_eq!(adj.edges()[1], EdgeKey::new(1, 4));
    }

    #[test]
    fn test_shared_edge_faces() {
        let adj = Adjacency::build(6, &quads(), &[]);
        assert_eq!(adj.faces_on_edge(4, 1), &[0, 1]);
        assert_eq!(adj.faces_on_edge(0, 1), &[0]);
        assert!(adj.faces_on_edge(0, 5).is_empty());
        assert_eq!(adj.boundary_edge_count(), 6);
        assert!(adj.is_edge_manifold());
        assert!(!adj.is_watertight());
    }

    #[test]
    fn test_neighbors_and_vertex_faces() {
        let adj = Adjacency::build(6, &quads(), &[]);
        let mut neighbors: Vec<u32> = adj.neighbors(1).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 2, 4]);
        assert_eq!(adj.faces_of_vertex(4), &[0, 1]);
        assert_eq!(adj.faces_of_vertex(0), &[0]);
    }

    #[test]
    fn test_loose_edges_are_isolated() {
        let adj = Adjacency::build(7, &quads(), &[EdgeKey::new(5, 6), EdgeKey::new(1, 4)]);
        let isolated: Vec<_> = adj.isolated_edges().collect();
        assert_eq!(isolated, vec![EdgeKey::new(5, 6)]);
        // A loose edge that duplicates a face edge adds nothing
        assert_eq!(adj.faces_on_edge(1, 4).len(), 2);
    }

    #[test]
    fn test_over_shared_edge() {
        let faces = vec![
            Face::from_vec(vec![0, 1, 2]),
            Face::from_vec(vec![1, 0, 3]),
            Face::from_vec(vec![0, 1, 4]),
        ];
        let adj = Adjacency::build(5, &faces, &[]);
        let over: Vec<_> = adj.over_shared_edges().collect();
        assert_eq!(over, vec![EdgeKey::new(0, 1)]);
        assert!(!adj.is_edge_manifold());
    }
}
