//! Polygon faces and undirected edge keys.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polygon face: an ordered loop of at least three vertex indices.
///
/// The order defines the winding: counter-clockwise seen from outside, so
/// the normal follows the right-hand rule. The closing edge from the last
/// index back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    vertices: Vec<u32>,
}

impl Face {
    /// Wrap an index loop without validation; [`MeshGraph`](crate::MeshGraph)
    /// validates indices on insertion.
    pub(crate) fn from_vec(vertices: Vec<u32>) -> Self {
        Self { vertices }
    }

    /// Vertex indices in winding order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Faces always have at least three corners.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether this is a triangle.
    #[inline]
    #[must_use]
    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    /// Whether the face references `vertex`.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: u32) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Directed edges `(from, to)` in winding order, closing edge included.
    pub fn directed_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Whether the face walks the edge from `a` to `b` (as opposed to `b`
    /// to `a`). Returns `None` if the edge is not on this face.
    #[must_use]
    pub fn traverses(&self, a: u32, b: u32) -> Option<bool> {
        self.directed_edges().find_map(|(from, to)| {
            if from == a && to == b {
                Some(true)
            } else if from == b && to == a {
                Some(false)
            } else {
                None
            }
        })
    }

    /// Reverse the winding in place.
    pub fn reverse(&mut self) {
        self.vertices.reverse();
    }

    /// Canonical form for duplicate detection: rotated so the smallest index
    /// comes first, orientation preserved.
    #[must_use]
    pub fn canonical(&self) -> Vec<u32> {
        let start = self
            .vertices
            .iter()
            .enumerate()
            .min_by_key(|&(_, v)| *v)
            .map_or(0, |(i, _)| i);
        let mut rotated = self.vertices.clone();
        rotated.rotate_left(start);
        rotated
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut Vec<u32> {
        &mut self.vertices
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

/// An undirected edge: an unordered vertex pair stored smallest first.
///
/// # Example
///
/// ```
/// use mesh_types::EdgeKey;
///
/// assert_eq!(EdgeKey::new(5, 2), EdgeKey::new(2, 5));
/// assert_eq!(EdgeKey::new(5, 2).vertices(), (2, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeKey(u32, u32);

impl EdgeKey {
    /// Normalize a vertex pair.
    #[inline]
    #[must_use]
    pub const fn new(a: u32, b: u32) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// The two endpoints, smallest first.
    #[inline]
    #[must_use]
    pub const fn vertices(self) -> (u32, u32) {
        (self.0, self.1)
    }

    /// Smaller endpoint.
    #[inline]
    #[must_use]
    pub const fn low(self) -> u32 {
        self.0
    }

    /// Larger endpoint.
    #[inline]
    #[must_use]
    pub const fn high(self) -> u32 {
        self.1
    }

    /// Whether `vertex` is an endpoint.
    #[inline]
    #[must_use]
    pub const fn touches(self, vertex: u32) -> bool {
        self.0 == vertex || self.1 == vertex
    }

    /// The endpoint opposite `vertex`, if `vertex` is an endpoint.
    #[inline]
    #[must_use]
    pub const fn other(self, vertex: u32) -> Option<u32> {
        if self.0 == vertex {
            Some(self.1)
        } else if self.1 == vertex {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed_edges_close_the_loop() {
        let face = Face::from_vec(vec![0, 1, 2, 3]);
        let edges: Vec<_> = face.directed_edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }

    #[test]
    fn test_traverses() {
        let face = Face::from_vec(vec![0, 1, 2]);
        assert_eq!(face.traverses(0, 1), Some(true));
        assert_eq!(face.traverses(1, 0), Some(false));
        assert_eq!(face.traverses(0, 2), Some(false));
        assert_eq!(face.traverses(0, 5), None);
    }

    #[test]
    fn test_canonical_preserves_orientation() {
        let face = Face::from_vec(vec![7, 3, 5]);
        assert_eq!(face.canonical(), vec![3, 5, 7]);
        let mut reversed = face.clone();
        reversed.reverse();
        assert_eq!(reversed.canonical(), vec![3, 7, 5]);
    }

    #[test]
    fn test_edge_key_other() {
        let edge = EdgeKey::new(9, 4);
        assert_eq!(edge.other(4), Some(9));
        assert_eq!(edge.other(9), Some(4));
        assert_eq!(edge.other(1), None);
        assert!(edge.touches(9));
        assert_eq!(edge.to_string(), "(4, 9)");
    }

    #[test]
    fn test_face_display() {
        assert_eq!(Face::from_vec(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
    }
}
