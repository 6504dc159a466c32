//! Local topological edits: face inset and apex edge loops.

use crate::{EdgeKey, Face, MeshError, MeshGraph, MeshResult};
use hashbrown::HashMap;
use tracing::debug;

/// Result of [`MeshGraph::inset_face`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsetFace {
    /// Index of the inner face. It reuses the original face's index.
    pub face: usize,
    /// The inner loop's vertices, matching the original corners in order.
    pub inner_loop: Vec<u32>,
    /// Indices of the bridging quads, one per original edge.
    pub ring_faces: Vec<usize>,
}

impl MeshGraph {
    /// Inset a face toward its centroid.
    ///
    /// Each corner gets an inner copy moved `amount` of the way to the face
    /// centroid. The face itself becomes the inner polygon (same index, same
    /// winding) and each original edge is bridged to the inner loop with a
    /// quad. The inner loop is the usual insertion boundary for windows and
    /// other fragments.
    ///
    /// # Errors
    ///
    /// - [`MeshError::FaceOutOfRange`] for a bad index
    /// - [`MeshError::InvalidArgument`] unless `0 < amount < 1`
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::unit_cube;
    ///
    /// let mut cube = unit_cube();
    /// let inset = cube.inset_face(1, 0.5).unwrap();
    ///
    /// assert_eq!(inset.inner_loop.len(), 4);
    /// assert_eq!(cube.face_count(), 6 + 4);
    /// assert!(cube.adjacency().is_watertight());
    /// ```
    pub fn inset_face(&mut self, face: usize, amount: f64) -> MeshResult<InsetFace> {
        self.check_face_index(face)?;
        if !(amount.is_finite() && amount > 0.0 && amount < 1.0) {
            return Err(MeshError::invalid_argument(format!(
                "inset amount {amount} must lie strictly between 0 and 1"
            )));
        }

        let outer = self.faces()[face].vertices().to_vec();
        let centroid = self
            .face_centroid(face)
            .ok_or_else(|| MeshError::invalid_argument("face has no geometry"))?;

        let mut inner_loop = Vec::with_capacity(outer.len());
        for &v in &outer {
            let p = self
                .position(v)
                .ok_or(MeshError::VertexOutOfRange {
                    index: v,
                    count: self.vertex_count(),
                })?;
            inner_loop.push(self.add_vertex(p + (centroid - p) * amount));
        }

        let n = outer.len();
        let faces = self.faces_mut();
        faces[face] = Face::from_vec(inner_loop.clone());
        let first_ring = faces.len();
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(Face::from_vec(vec![
                outer[i],
                outer[j],
                inner_loop[j],
                inner_loop[i],
            ]));
        }

        debug!(face, corners = n, amount, "inset face");
        Ok(InsetFace {
            face,
            inner_loop,
            ring_faces: (first_ring..first_ring + n).collect(),
        })
    }

    /// Cut a new edge loop around an apex vertex.
    ///
    /// Every edge incident to the apex is split at `fraction` of its length
    /// measured from the apex, and every face touching the apex is cut into
    /// a small triangle at the tip plus the remaining polygon. Loose edges at
    /// the apex are split too. With `apex = None` the highest vertex (largest
    /// Z, lowest index on ties) is used, which is the tip of a cone or spire.
    ///
    /// Returns the new loop's vertices in the apex's edge order.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidArgument`] unless `0 < fraction < 1`, or if the
    ///   mesh has no vertices or the apex has no edges
    /// - [`MeshError::VertexOutOfRange`] for a bad explicit apex
    pub fn add_apex_edge_loop(&mut self, apex: Option<u32>, fraction: f64) -> MeshResult<Vec<u32>> {
        if !(fraction.is_finite() && fraction > 0.0 && fraction < 1.0) {
            return Err(MeshError::invalid_argument(format!(
                "edge loop fraction {fraction} must lie strictly between 0 and 1"
            )));
        }
        let apex = match apex {
            Some(v) => {
                self.check_vertex(v)?;
                v
            }
            None => self.highest_vertex().ok_or_else(|| {
                MeshError::invalid_argument("mesh has no vertices to pick an apex from")
            })?,
        };

        let neighbors = self.neighbors_of(apex);
        if neighbors.is_empty() {
            return Err(MeshError::invalid_argument(format!(
                "apex vertex {apex} has no edges"
            )));
        }
        let apex_faces = self.adjacency().faces_of_vertex(apex).to_vec();
        let Some(tip) = self.position(apex) else {
            return Err(MeshError::VertexOutOfRange {
                index: apex,
                count: self.vertex_count(),
            });
        };

        let mut split: HashMap<u32, u32> = HashMap::with_capacity(neighbors.len());
        let mut ring = Vec::with_capacity(neighbors.len());
        for &n in &neighbors {
            let p = self.position(n).unwrap_or(tip);
            let v = self.add_vertex(tip + (p - tip) * fraction);
            split.insert(n, v);
            ring.push(v);
        }

        let faces = self.faces_mut();
        for f in apex_faces {
            let verts = faces[f].vertices().to_vec();
            let Some(k) = verts.iter().position(|&v| v == apex) else {
                continue;
            };
            let n = verts.len();
            let prev = verts[(k + n - 1) % n];
            let next = verts[(k + 1) % n];
            let (new_prev, new_next) = (split[&prev], split[&next]);

            let mut remainder = Vec::with_capacity(n + 1);
            remainder.extend_from_slice(&verts[..k]);
            remainder.extend_from_slice(&[new_prev, new_next]);
            remainder.extend_from_slice(&verts[k + 1..]);
            faces[f] = Face::from_vec(remainder);
            faces.push(Face::from_vec(vec![new_prev, apex, new_next]));
        }

        let edges = self.loose_edges_mut();
        let mut rewired = Vec::with_capacity(edges.len());
        for &edge in edges.iter() {
            match edge.other(apex).and_then(|other| split.get(&other).map(|&mid| (other, mid))) {
                Some((other, mid)) => {
                    rewired.push(EdgeKey::new(apex, mid));
                    rewired.push(EdgeKey::new(mid, other));
                }
                None => rewired.push(edge),
            }
        }
        *edges = rewired;

        debug!(apex, fraction, loop_len = ring.len(), "added apex edge loop");
        Ok(ring)
    }

    fn highest_vertex(&self) -> Option<u32> {
        self.vertices()
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, z)) if z >= v.position.z => best,
                _ => Some((i, v.position.z)),
            })
            .map(|(i, _)| i as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_cube;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn pyramid() -> MeshGraph {
        MeshGraph::from_polygons(
            &[
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 2.0),
            ],
            vec![
                vec![0, 3, 2, 1],
                vec![0, 1, 4],
                vec![1, 2, 4],
                vec![2, 3, 4],
                vec![3, 0, 4],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_inset_keeps_face_index_and_winding() {
        let mut cube = unit_cube();
        let normal = cube.face_normal(1).unwrap();
        let inset = cube.inset_face(1, 0.5).unwrap();
        assert_eq!(inset.face, 1);
        assert_eq!(inset.ring_faces, vec![6, 7, 8, 9]);
        assert_relative_eq!(cube.face_normal(1).unwrap(), normal);
        assert_relative_eq!(cube.face_area(1), 0.25, epsilon = 1e-12);
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inset_rejects_bad_amount() {
        let mut cube = unit_cube();
        assert!(cube.inset_face(0, 0.0).is_err());
        assert!(cube.inset_face(0, 1.0).is_err());
        assert!(cube.inset_face(9, 0.5).is_err());
        assert_eq!(cube.face_count(), 6);
    }

    #[test]
    fn test_apex_edge_loop_on_pyramid() {
        let mut mesh = pyramid();
        let ring = mesh.add_apex_edge_loop(None, 0.25).unwrap();
        assert_eq!(ring.len(), 4);
        // 4 side faces split into a tip triangle and a quad each
        assert_eq!(mesh.face_count(), 5 + 4);
        assert!(mesh.adjacency().is_watertight());
        for &v in &ring {
            assert_relative_eq!(mesh.position(v).unwrap().z, 1.5, epsilon = 1e-12);
        }
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_apex_edge_loop_rejects_bad_fraction() {
        let mut mesh = pyramid();
        assert!(mesh.add_apex_edge_loop(None, 0.0).is_err());
        assert!(mesh.add_apex_edge_loop(None, 1.5).is_err());
        assert!(mesh.add_apex_edge_loop(Some(99), 0.5).is_err());
    }

    #[test]
    fn test_apex_edge_loop_splits_loose_edges() {
        let mut mesh = MeshGraph::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
        mesh.add_edge(a, b).unwrap();
        let ring = mesh.add_apex_edge_loop(None, 0.5).unwrap();
        assert_eq!(ring, vec![2]);
        assert_eq!(mesh.loose_edges().len(), 2);
        assert_relative_eq!(mesh.position(2).unwrap().z, 0.5);
    }
}
