//! Indexed polygon mesh graph.

use crate::adjacency::Adjacency;
use crate::{Aabb, EdgeKey, Face, MeshError, MeshResult, Vertex};
use hashbrown::HashSet;
use nalgebra::{Isometry3, Point3, Vector3};
use std::sync::OnceLock;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed polygon mesh with lazily derived adjacency.
///
/// Vertices and faces live in flat arrays and reference each other only by
/// integer index. Adjacency (edge → faces, vertex → edges) is derived on the
/// first query after a mutation and memoized until the next topological
/// change; moving a vertex keeps it.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside, so
/// normals point outward by the right-hand rule. Faces may have any number
/// of corners (at least three).
///
/// # Example
///
/// ```
/// use mesh_types::{MeshGraph, Point3};
///
/// let mut mesh = MeshGraph::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
/// let d = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// mesh.add_face(&[a, b, c, d]).unwrap();
///
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.faces_on_edge(b, a), &[0]);
/// assert_eq!(mesh.face_normal(0).unwrap().z, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMeshGraph"))]
pub struct MeshGraph {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    loose_edges: Vec<EdgeKey>,
    #[cfg_attr(feature = "serde", serde(skip))]
    adjacency: OnceLock<Adjacency>,
}

/// Deserialized arrays, checked by [`MeshGraph::validate`] before use.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawMeshGraph {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    #[serde(default)]
    loose_edges: Vec<EdgeKey>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMeshGraph> for MeshGraph {
    type Error = MeshError;

    fn try_from(raw: RawMeshGraph) -> MeshResult<Self> {
        let mesh = Self {
            vertices: raw.vertices,
            faces: raw.faces,
            loose_edges: raw.loose_edges,
            adjacency: OnceLock::new(),
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

impl MeshGraph {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            ..Self::default()
        }
    }

    /// Build a mesh from positions and polygon index lists.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidFace`] for the first invalid face.
    pub fn from_polygons<F: AsRef<[u32]>>(
        positions: &[Point3<f64>],
        faces: impl IntoIterator<Item = F>,
    ) -> MeshResult<Self> {
        let mut mesh = Self::with_capacity(positions.len(), 0);
        for &p in positions {
            mesh.add_vertex(p);
        }
        for face in faces {
            mesh.add_face(face.as_ref())?;
        }
        Ok(mesh)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct edges, face edges and loose edges together.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency().edge_count()
    }

    /// Whether the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// All vertices.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All faces.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// A face by index.
    #[inline]
    #[must_use]
    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    /// Loose edges not bound to any face.
    #[inline]
    #[must_use]
    pub fn loose_edges(&self) -> &[EdgeKey] {
        &self.loose_edges
    }

    /// Position of a vertex.
    #[inline]
    #[must_use]
    pub fn position(&self, vertex: u32) -> Option<Point3<f64>> {
        self.vertices.get(vertex as usize).map(|v| v.position)
    }

    /// Positions of a face's corners in winding order.
    #[must_use]
    pub fn face_positions(&self, face: usize) -> Option<Vec<Point3<f64>>> {
        let face = self.faces.get(face)?;
        face.vertices()
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    // ------------------------------------------------------------------
    // Adjacency
    // ------------------------------------------------------------------

    /// Derived adjacency, built on first use after a mutation.
    pub fn adjacency(&self) -> &Adjacency {
        self.adjacency.get_or_init(|| {
            Adjacency::build(self.vertices.len(), &self.faces, &self.loose_edges)
        })
    }

    /// Vertices sharing an edge with `vertex`.
    #[must_use]
    pub fn neighbors_of(&self, vertex: u32) -> Vec<u32> {
        self.adjacency().neighbors(vertex).collect()
    }

    /// Faces incident to the undirected edge `a`-`b`.
    #[must_use]
    pub fn faces_on_edge(&self, a: u32, b: u32) -> &[usize] {
        self.adjacency().faces_on_edge(a, b)
    }

    fn invalidate(&mut self) {
        self.adjacency.take();
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(position));
        self.invalidate();
        index
    }

    /// Append a face and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidFace`] if the face has fewer than 3
    /// vertices, references a vertex out of range, or repeats a vertex.
    pub fn add_face(&mut self, indices: &[u32]) -> MeshResult<usize> {
        self.check_face(indices)?;
        self.faces.push(Face::from_vec(indices.to_vec()));
        self.invalidate();
        Ok(self.faces.len() - 1)
    }

    /// Add a loose (wire) edge. Adding an existing loose edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] for a bad index and
    /// [`MeshError::InvalidArgument`] if `a == b`.
    pub fn add_edge(&mut self, a: u32, b: u32) -> MeshResult<()> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(MeshError::invalid_argument(format!(
                "edge {a}-{b} has zero length"
            )));
        }
        let edge = EdgeKey::new(a, b);
        if !self.loose_edges.contains(&edge) {
            self.loose_edges.push(edge);
            self.invalidate();
        }
        Ok(())
    }

    /// Remove every loose edge, returning how many were removed.
    pub fn clear_loose_edges(&mut self) -> usize {
        self.retain_loose_edges(|_| false)
    }

    /// Keep only loose edges for which `keep` returns true.
    ///
    /// Returns the number of edges removed.
    pub fn retain_loose_edges(&mut self, mut keep: impl FnMut(EdgeKey) -> bool) -> usize {
        let before = self.loose_edges.len();
        self.loose_edges.retain(|&e| keep(e));
        let removed = before - self.loose_edges.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Remove a face, shifting later faces down by one.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::FaceOutOfRange`] for a bad index.
    pub fn remove_face(&mut self, index: usize) -> MeshResult<Face> {
        self.check_face_index(index)?;
        let face = self.faces.remove(index);
        self.invalidate();
        Ok(face)
    }

    /// Remove several faces at once, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::FaceOutOfRange`] if any index is bad; nothing
    /// is removed in that case.
    pub fn remove_faces(&mut self, indices: &[usize]) -> MeshResult<usize> {
        for &index in indices {
            self.check_face_index(index)?;
        }
        let doomed: HashSet<usize> = indices.iter().copied().collect();
        Ok(self.retain_faces(|i, _| !doomed.contains(&i)))
    }

    /// Keep only faces for which `keep(index, face)` returns true.
    ///
    /// Returns the number of faces removed.
    pub fn retain_faces(&mut self, mut keep: impl FnMut(usize, &Face) -> bool) -> usize {
        let before = self.faces.len();
        let mut index = 0;
        self.faces.retain(|face| {
            let kept = keep(index, face);
            index += 1;
            kept
        });
        let removed = before - self.faces.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Move a vertex. Adjacency is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::VertexOutOfRange`] for a bad index.
    pub fn set_position(&mut self, vertex: u32, position: Point3<f64>) -> MeshResult<()> {
        self.check_vertex(vertex)?;
        self.vertices[vertex as usize].position = position;
        Ok(())
    }

    /// Redirect every reference to `remove` onto `keep`.
    ///
    /// `remove` stays in the vertex array, unreferenced; call
    /// [`remove_unreferenced_vertices`](Self::remove_unreferenced_vertices)
    /// to compact. Loose edges that collapse to a point are dropped.
    ///
    /// Returns the number of faces that were rewritten.
    ///
    /// # Errors
    ///
    /// - [`MeshError::VertexOutOfRange`] for a bad index
    /// - [`MeshError::DegenerateFace`] if some face references both vertices,
    ///   since it would end up repeating one; the mesh is left untouched and
    ///   the caller must remove that face first
    pub fn merge_vertices(&mut self, keep: u32, remove: u32) -> MeshResult<usize> {
        self.check_vertex(keep)?;
        self.check_vertex(remove)?;
        if keep == remove {
            return Ok(0);
        }
        if let Some(face) = self
            .faces
            .iter()
            .position(|f| f.contains(keep) && f.contains(remove))
        {
            return Err(MeshError::DegenerateFace {
                face,
                kept: keep,
                removed: remove,
            });
        }

        let mut rewritten = 0;
        for face in &mut self.faces {
            let mut touched = false;
            for v in face.vertices_mut() {
                if *v == remove {
                    *v = keep;
                    touched = true;
                }
            }
            rewritten += usize::from(touched);
        }

        let redirect = |v: u32| if v == remove { keep } else { v };
        let mut seen = HashSet::new();
        self.loose_edges = self
            .loose_edges
            .iter()
            .filter_map(|e| {
                let (a, b) = (redirect(e.low()), redirect(e.high()));
                (a != b).then(|| EdgeKey::new(a, b))
            })
            .filter(|e| seen.insert(*e))
            .collect();

        self.invalidate();
        debug!(keep, remove, rewritten, "merged vertices");
        Ok(rewritten)
    }

    /// Reverse the winding of one face.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::FaceOutOfRange`] for a bad index.
    pub fn flip_face(&mut self, index: usize) -> MeshResult<()> {
        self.check_face_index(index)?;
        self.faces[index].reverse();
        self.invalidate();
        Ok(())
    }

    /// Reverse the winding of every face.
    pub fn flip_all(&mut self) {
        for face in &mut self.faces {
            face.reverse();
        }
        self.invalidate();
    }

    /// Append another mesh, returning the index offset applied to its
    /// vertices.
    pub fn append(&mut self, other: &Self) -> u32 {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(other.faces.iter().map(|f| {
            Face::from_vec(f.vertices().iter().map(|&v| v + offset).collect())
        }));
        self.loose_edges.extend(
            other
                .loose_edges
                .iter()
                .map(|e| EdgeKey::new(e.low() + offset, e.high() + offset)),
        );
        self.invalidate();
        offset
    }

    /// Copy a subset of faces into a new, compact mesh.
    ///
    /// Vertices are renumbered in order of first use; out-of-range face
    /// indices are skipped.
    #[must_use]
    pub fn extract_faces(&self, faces: &[usize]) -> Self {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertices.len()];
        let mut out = Self::new();
        for face in faces.iter().filter_map(|&i| self.faces.get(i)) {
            let indices = face
                .vertices()
                .iter()
                .map(|&v| {
                    *remap[v as usize].get_or_insert_with(|| {
                        out.vertices.push(self.vertices[v as usize]);
                        (out.vertices.len() - 1) as u32
                    })
                })
                .collect();
            out.faces.push(Face::from_vec(indices));
        }
        out
    }

    /// Delete specific vertices, which must be unreferenced.
    ///
    /// Returns the number of vertices removed.
    ///
    /// # Errors
    ///
    /// - [`MeshError::VertexOutOfRange`] for a bad index
    /// - [`MeshError::InvalidArgument`] if a face or loose edge still
    ///   references one of them
    pub fn remove_vertices(&mut self, vertices: &[u32]) -> MeshResult<usize> {
        let referenced = self.referenced();
        let mut keep = vec![true; self.vertices.len()];
        for &v in vertices {
            self.check_vertex(v)?;
            if referenced[v as usize] {
                return Err(MeshError::invalid_argument(format!(
                    "vertex {v} is still referenced"
                )));
            }
            keep[v as usize] = false;
        }
        Ok(self.compact(&keep))
    }

    /// Delete every vertex no face or loose edge references.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let keep = self.referenced();
        self.compact(&keep)
    }

    fn referenced(&self) -> Vec<bool> {
        let mut used = vec![false; self.vertices.len()];
        let face_refs = self.faces.iter().flat_map(|f| f.vertices().iter().copied());
        let edge_refs = self.loose_edges.iter().flat_map(|e| [e.low(), e.high()]);
        for v in face_refs.chain(edge_refs) {
            if let Some(slot) = used.get_mut(v as usize) {
                *slot = true;
            }
        }
        used
    }

    fn compact(&mut self, keep: &[bool]) -> usize {
        let removed = keep.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut next = 0u32;
        for (old, &k) in keep.iter().enumerate() {
            if k {
                remap[old] = next;
                next += 1;
            }
        }

        let mut index = 0;
        self.vertices.retain(|_| {
            let k = keep[index];
            index += 1;
            k
        });
        for face in &mut self.faces {
            for v in face.vertices_mut() {
                *v = remap[*v as usize];
            }
        }
        for edge in &mut self.loose_edges {
            *edge = EdgeKey::new(remap[edge.low() as usize], remap[edge.high() as usize]);
        }

        self.invalidate();
        removed
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Apply a rigid transform to every vertex.
    pub fn transform(&mut self, transform: &Isometry3<f64>) {
        for v in &mut self.vertices {
            v.position = transform * v.position;
        }
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            v.translate(offset);
        }
    }

    /// Scale per axis about `center`.
    ///
    /// A mirroring scale (odd number of negative factors) also flips every
    /// face so normals keep pointing outward.
    pub fn scale_about(&mut self, center: Point3<f64>, factors: Vector3<f64>) {
        for v in &mut self.vertices {
            v.position = center + (v.position - center).component_mul(&factors);
        }
        if factors.x * factors.y * factors.z < 0.0 {
            self.flip_all();
        }
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Newell vector of a face: normal direction, length twice the area.
    #[must_use]
    pub fn face_newell(&self, face: usize) -> Option<Vector3<f64>> {
        let face = self.faces.get(face)?;
        let verts = face.vertices();
        let n = verts.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = self.position(verts[i])?;
            let b = self.position(verts[(i + 1) % n])?;
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        Some(normal)
    }

    /// Unit normal of a face by the right-hand rule.
    ///
    /// Returns `None` for a bad index or a zero-area face.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        self.face_newell(face)?.try_normalize(f64::EPSILON)
    }

    /// Area of a (planar) face; 0 for a bad index.
    #[must_use]
    pub fn face_area(&self, face: usize) -> f64 {
        self.face_newell(face).map_or(0.0, |n| n.norm() / 2.0)
    }

    /// Average of a face's corners.
    #[must_use]
    pub fn face_centroid(&self, face: usize) -> Option<Point3<f64>> {
        let positions = self.face_positions(face)?;
        let sum = positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / positions.len() as f64))
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Signed volume enclosed by the surface.
    ///
    /// Positive when faces wind outward. Only meaningful for closed meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|face| self.face_signed_volume(face))
            .sum()
    }

    /// Signed volume contribution of a subset of faces.
    #[must_use]
    pub fn signed_volume_of(&self, faces: &[usize]) -> f64 {
        faces
            .iter()
            .filter_map(|&f| self.faces.get(f))
            .map(|face| self.face_signed_volume(face))
            .sum()
    }

    fn face_signed_volume(&self, face: &Face) -> f64 {
        let verts = face.vertices();
        let p0 = self.vertices[verts[0] as usize].position.coords;
        verts[1..]
            .windows(2)
            .map(|w| {
                let p1 = self.vertices[w[0] as usize].position.coords;
                let p2 = self.vertices[w[1] as usize].position.coords;
                p0.dot(&p1.cross(&p2)) / 6.0
            })
            .sum()
    }

    /// Axis-aligned bounds of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check every face and loose edge against the vertex array.
    ///
    /// Meshes built through this API are always valid, and deserialization
    /// runs this check before handing a mesh out.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> MeshResult<()> {
        for face in &self.faces {
            self.check_face(face.vertices())?;
        }
        for edge in &self.loose_edges {
            self.check_vertex(edge.low())?;
            self.check_vertex(edge.high())?;
        }
        Ok(())
    }

    pub(crate) fn check_vertex(&self, vertex: u32) -> MeshResult<()> {
        if (vertex as usize) < self.vertices.len() {
            Ok(())
        } else {
            Err(MeshError::VertexOutOfRange {
                index: vertex,
                count: self.vertices.len(),
            })
        }
    }

    pub(crate) fn check_face_index(&self, index: usize) -> MeshResult<()> {
        if index < self.faces.len() {
            Ok(())
        } else {
            Err(MeshError::FaceOutOfRange {
                index,
                count: self.faces.len(),
            })
        }
    }

    fn check_face(&self, indices: &[u32]) -> MeshResult<()> {
        if indices.len() < 3 {
            return Err(MeshError::invalid_face(format!(
                "{} vertices given, at least 3 required",
                indices.len()
            )));
        }
        if let Some(&bad) = indices
            .iter()
            .find(|&&v| v as usize >= self.vertices.len())
        {
            return Err(MeshError::invalid_face(format!(
                "vertex index {bad} out of range ({} vertices)",
                self.vertices.len()
            )));
        }
        let mut seen = HashSet::with_capacity(indices.len());
        if let Some(&dup) = indices.iter().find(|&&v| !seen.insert(v)) {
            return Err(MeshError::invalid_face(format!("vertex {dup} repeats")));
        }
        Ok(())
    }

    pub(crate) fn faces_mut(&mut self) -> &mut Vec<Face> {
        self.invalidate();
        &mut self.faces
    }

    pub(crate) fn loose_edges_mut(&mut self) -> &mut Vec<EdgeKey> {
        self.invalidate();
        &mut self.loose_edges
    }
}

/// Create a unit cube `[0, 1]³` with six outward-wound quads.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 6);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn unit_cube() -> MeshGraph {
    let mut mesh = MeshGraph::with_capacity(8, 6);
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    for [x, y, z] in corners {
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }
    let quads = [
        [0, 3, 2, 1], // bottom, -Z
        [4, 5, 6, 7], // top, +Z
        [0, 1, 5, 4], // front, -Y
        [3, 7, 6, 2], // back, +Y
        [0, 4, 7, 3], // left, -X
        [1, 2, 6, 5], // right, +X
    ];
    for quad in quads {
        mesh.faces.push(Face::from_vec(quad.to_vec()));
    }
    mesh
}
