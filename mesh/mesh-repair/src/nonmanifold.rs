//! Non-manifold edge resolution.
//!
//! An edge shared by three or more faces keeps two of them. Every other
//! face on the edge, together with whatever is attached to it through
//! ordinary two-face edges, is cut out into a separate fragment. The
//! surviving pair is chosen by, in order: consistent winding, fewest faces
//! detached, least deviation between the two normals, lowest face indices.

use std::collections::VecDeque;

use hashbrown::HashSet;
use mesh_types::{EdgeKey, MeshGraph};
use tracing::{debug, warn};

use crate::RepairResult;

const DEVIATION_TOLERANCE: f64 = 1e-9;

/// Faces cut away from a non-manifold edge.
#[derive(Debug, Clone)]
pub struct DetachedFragment {
    /// The edge that was resolved.
    pub source_edge: EdgeKey,
    /// The detached faces as a standalone, compacted mesh.
    pub mesh: MeshGraph,
}

impl DetachedFragment {
    /// Number of faces in the fragment.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }
}

/// The pair of faces kept on an over-shared edge and the faces it detaches.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResolution {
    /// Surviving faces, lower index first.
    pub keep: (usize, usize),
    /// Faces to detach, sorted ascending.
    pub detach: Vec<usize>,
    /// Whether the surviving pair traverses the edge in the same direction.
    pub inconsistent: bool,
    /// Angle between the surviving faces' normals, in radians.
    pub deviation: f64,
}

impl EdgeResolution {
    fn beats(&self, other: &Self) -> bool {
        if self.inconsistent != other.inconsistent {
            return !self.inconsistent;
        }
        if self.detach.len() != other.detach.len() {
            return self.detach.len() < other.detach.len();
        }
        self.deviation < other.deviation - DEVIATION_TOLERANCE
    }
}

/// Decide which two faces of an over-shared edge survive.
///
/// Returns `None` unless the edge has at least three faces.
#[must_use]
pub fn plan_edge_resolution(mesh: &MeshGraph, edge: EdgeKey) -> Option<EdgeResolution> {
    let (a, b) = edge.vertices();
    let mut faces = mesh.faces_on_edge(a, b).to_vec();
    if faces.len() < 3 {
        return None;
    }
    faces.sort_unstable();

    let normals: Vec<_> = faces.iter().map(|&f| mesh.face_normal(f)).collect();
    let mut best: Option<EdgeResolution> = None;
    for i in 0..faces.len() {
        for j in i + 1..faces.len() {
            let keep = (faces[i], faces[j]);
            let direction = |f: usize| mesh.faces()[f].traverses(a, b);
            let deviation = match (normals[i], normals[j]) {
                (Some(ni), Some(nj)) => ni.dot(&nj).clamp(-1.0, 1.0).acos(),
                _ => std::f64::consts::PI,
            };
            let candidate = EdgeResolution {
                keep,
                detach: flood_detached(mesh, &faces, keep),
                inconsistent: direction(keep.0) == direction(keep.1),
                deviation,
            };
            if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Faces on the edge other than `keep`, grown across two-face edges.
fn flood_detached(mesh: &MeshGraph, edge_faces: &[usize], keep: (usize, usize)) -> Vec<usize> {
    let kept = |f: usize| f == keep.0 || f == keep.1;
    let mut detach: HashSet<usize> = edge_faces.iter().copied().filter(|&f| !kept(f)).collect();
    let mut queue: VecDeque<usize> = detach.iter().copied().collect();
    while let Some(f) = queue.pop_front() {
        for (u, v) in mesh.faces()[f].directed_edges() {
            let shared = mesh.faces_on_edge(u, v);
            if shared.len() != 2 {
                continue;
            }
            let g = if shared[0] == f { shared[1] } else { shared[0] };
            if !kept(g) && detach.insert(g) {
                queue.push_back(g);
            }
        }
    }
    let mut faces: Vec<usize> = detach.into_iter().collect();
    faces.sort_unstable();
    faces
}

/// Resolve one over-shared edge by detaching all but its surviving pair.
///
/// Returns `None` if the edge has fewer than three faces.
///
/// # Errors
///
/// Propagates mesh errors from face removal.
pub fn resolve_non_manifold_edge(
    mesh: &mut MeshGraph,
    edge: EdgeKey,
) -> RepairResult<Option<DetachedFragment>> {
    let Some(plan) = plan_edge_resolution(mesh, edge) else {
        return Ok(None);
    };
    let fragment = mesh.extract_faces(&plan.detach);
    mesh.remove_faces(&plan.detach)?;

    warn!(
        "Detached {} faces from non-manifold edge {} (kept faces {} and {})",
        plan.detach.len(),
        edge,
        plan.keep.0,
        plan.keep.1
    );
    Ok(Some(DetachedFragment {
        source_edge: edge,
        mesh: fragment,
    }))
}

/// Resolve every over-shared edge, lowest edge first.
///
/// Each resolution removes at least one face, so this terminates after at
/// most `face_count` iterations.
///
/// # Errors
///
/// Propagates mesh errors from face removal.
pub fn resolve_non_manifold_edges(mesh: &mut MeshGraph) -> RepairResult<Vec<DetachedFragment>> {
    let mut fragments = Vec::new();
    for _ in 0..=mesh.face_count() {
        let next = mesh.adjacency().over_shared_edges().min();
        let Some(edge) = next else {
            break;
        };
        match resolve_non_manifold_edge(mesh, edge)? {
            Some(fragment) => fragments.push(fragment),
            None => break,
        }
    }
    if !fragments.is_empty() {
        debug!("Resolved {} non-manifold edges", fragments.len());
    }
    Ok(fragments)
}
