//! Insertion boundaries and loop correspondence.
//!
//! A weld pairs every vertex of a loop on the target with a vertex of an
//! open loop on the fragment. The pairing is a cyclic shift, possibly
//! reversed, chosen to minimise the total squared distance between paired
//! points.

use hashbrown::HashSet;
use mesh_repair::BoundaryWalk;
use mesh_types::{MeshError, MeshGraph};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// Where on the target a fragment gets attached.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InsertionBoundary {
    /// An ordered loop of target vertices whose consecutive edges (closing
    /// edge included) each border exactly one face.
    Loop(Vec<u32>),
    /// A target face. It is removed and its corner loop used, which is how
    /// an inset face receives a window or an arch foot.
    Face(usize),
}

impl InsertionBoundary {
    /// The target vertices of this boundary, in loop order.
    ///
    /// # Errors
    ///
    /// - [`MergeError::Mesh`] for an out-of-range face or vertex
    /// - [`MergeError::InvalidBoundary`] for a loop shorter than three
    ///   vertices, one that repeats a vertex, or one that leaves the open
    ///   boundary of the target
    pub fn loop_vertices(&self, target: &MeshGraph) -> MergeResult<Vec<u32>> {
        match self {
            Self::Face(index) => target
                .face(*index)
                .map(|face| face.vertices().to_vec())
                .ok_or_else(|| {
                    MergeError::from(MeshError::FaceOutOfRange {
                        index: *index,
                        count: target.face_count(),
                    })
                }),
            Self::Loop(vertices) => {
                check_loop(target, vertices)?;
                Ok(vertices.clone())
            }
        }
    }

    /// The face a weld removes, if any.
    #[must_use]
    pub fn removed_face(&self) -> Option<usize> {
        match self {
            Self::Face(index) => Some(*index),
            Self::Loop(_) => None,
        }
    }
}

fn check_loop(target: &MeshGraph, vertices: &[u32]) -> MergeResult<()> {
    if vertices.len() < 3 {
        return Err(MergeError::invalid_boundary(format!(
            "a loop needs at least 3 vertices, got {}",
            vertices.len()
        )));
    }
    let mut seen = HashSet::with_capacity(vertices.len());
    for &v in vertices {
        if target.position(v).is_none() {
            return Err(MeshError::VertexOutOfRange {
                index: v,
                count: target.vertex_count(),
            }
            .into());
        }
        if !seen.insert(v) {
            return Err(MergeError::invalid_boundary(format!(
                "loop repeats vertex {v}"
            )));
        }
    }
    for (a, b) in cyclic_pairs(vertices) {
        let faces = target.faces_on_edge(a, b).len();
        if faces != 1 {
            return Err(MergeError::invalid_boundary(format!(
                "edge {a}-{b} borders {faces} faces, expected an open boundary edge"
            )));
        }
    }
    Ok(())
}

/// Consecutive pairs of a loop, closing pair included.
pub(crate) fn cyclic_pairs(vertices: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Positions of a list of vertices.
pub(crate) fn loop_positions(mesh: &MeshGraph, vertices: &[u32]) -> MergeResult<Vec<Point3<f64>>> {
    vertices
        .iter()
        .map(|&v| {
            mesh.position(v).ok_or_else(|| {
                MergeError::from(MeshError::VertexOutOfRange {
                    index: v,
                    count: mesh.vertex_count(),
                })
            })
        })
        .collect()
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f64)
}

/// Pick the open loop of the fragment that matches the target loop.
///
/// Only loops with the target's vertex count qualify; among those the one
/// whose centroid is nearest the target's wins, earliest first on ties.
pub(crate) fn nearest_loop(
    fragment: &MeshGraph,
    walk: &BoundaryWalk,
    target_points: &[Point3<f64>],
) -> MergeResult<Vec<u32>> {
    let target_center = centroid(target_points);
    let distance = |vertices: &[u32]| -> MergeResult<f64> {
        let points = loop_positions(fragment, vertices)?;
        Ok((centroid(&points) - target_center).norm_squared())
    };

    let mut best_match: Option<(f64, &[u32])> = None;
    let mut nearest_any: Option<(f64, usize)> = None;
    for boundary in &walk.loops {
        let d = distance(&boundary.vertices)?;
        if nearest_any.is_none_or(|(best, _)| d < best) {
            nearest_any = Some((d, boundary.vertices.len()));
        }
        if boundary.vertices.len() == target_points.len()
            && best_match.is_none_or(|(best, _)| d < best)
        {
            best_match = Some((d, boundary.vertices.as_slice()));
        }
    }

    best_match
        .map(|(_, vertices)| vertices.to_vec())
        .ok_or(MergeError::BoundaryMismatch {
            expected: target_points.len(),
            actual: nearest_any.map_or(0, |(_, len)| len),
        })
}

/// How the fragment loop lines up with the target loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Correspondence {
    /// Fragment loop position paired with target position 0.
    pub offset: usize,
    /// Whether the fragment loop runs backwards relative to the target.
    pub reversed: bool,
    /// Sum of squared distances between paired points.
    pub cost: f64,
}

impl Correspondence {
    /// Fragment loop position paired with target position `i`.
    pub fn index(&self, i: usize, n: usize) -> usize {
        if self.reversed {
            (self.offset + n - i % n) % n
        } else {
            (self.offset + i) % n
        }
    }
}

/// Best cyclic pairing of two equal-length loops.
///
/// Forward pairings are tried before reversed ones and offsets in
/// increasing order; a later candidate must be strictly cheaper to win.
pub(crate) fn correspond(target: &[Point3<f64>], fragment: &[Point3<f64>]) -> Correspondence {
    let n = target.len();
    let mut best = Correspondence {
        offset: 0,
        reversed: false,
        cost: f64::INFINITY,
    };
    for reversed in [false, true] {
        for offset in 0..n {
            let mut candidate = Correspondence {
                offset,
                reversed,
                cost: 0.0,
            };
            candidate.cost = (0..n)
                .map(|i| (target[i] - fragment[candidate.index(i, n)]).norm_squared())
                .sum();
            if candidate.cost < best.cost {
                best = candidate;
            }
        }
    }
    best
}

/// Whether most faces along a loop traverse its edges in loop order.
///
/// `skip` excludes one face from the vote, such as the face a weld is about
/// to remove.
pub(crate) fn runs_along(mesh: &MeshGraph, vertices: &[u32], skip: Option<usize>) -> bool {
    let (mut along, mut against) = (0usize, 0usize);
    for (a, b) in cyclic_pairs(vertices) {
        for &face in mesh.faces_on_edge(a, b) {
            if Some(face) == skip {
                continue;
            }
            match mesh.faces()[face].traverses(a, b) {
                Some(true) => along += 1,
                Some(false) => against += 1,
                None => {}
            }
        }
    }
    along > against
}
