//! Boundary walking and hole filling.
//!
//! A hole is a closed loop of boundary edges (edges with exactly one face).
//! Boundary edges that cannot be chained into a loop, typically because
//! they end at a non-manifold edge, are reported as open chains instead.
//!
//! Convex holes are fanned from one of the loop's own corners rather than
//! from an added centroid vertex, so a loop of `L` vertices always gains
//! `L - 2` triangles and no new vertices.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::holes::{fill_holes, walk_boundaries};
//!
//! // A box missing its top face
//! let mut mesh = unit_cube();
//! mesh.remove_face(1).unwrap();
//!
//! let walk = walk_boundaries(&mesh, 100).unwrap();
//! assert_eq!(walk.loops.len(), 1);
//! assert_eq!(walk.loops[0].edge_count(), 4);
//!
//! let summary = fill_holes(&mut mesh, 100, 100).unwrap();
//! assert_eq!(summary.filled, 1);
//! assert!(mesh.adjacency().is_watertight());
//! ```

use hashbrown::{HashMap, HashSet};
use mesh_types::{EdgeKey, MeshError, MeshGraph, Point3, Triangle, Vector3};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RepairError, RepairResult};

/// A closed loop of boundary edges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryLoop {
    /// Ordered list of vertex indices forming the loop; the closing edge
    /// runs from the last vertex back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if this is a valid boundary loop.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// The loop's edges, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Every boundary edge of a mesh, grouped into loops and open chains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryWalk {
    /// Closed loops (holes).
    pub loops: Vec<BoundaryLoop>,
    /// Boundary paths that dead-end, as ordered vertex lists.
    pub open_chains: Vec<Vec<u32>>,
}

impl BoundaryWalk {
    /// Whether the mesh has no boundary edges at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty() && self.open_chains.is_empty()
    }
}

/// How a hole was triangulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// Convex loop, fanned from one corner.
    Fan,
    /// Concave loop, ear-clipped.
    EarClip,
}

/// Triangles covering one boundary loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleTriangulation {
    /// New faces, wound against the neighbouring faces.
    pub triangles: Vec<[u32; 3]>,
    /// Which strategy produced them.
    pub method: FillMethod,
}

/// Outcome of [`fill_holes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleFillSummary {
    /// Loops that were filled.
    pub filled: usize,
    /// Triangles added across all filled loops.
    pub faces_added: usize,
    /// Loops left open because they exceed the edge limit.
    pub skipped: usize,
    /// Open chains found (never filled).
    pub open_chains: usize,
}

/// Walk every boundary edge exactly once, chaining edges into loops.
///
/// Edges are visited in sorted order. At a vertex with several unused
/// boundary edges the walk prefers the one that closes the current loop.
/// When the walk returns to a vertex it already passed (two holes pinched
/// together at one vertex), the lobe walked since then is split off as its
/// own loop, so no loop repeats a vertex.
/// A walk that dead-ends is extended backwards from its start and reported
/// as an open chain.
///
/// # Errors
///
/// Returns [`RepairError::UnclosedBoundary`] if a walk visits more than
/// `max_loop_length` vertices.
pub fn walk_boundaries(mesh: &MeshGraph, max_loop_length: usize) -> RepairResult<BoundaryWalk> {
    let adjacency = mesh.adjacency();
    let mut boundary: Vec<EdgeKey> = adjacency.boundary_edges().collect();
    if boundary.is_empty() {
        return Ok(BoundaryWalk::default());
    }
    boundary.sort_unstable();
    debug!("Found {} boundary edges", boundary.len());

    let mut incident: HashMap<u32, Vec<EdgeKey>> = HashMap::new();
    for &edge in &boundary {
        incident.entry(edge.low()).or_default().push(edge);
        incident.entry(edge.high()).or_default().push(edge);
    }

    let mut used: HashSet<EdgeKey> = HashSet::with_capacity(boundary.len());
    let mut walk = BoundaryWalk::default();
    let too_long = |start: u32, walked: Vec<u32>| RepairError::UnclosedBoundary {
        start,
        walked,
        limit: max_loop_length,
        report: None,
    };

    for &edge in &boundary {
        if !used.insert(edge) {
            continue;
        }
        let start = edge.low();
        let mut path = vec![start];
        let mut position: HashMap<u32, usize> = HashMap::from([(start, 0)]);
        let mut current = edge.high();

        let closed = loop {
            if current == start {
                break true;
            }
            if let Some(&pos) = position.get(&current) {
                // Pinched boundary: the lobe since the last visit is its own loop
                let lobe = path.split_off(pos + 1);
                for v in &lobe {
                    position.remove(v);
                }
                let mut vertices = Vec::with_capacity(lobe.len() + 1);
                vertices.push(current);
                vertices.extend(lobe);
                debug!("Split {}-vertex loop off at pinch vertex {current}", vertices.len());
                walk.loops.push(BoundaryLoop { vertices });
            } else {
                position.insert(current, path.len());
                path.push(current);
                if path.len() > max_loop_length {
                    return Err(too_long(start, path));
                }
            }
            let Some(next) = next_boundary_edge(&incident, &used, current, Some(start)) else {
                break false;
            };
            used.insert(next);
            match next.other(current) {
                Some(v) => current = v,
                None => break false,
            }
        };

        if closed {
            walk.loops.push(BoundaryLoop { vertices: path });
            continue;
        }

        let mut tail = Vec::new();
        let mut current = start;
        while let Some(next) = next_boundary_edge(&incident, &used, current, None) {
            used.insert(next);
            let Some(v) = next.other(current) else { break };
            current = v;
            tail.push(current);
            if path.len() + tail.len() > max_loop_length {
                tail.reverse();
                tail.extend(path);
                return Err(too_long(start, tail));
            }
        }
        tail.reverse();
        tail.extend(path);
        warn!(
            "Boundary chain of {} vertices from {} to {} does not close",
            tail.len(),
            tail.first().copied().unwrap_or(start),
            tail.last().copied().unwrap_or(start)
        );
        walk.open_chains.push(tail);
    }

    info!(
        "Walked boundary into {} loops (sizes: {:?}) and {} open chains",
        walk.loops.len(),
        walk.loops.iter().map(BoundaryLoop::edge_count).collect::<Vec<_>>(),
        walk.open_chains.len()
    );
    Ok(walk)
}

fn next_boundary_edge(
    incident: &HashMap<u32, Vec<EdgeKey>>,
    used: &HashSet<EdgeKey>,
    at: u32,
    prefer: Option<u32>,
) -> Option<EdgeKey> {
    let candidates = incident.get(&at)?;
    let mut unused = candidates.iter().copied().filter(|e| !used.contains(e));
    let first = unused.next()?;
    let Some(target) = prefer else {
        return Some(first);
    };
    if first.other(at) == Some(target) {
        return Some(first);
    }
    Some(
        unused
            .find(|e| e.other(at) == Some(target))
            .unwrap_or(first),
    )
}

/// Order a loop so that filling it continues the winding of its neighbours.
///
/// Each loop edge votes with the direction its single face traverses it;
/// when most faces run along the loop, the loop is reversed.
#[must_use]
pub fn orient_for_fill(mesh: &MeshGraph, boundary: &BoundaryLoop) -> Vec<u32> {
    let (mut along, mut against) = (0usize, 0usize);
    for (a, b) in boundary.edges() {
        let faces = mesh.faces_on_edge(a, b);
        let Some(&f) = faces.first() else { continue };
        match mesh.faces()[f].traverses(a, b) {
            Some(true) => along += 1,
            Some(false) => against += 1,
            None => {}
        }
    }
    let mut vertices = boundary.vertices.clone();
    if along > against {
        vertices.reverse();
    }
    vertices
}

/// Triangulate a boundary loop.
///
/// The loop is first oriented against its neighbouring faces. Convex loops
/// are fanned from their first strictly convex corner, never from an added
/// centroid vertex, so every triangle uses loop vertices only. Anything
/// else is ear-clipped in the loop's best-fit plane, falling back to a fan
/// if no ear can be found. Either way a loop of `L` vertices yields `L - 2`
/// triangles.
///
/// # Errors
///
/// - [`MeshError::InvalidArgument`] for a loop of fewer than 3 vertices
/// - [`MeshError::VertexOutOfRange`] if the loop names a missing vertex
pub fn triangulate_loop(
    mesh: &MeshGraph,
    boundary: &BoundaryLoop,
) -> RepairResult<HoleTriangulation> {
    if !boundary.is_valid() {
        return Err(MeshError::invalid_argument(format!(
            "boundary loop needs at least 3 vertices, got {}",
            boundary.edge_count()
        ))
        .into());
    }
    let vertices = orient_for_fill(mesh, boundary);
    let positions = vertices
        .iter()
        .map(|&v| {
            mesh.position(v).ok_or(MeshError::VertexOutOfRange {
                index: v,
                count: mesh.vertex_count(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = positions.len();
    let centroid = Point3::from(
        positions.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n as f64,
    );
    let normal = compute_hole_normal(&positions, &centroid);

    if let Some(normal) = normal {
        if let Some(apex) = convex_fan_apex(&positions, &normal) {
            let triangles = (1..n - 1)
                .map(|j| {
                    [
                        vertices[apex],
                        vertices[(apex + j) % n],
                        vertices[(apex + j + 1) % n],
                    ]
                })
                .collect();
            debug!("Filled convex hole with {} edges by fan", n);
            return Ok(HoleTriangulation {
                triangles,
                method: FillMethod::Fan,
            });
        }
    }

    let hole_normal = normal.unwrap_or_else(Vector3::z);
    Ok(HoleTriangulation {
        triangles: ear_clip(&vertices, &positions, &hole_normal),
        method: FillMethod::EarClip,
    })
}

/// Triangulate a loop and add the triangles to the mesh.
///
/// Returns the number of faces added.
///
/// # Errors
///
/// See [`triangulate_loop`].
pub fn fill_boundary_loop(mesh: &mut MeshGraph, boundary: &BoundaryLoop) -> RepairResult<usize> {
    let fill = triangulate_loop(mesh, boundary)?;
    for tri in &fill.triangles {
        mesh.add_face(tri)?;
    }
    Ok(fill.triangles.len())
}

/// Fill every hole of at most `max_hole_edges` edges.
///
/// Larger holes are skipped with a warning. Open chains are counted but
/// never filled.
///
/// # Errors
///
/// Returns [`RepairError::UnclosedBoundary`] if a boundary walk exceeds
/// `max_loop_length`, or a mesh error if a fill face cannot be added.
pub fn fill_holes(
    mesh: &mut MeshGraph,
    max_hole_edges: usize,
    max_loop_length: usize,
) -> RepairResult<HoleFillSummary> {
    let walk = walk_boundaries(mesh, max_loop_length)?;
    let mut summary = HoleFillSummary {
        open_chains: walk.open_chains.len(),
        ..HoleFillSummary::default()
    };

    for hole in &walk.loops {
        if hole.edge_count() > max_hole_edges {
            warn!(
                "Skipping large hole with {} edges (max: {})",
                hole.edge_count(),
                max_hole_edges
            );
            summary.skipped += 1;
            continue;
        }
        summary.faces_added += fill_boundary_loop(mesh, hole)?;
        summary.filled += 1;
    }

    if summary.filled > 0 {
        info!(
            "Filled {} holes with {} faces",
            summary.filled, summary.faces_added
        );
    }
    Ok(summary)
}

/// Index of the first strictly convex corner, or `None` if any corner turns
/// the wrong way.
fn convex_fan_apex(positions: &[Point3<f64>], normal: &Vector3<f64>) -> Option<usize> {
    let n = positions.len();
    let scale = positions
        .iter()
        .enumerate()
        .map(|(i, p)| (positions[(i + 1) % n] - p).norm_squared())
        .fold(0.0_f64, f64::max);
    let tolerance = 1e-12 * scale;

    let mut apex = None;
    for i in 0..n {
        let prev = positions[(i + n - 1) % n];
        let next = positions[(i + 1) % n];
        let turn = (positions[i] - prev).cross(&(next - positions[i])).dot(normal);
        if turn < -tolerance {
            return None;
        }
        if turn > tolerance && apex.is_none() {
            apex = Some(i);
        }
    }
    apex.or(Some(0))
}

fn ear_clip(vertices: &[u32], positions: &[Point3<f64>], hole_normal: &Vector3<f64>) -> Vec<[u32; 3]> {
    let n = vertices.len();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let next = remaining[(i + 1) % len];
            is_ear(positions, &remaining, prev, remaining[i], next, hole_normal)
        });
        let Some(i) = ear else {
            warn!(
                "Ear clipping stuck with {} vertices remaining, using fan triangulation",
                len
            );
            break;
        };
        let prev = remaining[(i + len - 1) % len];
        let next = remaining[(i + 1) % len];
        triangles.push([vertices[prev], vertices[remaining[i]], vertices[next]]);
        remaining.remove(i);
    }

    for i in 1..remaining.len() - 1 {
        triangles.push([
            vertices[remaining[0]],
            vertices[remaining[i]],
            vertices[remaining[i + 1]],
        ]);
    }

    debug!(
        "Filled hole with {} edges using {} triangles",
        n,
        triangles.len()
    );
    triangles
}

/// Average normal of a hole boundary, or `None` if the loop has no area.
fn compute_hole_normal(positions: &[Point3<f64>], centroid: &Point3<f64>) -> Option<Vector3<f64>> {
    let n = positions.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let v0 = positions[i] - centroid;
        let v1 = positions[(i + 1) % n] - centroid;
        normal += v0.cross(&v1);
    }
    normal.try_normalize(f64::EPSILON)
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    hole_normal: &Vector3<f64>,
) -> bool {
    let (p_prev, p_curr, p_next) = (positions[prev], positions[curr], positions[next]);

    let Some(tri_normal) = Triangle::new(p_prev, p_curr, p_next).normal() else {
        return false;
    };
    if tri_normal.dot(hole_normal) < 0.0 {
        return false;
    }

    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .all(|&idx| !point_in_triangle_2d(&positions[idx], &p_prev, &p_curr, &p_next, hole_normal))
}

/// Point-in-triangle test after dropping the axis most aligned with `normal`.
fn point_in_triangle_2d(
    p: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let abs = normal.abs();
    let project = |q: &Point3<f64>| {
        if abs.z >= abs.x && abs.z >= abs.y {
            (q.x, q.y)
        } else if abs.y >= abs.x {
            (q.x, q.z)
        } else {
            (q.y, q.z)
        }
    };
    let (p, a, b, c) = (project(p), project(v0), project(v1), project(v2));

    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
