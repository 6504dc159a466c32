//! Welding a fragment's open boundary onto a target loop.

use std::fmt;

use mesh_repair::walk_boundaries;
use mesh_types::MeshGraph;
use tracing::{debug, info};

use crate::boundary::{InsertionBoundary, correspond, loop_positions, nearest_loop, runs_along};
use crate::error::MergeResult;

/// What a [`weld`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeldReport {
    /// Vertices on the insertion boundary, and welded from the fragment.
    pub boundary_vertices: usize,
    /// Face removed from the target to open the boundary, if any.
    pub removed_face: Option<usize>,
    /// Fragment faces appended to the target.
    pub faces_added: usize,
    /// Fragment vertices kept (everything but the welded boundary).
    pub vertices_added: usize,
    /// The fragment loop was paired in reverse order.
    pub reversed: bool,
    /// The fragment's winding was flipped to agree with the target.
    pub flipped: bool,
    /// Largest distance a fragment boundary vertex moved onto its partner.
    pub max_snap_distance: f64,
}

impl WeldReport {
    /// Whether the weld touched the target at all.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.boundary_vertices > 0
    }
}

impl fmt::Display for WeldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weld: {}-vertex boundary, {} faces and {} vertices added, max snap {:.3e}",
            self.boundary_vertices, self.faces_added, self.vertices_added, self.max_snap_distance
        )?;
        if self.flipped {
            write!(f, ", fragment flipped")?;
        }
        Ok(())
    }
}

/// Stitch `fragment` onto `target` at `boundary`.
///
/// The fragment's open boundary loop with the same number of vertices as
/// the insertion boundary, and the centroid nearest to it, is paired with
/// the boundary by the cyclic shift and direction that minimise the total
/// squared distance. If the fragment's faces would run the same way round
/// the seam as the target's, the whole fragment is flipped. Paired fragment
/// vertices are then merged onto the target's (the target keeps its
/// positions) and the rest of the fragment is appended.
///
/// Everything is validated before the target is touched: on error the
/// target is unchanged.
///
/// # Errors
///
/// - [`MergeError::BoundaryMismatch`](crate::MergeError::BoundaryMismatch)
///   if no open fragment loop has the boundary's vertex count
/// - [`MergeError::InvalidBoundary`](crate::MergeError::InvalidBoundary) or
///   [`MergeError::Mesh`](crate::MergeError::Mesh) for a bad insertion
///   boundary
/// - [`MergeError::Repair`](crate::MergeError::Repair) if the fragment's
///   boundary cannot be walked
///
/// # Example
///
/// ```
/// use mesh_assembly::{InsertionBoundary, weld};
/// use mesh_types::{unit_cube, Vector3};
///
/// // A second storey: an open-bottomed box sitting on a cube's lid
/// let mut target = unit_cube();
/// let mut storey = unit_cube();
/// storey.remove_face(0).unwrap();
/// storey.translate(Vector3::z());
///
/// let report = weld(&mut target, &storey, &InsertionBoundary::Face(1)).unwrap();
/// assert_eq!(report.boundary_vertices, 4);
/// assert_eq!(target.vertex_count(), 12);
/// assert!(target.adjacency().is_watertight());
/// assert!((target.signed_volume() - 2.0).abs() < 1e-12);
/// ```
pub fn weld(
    target: &mut MeshGraph,
    fragment: &MeshGraph,
    boundary: &InsertionBoundary,
) -> MergeResult<WeldReport> {
    let target_loop = boundary.loop_vertices(target)?;
    let n = target_loop.len();
    let target_points = loop_positions(target, &target_loop)?;

    let walk = walk_boundaries(fragment, fragment.vertex_count().max(3))?;
    let fragment_loop = nearest_loop(fragment, &walk, &target_points)?;
    let fragment_points = loop_positions(fragment, &fragment_loop)?;

    let pairing = correspond(&target_points, &fragment_points);
    let partners: Vec<u32> = (0..n)
        .map(|i| fragment_loop[pairing.index(i, n)])
        .collect();
    let max_snap_distance = (0..n)
        .map(|i| (target_points[i] - fragment_points[pairing.index(i, n)]).norm())
        .fold(0.0, f64::max);

    // After the weld both sides share every seam edge, so they must
    // traverse it in opposite directions
    let removed_face = boundary.removed_face();
    let flipped =
        runs_along(target, &target_loop, removed_face) == runs_along(fragment, &partners, None);

    debug!(
        "Welding {}-vertex fragment loop onto target (offset {}, reversed {}, flipped {}, cost {:.3e})",
        n, pairing.offset, pairing.reversed, flipped, pairing.cost
    );

    // Mutation starts here; nothing below can fail on validated input
    if let Some(face) = removed_face {
        target.remove_face(face)?;
    }
    let mut piece = fragment.clone();
    if flipped {
        piece.flip_all();
    }
    let offset = target.append(&piece);
    let welded: Vec<u32> = partners.iter().map(|&v| offset + v).collect();
    for (&keep, &remove) in target_loop.iter().zip(&welded) {
        target.merge_vertices(keep, remove)?;
    }
    target.remove_vertices(&welded)?;

    let report = WeldReport {
        boundary_vertices: n,
        removed_face,
        faces_added: fragment.face_count(),
        vertices_added: fragment.vertex_count() - n,
        reversed: pairing.reversed,
        flipped,
        max_snap_distance,
    };
    info!("{report}");
    Ok(report)
}
