//! Multi-pass manifold repair.
//!
//! Each pass runs the same fixed sequence:
//!
//! 1. Collapse duplicate vertices and drop isolated edges
//! 2. Fill holes
//! 3. Unify winding, then turn inside-out closed regions outward
//! 4. Detach faces from non-manifold edges
//! 5. Remove unreferenced vertices
//!
//! Passes repeat until one makes no change or the pass limit is reached.

use hashbrown::HashSet;
use mesh_types::{EdgeKey, MeshGraph};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::classify::non_manifold_edges;
use crate::duplicates::{collapse_duplicate_groups, find_duplicate_groups};
use crate::holes::{fill_boundary_loop, walk_boundaries};
use crate::nonmanifold::{DetachedFragment, resolve_non_manifold_edges};
use crate::winding::{find_flipped_faces, flip_faces, orient_outward};
use crate::{RepairError, RepairResult};

/// Configuration for [`repair`].
///
/// Distances are in mesh units.
///
/// # Example
///
/// ```
/// use mesh_repair::RepairOptions;
///
/// let options = RepairOptions::default()
///     .with_weld_epsilon(1e-4)
///     .with_max_passes(5);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairOptions {
    /// Maximum number of passes.
    ///
    /// Default: `3`
    pub max_passes: usize,

    /// Vertices within this distance are collapsed into one.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Boundary walks longer than this abort repair.
    ///
    /// Default: `100_000`
    pub max_loop_length: usize,

    /// Holes with more edges than this are left open.
    ///
    /// Default: `10_000`
    pub max_hole_edges: usize,

    /// Whether to fill boundary loops.
    ///
    /// Default: `true`
    pub fill_holes: bool,

    /// Whether to flip faces that disagree with their region.
    ///
    /// Default: `true`
    pub fix_winding: bool,

    /// Whether to reverse closed regions with negative volume.
    ///
    /// Default: `true`
    pub orient_outward: bool,

    /// Whether to drop loose edges no face uses.
    ///
    /// Default: `true`
    pub remove_isolated_edges: bool,

    /// Whether to remove unreferenced vertices at the end of each pass.
    ///
    /// Default: `true`
    pub remove_unreferenced: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            max_passes: 3,
            weld_epsilon: 1e-6,
            max_loop_length: 100_000,
            max_hole_edges: 10_000,
            fill_holes: true,
            fix_winding: true,
            orient_outward: true,
            remove_isolated_edges: true,
            remove_unreferenced: true,
        }
    }
}

impl RepairOptions {
    /// Options for assembled architectural fragments.
    ///
    /// Welds generously so fragment seams snap together.
    #[must_use]
    pub fn for_assembly() -> Self {
        Self {
            weld_epsilon: 1e-4,
            max_passes: 4,
            ..Default::default()
        }
    }

    /// Options for CAD-exact input.
    ///
    /// Only exactly coincident vertices are welded and large holes are
    /// assumed intentional.
    #[must_use]
    pub fn for_cad() -> Self {
        Self {
            weld_epsilon: 1e-9,
            max_hole_edges: 64,
            ..Default::default()
        }
    }

    /// Options for preparing a mesh for 3D printing.
    #[must_use]
    pub fn for_printing() -> Self {
        Self {
            weld_epsilon: 1e-3,
            max_passes: 5,
            ..Default::default()
        }
    }

    /// Set the maximum number of passes.
    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Set the vertex welding distance.
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

    /// Set the largest hole that will be filled.
    #[must_use]
    pub fn with_max_hole_edges(mut self, edges: usize) -> Self {
        self.max_hole_edges = edges;
        self
    }

    /// Enable or disable hole filling.
    #[must_use]
    pub fn with_fill_holes(mut self, fill: bool) -> Self {
        self.fill_holes = fill;
        self
    }

    /// Enable or disable winding fixes and outward orientation together.
    #[must_use]
    pub fn with_fix_winding(mut self, fix: bool) -> Self {
        self.fix_winding = fix;
        self.orient_outward = fix;
        self
    }

    /// Enable or disable unreferenced vertex removal.
    #[must_use]
    pub fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }

    /// Check the options are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::InvalidOptions`] if `max_passes` is zero,
    /// `weld_epsilon` is negative or not finite, or `max_loop_length` is
    /// below 3.
    pub fn validate(&self) -> RepairResult<()> {
        if self.max_passes == 0 {
            return Err(RepairError::invalid_options("max_passes must be at least 1"));
        }
        if !(self.weld_epsilon.is_finite() && self.weld_epsilon >= 0.0) {
            return Err(RepairError::invalid_options(format!(
                "weld_epsilon must be finite and non-negative, got {}",
                self.weld_epsilon
            )));
        }
        if self.max_loop_length < 3 {
            return Err(RepairError::invalid_options(format!(
                "max_loop_length must be at least 3, got {}",
                self.max_loop_length
            )));
        }
        Ok(())
    }
}

/// What [`repair`] did.
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    /// Vertices before repair.
    pub initial_vertices: usize,
    /// Faces before repair.
    pub initial_faces: usize,
    /// Vertices after repair.
    pub final_vertices: usize,
    /// Faces after repair.
    pub final_faces: usize,
    /// Passes that ran.
    pub passes: usize,
    /// Whether the last pass made no changes.
    pub converged: bool,
    /// Duplicate vertex groups collapsed.
    pub duplicate_groups_collapsed: usize,
    /// Vertices merged away by collapsing.
    pub vertices_merged: usize,
    /// Faces dropped because collapsing repeated a vertex.
    pub degenerate_faces_removed: usize,
    /// Loose edges removed.
    pub isolated_edges_removed: usize,
    /// Holes filled.
    pub holes_filled: usize,
    /// Triangles added by hole filling.
    pub hole_faces_added: usize,
    /// Holes left open in the last pass because they were too large.
    pub holes_skipped: usize,
    /// Boundary chains that could not be closed, from the last walk.
    pub open_chains: Vec<Vec<u32>>,
    /// Faces flipped to agree with their region.
    pub faces_flipped: usize,
    /// Closed regions turned outward.
    pub regions_reoriented: usize,
    /// Non-manifold edges resolved by detaching faces.
    pub non_manifold_edges_resolved: usize,
    /// Faces cut away from non-manifold edges.
    pub detached_fragments: Vec<DetachedFragment>,
    /// Unreferenced vertices removed.
    pub unreferenced_removed: usize,
}

impl RepairReport {
    fn start(mesh: &MeshGraph) -> Self {
        Self {
            initial_vertices: mesh.vertex_count(),
            initial_faces: mesh.face_count(),
            ..Self::default()
        }
    }

    fn finish(&mut self, mesh: &MeshGraph) {
        self.final_vertices = mesh.vertex_count();
        self.final_faces = mesh.face_count();
    }

    /// Total number of individual fixes applied.
    #[must_use]
    pub fn fix_count(&self) -> usize {
        self.vertices_merged
            + self.degenerate_faces_removed
            + self.isolated_edges_removed
            + self.holes_filled
            + self.faces_flipped
            + self.regions_reoriented
            + self.non_manifold_edges_resolved
            + self.unreferenced_removed
    }

    /// Check if any repairs were performed.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.fix_count() > 0
    }
}

impl std::fmt::Display for RepairReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repair ({} passes{}): {} verts ({} merged, {} unreferenced), {} faces \
             ({} holes filled, {} flipped, {} detached, {} degenerate)",
            self.passes,
            if self.converged { "" } else { ", not converged" },
            self.final_vertices,
            self.vertices_merged,
            self.unreferenced_removed,
            self.final_faces,
            self.holes_filled,
            self.faces_flipped,
            self.detached_fragments.len(),
            self.degenerate_faces_removed
        )
    }
}

/// Repair a mesh in place.
///
/// Runs passes until one makes no change or `options.max_passes` is
/// reached. On success the mesh has no non-manifold edges. Defects repair
/// cannot remove (open chains, oversize holes, bowtie vertices) are
/// reported, not treated as errors.
///
/// # Errors
///
/// - [`RepairError::InvalidOptions`] for bad options (mesh untouched)
/// - [`RepairError::UnclosedBoundary`] if a boundary walk exceeds
///   `max_loop_length`; the error carries the partial report
/// - [`RepairError::IrreparableTopology`] if non-manifold edges remain
///   after the last pass
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{classify, repair, RepairOptions};
///
/// let mut mesh = unit_cube();
/// mesh.remove_face(1).unwrap();
/// mesh.flip_face(0).unwrap();
///
/// let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
/// assert_eq!(report.holes_filled, 1);
/// assert_eq!(report.faces_flipped, 1);
/// assert!(classify(&mesh).unwrap().is_printable());
/// ```
pub fn repair(mesh: &mut MeshGraph, options: &RepairOptions) -> RepairResult<RepairReport> {
    options.validate()?;
    let mut report = RepairReport::start(mesh);
    info!(
        "Repairing mesh with {} vertices and {} faces",
        report.initial_vertices, report.initial_faces
    );

    for pass in 1..=options.max_passes {
        let before = report.fix_count();
        if let Err(err) = run_pass(mesh, options, &mut report) {
            report.passes = pass;
            report.finish(mesh);
            return Err(err.with_report(&report));
        }
        report.passes = pass;
        let changes = report.fix_count() - before;
        info!("Repair pass {} applied {} fixes", pass, changes);
        if changes == 0 {
            report.converged = true;
            break;
        }
    }
    report.finish(mesh);

    let remaining = non_manifold_edges(mesh);
    if !remaining.is_empty() {
        warn!(
            "{} non-manifold edges remain after {} passes",
            remaining.len(),
            report.passes
        );
        return Err(RepairError::IrreparableTopology {
            remaining,
            passes: report.passes,
            report: Box::new(report),
        });
    }

    info!("{}", report);
    Ok(report)
}

fn run_pass(
    mesh: &mut MeshGraph,
    options: &RepairOptions,
    report: &mut RepairReport,
) -> RepairResult<()> {
    let groups = find_duplicate_groups(mesh, options.weld_epsilon);
    if !groups.is_empty() {
        let collapse = collapse_duplicate_groups(mesh, &groups)?;
        report.duplicate_groups_collapsed += collapse.groups;
        report.vertices_merged += collapse.vertices_merged;
        report.degenerate_faces_removed += collapse.degenerate_faces_removed;
    }
    if options.remove_isolated_edges {
        let isolated: HashSet<EdgeKey> = mesh.adjacency().isolated_edges().collect();
        if !isolated.is_empty() {
            report.isolated_edges_removed +=
                mesh.retain_loose_edges(|edge| !isolated.contains(&edge));
        }
    }

    if options.fill_holes {
        let walk = walk_boundaries(mesh, options.max_loop_length)?;
        report.holes_skipped = 0;
        for hole in &walk.loops {
            if hole.edge_count() > options.max_hole_edges {
                warn!(
                    "Skipping large hole with {} edges (max: {})",
                    hole.edge_count(),
                    options.max_hole_edges
                );
                report.holes_skipped += 1;
                continue;
            }
            report.hole_faces_added += fill_boundary_loop(mesh, hole)?;
            report.holes_filled += 1;
        }
        report.open_chains = walk.open_chains;
    }

    if options.fix_winding {
        let flipped = find_flipped_faces(mesh);
        report.faces_flipped += flip_faces(mesh, &flipped)?;
    }
    if options.orient_outward {
        report.regions_reoriented += orient_outward(mesh)?;
    }

    let fragments = resolve_non_manifold_edges(mesh)?;
    report.non_manifold_edges_resolved += fragments.len();
    report.detached_fragments.extend(fragments);

    if options.remove_unreferenced {
        report.unreferenced_removed += mesh.remove_unreferenced_vertices();
    }

    debug!(
        "Pass state: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, Point3, Vector3};

    fn open_box() -> MeshGraph {
        let mut mesh = unit_cube();
        mesh.remove_face(1).unwrap();
        mesh
    }

    #[test]
    fn test_holes_pinched_at_a_vertex_fill_without_detaching() {
        // Square and triangle sharing only vertex 5
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let mut mesh =
            MeshGraph::from_polygons(&points, vec![vec![0, 1, 5, 4], vec![5, 2, 3]]).unwrap();

        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.holes_filled, 2);
        assert_eq!(report.hole_faces_added, 3);
        assert!(report.detached_fragments.is_empty());
        assert_eq!(report.non_manifold_edges_resolved, 0);
        assert_eq!(mesh.face_count(), 2 + 3);
        assert!(mesh.adjacency().is_watertight());
    }

    #[test]
    fn test_clean_mesh_untouched() {
        let mut mesh = unit_cube();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert!(!report.had_changes());
        assert!(report.converged);
        assert_eq!(report.passes, 1);
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_open_box_gets_closed() {
        let mut mesh = open_box();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.holes_filled, 1);
        assert_eq!(report.hole_faces_added, 2);
        assert_eq!(mesh.face_count(), 7);
        assert_eq!(mesh.adjacency().boundary_edge_count(), 0);
        assert!(classify(&mesh).unwrap().is_printable());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cubes_sharing_corner_position() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(1.0, 1.0, 1.0));
        mesh.append(&other);
        assert_eq!(mesh.vertex_count(), 16);

        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.duplicate_groups_collapsed, 1);
        assert_eq!(report.vertices_merged, 1);
        assert_eq!(mesh.vertex_count(), 15);
        assert_eq!(mesh.face_count(), 12);
        // The shared corner is a bowtie vertex, which repair reports but keeps
        let after = classify(&mesh).unwrap();
        assert_eq!(after.non_manifold_vertices.len(), 1);
        assert!(after.non_manifold_edges.is_empty());
    }

    #[test]
    fn test_single_flipped_face() {
        let mut mesh = unit_cube();
        mesh.flip_face(4).unwrap();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.faces_flipped, 1);
        assert_eq!(report.regions_reoriented, 0);
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inside_out_cube_reoriented() {
        let mut mesh = unit_cube();
        mesh.flip_all();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.faces_flipped, 0);
        assert_eq!(report.regions_reoriented, 1);
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fin_detached_and_reported() {
        let mut mesh = unit_cube();
        let x = mesh.add_vertex(Point3::new(0.5, 1.0, 2.0));
        mesh.add_face(&[6, 7, x]).unwrap();

        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.non_manifold_edges_resolved, 1);
        assert_eq!(report.detached_fragments.len(), 1);
        assert_eq!(report.detached_fragments[0].face_count(), 1);
        assert_eq!(report.unreferenced_removed, 1);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert!(classify(&mesh).unwrap().is_printable());
    }

    #[test]
    fn test_unclosed_boundary_carries_report() {
        let mut mesh = open_box();
        let options = RepairOptions::default().with_max_loop_length(3);
        let err = repair(&mut mesh, &options).unwrap_err();
        assert!(matches!(err, RepairError::UnclosedBoundary { limit: 3, .. }));
        let report = err.report().unwrap();
        assert_eq!(report.passes, 1);
        assert_eq!(report.holes_filled, 0);
    }

    #[test]
    fn test_isolated_edges_removed() {
        let mut mesh = unit_cube();
        let v = mesh.add_vertex(Point3::new(5.0, 0.0, 0.0));
        mesh.add_edge(0, v).unwrap();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.isolated_edges_removed, 1);
        assert_eq!(report.unreferenced_removed, 1);
        assert!(mesh.loose_edges().is_empty());
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_oversize_hole_skipped() {
        let mut mesh = open_box();
        let options = RepairOptions::default().with_max_hole_edges(3);
        let report = repair(&mut mesh, &options).unwrap();
        assert_eq!(report.holes_filled, 0);
        assert_eq!(report.holes_skipped, 1);
        assert_eq!(mesh.face_count(), 5);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut mesh = open_box();
        mesh.flip_face(2).unwrap();
        repair(&mut mesh, &RepairOptions::default()).unwrap();
        let second = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(second.fix_count(), 0);
        assert!(second.converged);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut mesh = unit_cube();
        assert!(repair(&mut mesh, &RepairOptions::default().with_max_passes(0)).is_err());
        assert!(repair(&mut mesh, &RepairOptions::default().with_weld_epsilon(-1.0)).is_err());
        assert!(RepairOptions::for_cad().validate().is_ok());
        assert!(RepairOptions::for_printing().validate().is_ok());
        assert!(RepairOptions::for_assembly().validate().is_ok());
    }

    #[test]
    fn test_report_display() {
        let mut mesh = open_box();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        let text = report.to_string();
        assert!(text.contains("1 holes filled"));
    }
}
