//! Rib vaults.

use std::f64::consts::TAU;

use curve_types::{CurvePath, pointed_arch_half};
use mesh_from_curves::{LoftOptions, loft};
use mesh_repair::find_duplicate_groups;
use mesh_types::MeshGraph;
use nalgebra::{Isometry3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerateResult, require_count, require_positive};
use crate::structure::{Structure, StructureKind};

/// Parameters for [`generate_vault`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VaultParams {
    /// Distance between opposite springing points.
    pub span: f64,
    /// Height of the crown above the springing points.
    pub height: f64,
    /// Number of ribs radiating from the crown (≥ 3).
    pub rib_count: usize,
    /// Points sampled along each rib, springing to crown (≥ 3).
    pub segments: usize,
}

impl Default for VaultParams {
    fn default() -> Self {
        Self {
            span: 4.0,
            height: 3.0,
            rib_count: 4,
            segments: 8,
        }
    }
}

impl VaultParams {
    /// Vault of the given span and height with default rib layout.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// for a non-positive span or height.
    pub fn new(span: f64, height: f64) -> GenerateResult<Self> {
        let params = Self {
            span,
            height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the number of ribs.
    #[must_use]
    pub fn with_rib_count(mut self, rib_count: usize) -> Self {
        self.rib_count = rib_count;
        self
    }

    /// Set the number of points per rib.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// naming the first parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("span", self.span)?;
        require_positive("height", self.height)?;
        require_count("rib_count", self.rib_count, 3)?;
        require_count("segments", self.segments, 3)?;
        Ok(())
    }
}

/// Rib curves from each springing point up to the shared crown.
///
/// Rib `k` is the rising half of a pointed arch turned `k / rib_count` of
/// a full turn about Z; the crown sits at `(0, 0, height)`.
///
/// # Errors
///
/// Returns an error if the parameters are invalid.
pub fn vault_ribs(params: &VaultParams) -> GenerateResult<Vec<CurvePath>> {
    params.validate()?;
    let rib = pointed_arch_half(params.span, params.height, params.segments)?;
    Ok((0..params.rib_count)
        .map(|k| {
            let angle = TAU * k as f64 / params.rib_count as f64;
            rib.transformed(&Isometry3::rotation(Vector3::z() * angle))
        })
        .collect())
}

/// Build a rib vault.
///
/// Neighbouring ribs are lofted into panels that face up and out, and the
/// panels are stitched along shared ribs and at the crown with vertex
/// merges. The result is a single open sheet with disc topology: its only
/// boundary is the ring of edges between springing points.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`](crate::GenerateError) for
/// invalid parameters, or a mesh error if a seam cannot be merged.
///
/// # Example
///
/// ```
/// use mesh_gothic::{VaultParams, generate_vault};
///
/// let vault = generate_vault(&VaultParams::default()).unwrap();
/// assert_eq!(vault.elements.len(), 4);
/// assert_eq!(vault.mesh.adjacency().boundary_edge_count(), 4);
/// ```
pub fn generate_vault(params: &VaultParams) -> GenerateResult<Structure> {
    let ribs = vault_ribs(params)?;
    let n = ribs.len();
    let mut structure = Structure::new(StructureKind::RibVault);
    for k in 0..n {
        let panel = loft(
            &[ribs[(k + 1) % n].clone(), ribs[k].clone()],
            &LoftOptions::default(),
        )?;
        structure.add_part(format!("panel-{k}"), &panel);
    }

    let welded = weld_seams(&mut structure.mesh, params.span.max(params.height))?;
    debug!(
        "Rib vault: {n} panels, {welded} seam vertices merged, {} faces",
        structure.mesh.face_count()
    );
    Ok(structure)
}

/// Merge coincident panel vertices. Returns how many were merged away.
fn weld_seams(mesh: &mut MeshGraph, extent: f64) -> GenerateResult<usize> {
    let groups = find_duplicate_groups(mesh, 1e-9 * extent);
    let mut merged = 0;
    for group in &groups {
        for member in group.redundant() {
            mesh.merge_vertices(group.representative, member)?;
            merged += 1;
        }
    }
    mesh.remove_unreferenced_vertices();
    Ok(merged)
}
