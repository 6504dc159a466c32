//! Weld followed by repair.

use std::fmt;

use mesh_repair::{RepairOptions, RepairReport, repair};
use mesh_types::MeshGraph;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::InsertionBoundary;
use crate::error::MergeResult;
use crate::weld::{WeldReport, weld};

/// Configuration for [`merge`].
///
/// # Example
///
/// ```
/// use mesh_assembly::MergeOptions;
/// use mesh_repair::RepairOptions;
///
/// let options = MergeOptions::default().with_repair(RepairOptions::for_printing());
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeOptions {
    /// Options for the repair pass that follows every weld.
    ///
    /// Default: [`RepairOptions::for_assembly`]
    pub repair: RepairOptions,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            repair: RepairOptions::for_assembly(),
        }
    }
}

impl MergeOptions {
    /// Use different repair options.
    #[must_use]
    pub fn with_repair(mut self, repair: RepairOptions) -> Self {
        self.repair = repair;
        self
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Repair`](crate::MergeError::Repair) if the
    /// repair options are out of range.
    pub fn validate(&self) -> MergeResult<()> {
        self.repair.validate()?;
        Ok(())
    }
}

/// Outcome of [`merge`].
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// What the weld did.
    pub weld: WeldReport,
    /// What the repair pass did afterwards.
    pub repair: RepairReport,
}

impl MergeReport {
    /// Whether the merge changed the target.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.weld.had_changes() || self.repair.had_changes()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {}", self.weld, self.repair)
    }
}

/// Weld `fragment` onto `target` at `boundary`, then repair the result.
///
/// The repair pass always runs, so the merged mesh is either manifold or
/// the call fails with the repairer's error and report.
///
/// # Errors
///
/// - [`MergeError::BoundaryMismatch`](crate::MergeError::BoundaryMismatch)
///   and the other [`weld`] errors, with `target` untouched
/// - [`MergeError::Repair`](crate::MergeError::Repair) if the options are
///   invalid (target untouched) or repair fails after the weld
///
/// # Example
///
/// ```
/// use mesh_assembly::{InsertionBoundary, MergeOptions, merge};
/// use mesh_types::{unit_cube, Vector3};
///
/// // An open tube on top of a cube: repair closes the far end
/// let mut target = unit_cube();
/// let mut tube = unit_cube();
/// tube.remove_faces(&[0, 1]).unwrap();
/// tube.translate(Vector3::z());
///
/// let report = merge(&mut target, &tube, &InsertionBoundary::Face(1), &MergeOptions::default())
///     .unwrap();
/// assert_eq!(report.repair.holes_filled, 1);
/// assert!(target.adjacency().is_watertight());
/// ```
pub fn merge(
    target: &mut MeshGraph,
    fragment: &MeshGraph,
    boundary: &InsertionBoundary,
    options: &MergeOptions,
) -> MergeResult<MergeReport> {
    options.validate()?;
    let weld = weld(target, fragment, boundary)?;
    let repair = repair(target, &options.repair)?;
    let report = MergeReport { weld, repair };
    info!("Merged fragment: {report}");
    Ok(report)
}
