//! Error types for welding and merging.

use mesh_repair::RepairError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that can occur while stitching a fragment onto a mesh.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The fragment has no open boundary loop with as many vertices as the
    /// insertion boundary.
    #[error("insertion boundary has {expected} vertices but the fragment's nearest open loop has {actual}")]
    BoundaryMismatch {
        /// Vertex count of the insertion boundary on the target.
        expected: usize,
        /// Vertex count of the fragment loop closest to it (0 when the
        /// fragment is closed).
        actual: usize,
    },

    /// The insertion boundary does not describe a usable loop on the target.
    #[error("invalid insertion boundary: {reason}")]
    InvalidBoundary {
        /// What's wrong.
        reason: String,
    },

    /// A mesh edit was rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Boundary walking or the final repair pass failed.
    #[error(transparent)]
    Repair(#[from] RepairError),
}

impl MergeError {
    /// Create an invalid boundary error.
    #[must_use]
    pub fn invalid_boundary(reason: impl Into<String>) -> Self {
        Self::InvalidBoundary {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MergeError::BoundaryMismatch {
            expected: 6,
            actual: 8,
        };
        assert_eq!(
            err.to_string(),
            "insertion boundary has 6 vertices but the fragment's nearest open loop has 8"
        );

        let err = MergeError::invalid_boundary("loop repeats vertex 3");
        assert!(err.to_string().contains("vertex 3"));
    }

    #[test]
    fn test_mesh_error_converts() {
        let err: MergeError = MeshError::FaceOutOfRange { index: 9, count: 6 }.into();
        assert!(matches!(err, MergeError::Mesh(_)));
    }
}
