//! Error types for mesh graph operations.

use thiserror::Error;

/// Errors raised by [`MeshGraph`](crate::MeshGraph) mutations.
///
/// Every mutating operation validates its input first; when one of these is
/// returned the mesh has not been modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A face could not be added.
    #[error("invalid face: {reason}")]
    InvalidFace {
        /// Description of what's wrong with the face.
        reason: String,
    },

    /// Merging two vertices would leave a face with a repeated vertex.
    ///
    /// Remove the face first, then merge.
    #[error("merging vertex {removed} into {kept} would degenerate face {face}")]
    DegenerateFace {
        /// Index of the face that would degenerate.
        face: usize,
        /// Surviving vertex.
        kept: u32,
        /// Vertex being merged away.
        removed: u32,
    },

    /// A vertex index is out of bounds.
    #[error("vertex index {index} out of bounds (mesh has {count} vertices)")]
    VertexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// A face index is out of bounds.
    #[error("face index {index} out of bounds (mesh has {count} faces)")]
    FaceOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of faces in the mesh.
        count: usize,
    },

    /// An argument to an edit operation is outside its domain.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Why the argument was rejected.
        reason: String,
    },
}

impl MeshError {
    /// Create an invalid face error.
    #[must_use]
    pub fn invalid_face(reason: impl Into<String>) -> Self {
        Self::InvalidFace {
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Result type for mesh graph operations.
pub type MeshResult<T> = Result<T, MeshError>;
