//! Error types for classification and repair.

use mesh_types::{EdgeKey, MeshError};
use thiserror::Error;

use crate::RepairReport;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur while classifying or repairing a mesh.
#[derive(Debug, Error)]
pub enum RepairError {
    /// A boundary walk ran past the loop-length limit without closing.
    ///
    /// This means the boundary is corrupt (or the limit is too small for the
    /// mesh). Repair stops at the first such walk.
    #[error("boundary walk from vertex {start} did not close within {limit} vertices")]
    UnclosedBoundary {
        /// Vertex the walk started from.
        start: u32,
        /// Vertices visited before giving up.
        walked: Vec<u32>,
        /// The configured maximum loop length.
        limit: usize,
        /// What repair had done before the walk failed, when raised by
        /// [`repair`](crate::repair).
        report: Option<Box<RepairReport>>,
    },

    /// Non-manifold edges survived every repair pass.
    #[error("{} non-manifold edge(s) remain after {passes} repair pass(es)", .remaining.len())]
    IrreparableTopology {
        /// Edges that still have three or more faces, or inconsistent winding.
        remaining: Vec<EdgeKey>,
        /// Passes that ran.
        passes: usize,
        /// Everything repair managed to fix.
        report: Box<RepairReport>,
    },

    /// Repair options are out of range.
    #[error("invalid repair options: {reason}")]
    InvalidOptions {
        /// What's wrong.
        reason: String,
    },

    /// A mesh edit was rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl RepairError {
    /// Create an invalid options error.
    #[must_use]
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }

    /// The partial repair report carried by this error, if any.
    #[must_use]
    pub fn report(&self) -> Option<&RepairReport> {
        match self {
            Self::UnclosedBoundary { report, .. } => report.as_deref(),
            Self::IrreparableTopology { report, .. } => Some(report),
            Self::InvalidOptions { .. } | Self::Mesh(_) => None,
        }
    }

    pub(crate) fn with_report(self, partial: &RepairReport) -> Self {
        match self {
            Self::UnclosedBoundary {
                start,
                walked,
                limit,
                report: None,
            } => Self::UnclosedBoundary {
                start,
                walked,
                limit,
                report: Some(Box::new(partial.clone())),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RepairError::UnclosedBoundary {
            start: 4,
            walked: vec![4, 5, 6],
            limit: 3,
            report: None,
        };
        assert_eq!(
            err.to_string(),
            "boundary walk from vertex 4 did not close within 3 vertices"
        );
        assert!(err.report().is_none());

        let err = RepairError::invalid_options("max_passes must be at least 1");
        assert!(err.to_string().contains("max_passes"));
    }

    #[test]
    fn test_with_report_attaches_once() {
        let err = RepairError::UnclosedBoundary {
            start: 0,
            walked: vec![0],
            limit: 3,
            report: None,
        };
        let partial = RepairReport::default();
        let err = err.with_report(&partial);
        assert!(err.report().is_some());
    }
}
