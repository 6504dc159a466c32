//! Error types for surface construction.

use curve_types::CurveError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type for extrude, loft and sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors that can occur while turning curves into surfaces.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SweepError {
    /// A numeric or geometric argument is unusable.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameters {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two sections that must correspond point for point do not.
    #[error("section {section} has {actual} points, expected {expected}")]
    SectionMismatch {
        /// Index of the offending section.
        section: usize,
        /// Point count of the first section.
        expected: usize,
        /// Point count of the offending section.
        actual: usize,
    },

    /// Not enough sections to loft between.
    #[error("loft needs at least {required} sections, got {actual}")]
    TooFewSections {
        /// Minimum number of sections.
        required: usize,
        /// Number supplied.
        actual: usize,
    },

    /// A curve could not be built.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// The mesh rejected a face.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl SweepError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            parameter,
            reason: reason.into(),
        }
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> SweepResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SweepError::invalid(
            parameter,
            format!("{value} must be finite and positive"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SweepError::SectionMismatch {
            section: 2,
            expected: 8,
            actual: 6,
        };
        assert_eq!(err.to_string(), "section 2 has 6 points, expected 8");

        let err = SweepError::invalid("offset", "zero length");
        assert!(err.to_string().contains("`offset`"));
    }

    #[test]
    fn test_from_curve_error() {
        let err: SweepError = CurveError::invalid("radius", "negative").into();
        assert!(matches!(err, SweepError::Curve(_)));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("scale", 0.5).is_ok());
        assert!(require_positive("scale", 0.0).is_err());
        assert!(require_positive("scale", f64::NAN).is_err());
    }
}
