//! Error types for curve construction.

use thiserror::Error;

/// Errors that can occur while building curve primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// A numeric parameter is outside its valid domain.
    ///
    /// Parameters are never clamped silently: a span of zero, a negative
    /// rise, a curvature outside `[0, 1]` or a non-finite value all land here.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameters {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Too few points to form the requested path.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },
}

impl CurveError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            parameter,
            reason: reason.into(),
        }
    }

    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<f64, CurveError> {
    if !value.is_finite() {
        return Err(CurveError::invalid(parameter, format!("{value} is not finite")));
    }
    if value <= 0.0 {
        return Err(CurveError::invalid(
            parameter,
            format!("{value} must be positive"),
        ));
    }
    Ok(value)
}

/// Reject values outside the closed unit interval.
pub(crate) fn require_unit(parameter: &'static str, value: f64) -> Result<f64, CurveError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CurveError::invalid(
            parameter,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(value)
}

/// Reject segment counts below the tessellation minimum.
pub(crate) fn require_segments(segments: usize, minimum: usize) -> Result<usize, CurveError> {
    if segments < minimum {
        return Err(CurveError::invalid(
            "segments",
            format!("{segments} is below the minimum of {minimum}"),
        ));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::invalid("span", "0 must be positive");
        assert_eq!(err.to_string(), "invalid parameter `span`: 0 must be positive");

        let err = CurveError::insufficient_points(2, 1);
        assert!(err.to_string().contains("need at least 2"));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("span", 1.0).is_ok());
        assert!(require_positive("span", 0.0).is_err());
        assert!(require_positive("span", -2.0).is_err());
        assert!(require_positive("span", f64::NAN).is_err());
        assert!(require_positive("span", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_unit() {
        assert!(require_unit("curvature", 0.0).is_ok());
        assert!(require_unit("curvature", 1.0).is_ok());
        assert!(require_unit("curvature", 1.01).is_err());
        assert!(require_unit("curvature", -0.1).is_err());
    }

    #[test]
    fn test_require_segments() {
        assert_eq!(require_segments(3, 3), Ok(3));
        assert!(require_segments(2, 3).is_err());
    }
}
