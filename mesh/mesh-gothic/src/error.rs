//! Error types for structure generation.

use curve_types::CurveError;
use mesh_assembly::MergeError;
use mesh_from_curves::SweepError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that can occur while generating a structure.
///
/// Parameters are validated before any geometry is built, so a structure
/// is either produced whole or not at all.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A generation parameter is outside its valid domain.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameters {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A curve could not be built.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Extrusion, lofting or sweeping failed.
    #[error(transparent)]
    Sweep(#[from] SweepError),

    /// A mesh edit was rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Stitching fragments together failed.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl GenerateError {
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
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> GenerateResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GenerateError::invalid(
            parameter,
            format!("{value} must be finite and positive"),
        ));
    }
    Ok(value)
}

/// Reject non-finite or negative values.
pub(crate) fn require_non_negative(parameter: &'static str, value: f64) -> GenerateResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(GenerateError::invalid(
            parameter,
            format!("{value} must be finite and non-negative"),
        ));
    }
    Ok(value)
}

/// Reject values outside `[0, 1]`.
pub(crate) fn require_unit(parameter: &'static str, value: f64) -> GenerateResult<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(GenerateError::invalid(
            parameter,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(value)
}

/// Reject counts below a minimum.
pub(crate) fn require_count(
    parameter: &'static str,
    value: usize,
    minimum: usize,
) -> GenerateResult<usize> {
    if value < minimum {
        return Err(GenerateError::invalid(
            parameter,
            format!("{value} is below the minimum of {minimum}"),
        ));
    }
    Ok(value)
}
