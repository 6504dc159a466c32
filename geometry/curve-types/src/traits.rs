//! Core curve trait.

use crate::error::require_segments;
use crate::{CurvePath, Result};
use nalgebra::{Point3, Vector3};

/// A parametric curve in 3D space.
///
/// Curves are parameterized over `t ∈ [0, 1]`, where `t=0` is the start and
/// `t=1` the end. For closed curves `t=1` coincides with `t=0`.
///
/// # Implementors
///
/// - [`CircularArc`](crate::CircularArc) - Circular arcs
/// - [`Circle`](crate::Circle) - Full circles
/// - [`PointedArch`](crate::PointedArch) - Two-centred Gothic arch
/// - [`LancetArch`](crate::LancetArch) - Arch with blended curvature
/// - [`CubicBezier`](crate::CubicBezier) - Cubic Bézier segment
pub trait Curve {
    /// Evaluate the curve position at parameter `t ∈ [0, 1]`.
    fn point_at(&self, t: f64) -> Point3<f64>;

    /// Whether the curve returns to its starting point.
    fn is_closed(&self) -> bool {
        false
    }

    /// Central-difference derivative at `t`.
    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        const H: f64 = 1e-6;
        let t0 = (t - H).max(0.0);
        let t1 = (t + H).min(1.0);
        (self.point_at(t1) - self.point_at(t0)) / (t1 - t0)
    }

    /// Sample the curve into a [`CurvePath`] of exactly `count` points.
    ///
    /// Open curves are sampled at `t = i / (count - 1)` so both endpoints are
    /// included. Closed curves are sampled at `t = i / count`, leaving the
    /// closing segment implicit.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`](crate::CurveError) if
    /// `count < 3`.
    fn sample(&self, count: usize) -> Result<CurvePath> {
        require_segments(count, 3)?;
        let closed = self.is_closed();
        let divisor = if closed { count } else { count - 1 } as f64;
        let points = (0..count)
            .map(|i| self.point_at(i as f64 / divisor))
            .collect();
        CurvePath::new(points, closed)
    }
}
