//! Cubic Bézier segments and the Bézier easing used for arch curvature.

use crate::Curve;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cubic Bézier curve segment.
///
/// # Example
///
/// ```
/// use curve_types::{CubicBezier, Curve};
/// use nalgebra::Point3;
///
/// let curve = CubicBezier::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(1.0, 0.0, 2.0),
///     Point3::new(2.0, 0.0, 2.0),
/// );
///
/// assert_eq!(curve.point_at(0.0), Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(curve.point_at(1.0), Point3::new(2.0, 0.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicBezier {
    /// Start point.
    pub p0: Point3<f64>,
    /// First control point.
    pub p1: Point3<f64>,
    /// Second control point.
    pub p2: Point3<f64>,
    /// End point.
    pub p3: Point3<f64>,
}

impl CubicBezier {
    /// Create a cubic Bézier from its four control points.
    #[must_use]
    pub const fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Create a segment from endpoints and end tangents (Hermite form).
    #[must_use]
    pub fn from_hermite(
        start: Point3<f64>,
        start_tangent: Vector3<f64>,
        end: Point3<f64>,
        end_tangent: Vector3<f64>,
    ) -> Self {
        Self::new(
            start,
            start + start_tangent / 3.0,
            end - end_tangent / 3.0,
            end,
        )
    }

    /// Control points as an array.
    #[must_use]
    pub fn control_points(&self) -> [Point3<f64>; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }
}

impl Curve for CubicBezier {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let u = 1.0 - t;
        let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point3::from(
            self.p0.coords * b0 + self.p1.coords * b1 + self.p2.coords * b2 + self.p3.coords * b3,
        )
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let u = 1.0 - t;
        3.0 * u * u * (self.p1 - self.p0)
            + 6.0 * u * t * (self.p2 - self.p1)
            + 3.0 * t * t * (self.p3 - self.p2)
    }
}

/// One-dimensional cubic Bézier easing from 0 to 1.
///
/// The control values are `(0, sharpness_in, sharpness_out, 1)`, so
/// `(0, 1)` gives the classic smoothstep `3t² - 2t³` and `(1/3, 2/3)` is the
/// identity. Sharpness values above 1 or below 0 overshoot, which is how
/// lancet heads get their exaggerated points.
///
/// `t` outside `[0, 1]` extrapolates the polynomial; callers validate first.
#[must_use]
pub fn cubic_ease(t: f64, sharpness_in: f64, sharpness_out: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * sharpness_in + 3.0 * u * t * t * sharpness_out + t * t * t
}
