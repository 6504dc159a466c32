//! Arc and circle curves.
//!
//! Direct trigonometric evaluation of circular geometry. Arcs and circles are
//! traced counter-clockwise when viewed from the tip of the plane normal.

use crate::error::{require_positive, require_segments};
use crate::{Curve, CurveError, CurvePath, Result};
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A circular arc in 3D space.
///
/// # Example
///
/// ```
/// use curve_types::{CircularArc, Curve};
/// use nalgebra::Point3;
/// use std::f64::consts::PI;
///
/// // Upper half circle in the elevation (XZ) plane
/// let arc = CircularArc::in_elevation(Point3::origin(), 1.0, 0.0, PI).unwrap();
///
/// let top = arc.point_at(0.5);
/// assert!((top.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircularArc {
    center: Point3<f64>,
    radius: f64,
    start_angle: f64,
    /// Positive = counter-clockwise about `normal`.
    sweep_angle: f64,
    x_axis: Vector3<f64>,
    y_axis: Vector3<f64>,
}

impl CircularArc {
    /// Create an arc from center, radius, start/end angles and plane normal.
    ///
    /// Angle 0 lies along the plane's local X axis (see [`plane_axes`]).
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] if the radius is not
    /// positive, an angle is not finite, or the normal has zero length.
    pub fn new(
        center: Point3<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        normal: Vector3<f64>,
    ) -> Result<Self> {
        require_positive("radius", radius)?;
        if !(start_angle.is_finite() && end_angle.is_finite()) {
            return Err(CurveError::invalid("angle", "angles must be finite"));
        }
        let (x_axis, y_axis) = plane_axes(&normal)?;
        Ok(Self {
            center,
            radius,
            start_angle,
            sweep_angle: end_angle - start_angle,
            x_axis,
            y_axis,
        })
    }

    /// Arc in the elevation plane (XZ), angle 0 along +X and `π/2` along +Z.
    ///
    /// # Errors
    ///
    /// See [`CircularArc::new`].
    pub fn in_elevation(
        center: Point3<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        Self::new(center, radius, start_angle, end_angle, -Vector3::y())
    }

    /// Center of the arc.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Signed sweep angle in radians.
    #[must_use]
    pub fn sweep_angle(&self) -> f64 {
        self.sweep_angle
    }

    fn point_at_angle(&self, angle: f64) -> Point3<f64> {
        let (sin, cos) = angle.sin_cos();
        self.center + self.radius * (cos * self.x_axis + sin * self.y_axis)
    }
}

impl Curve for CircularArc {
    fn point_at(&self, t: f64) -> Point3<f64> {
        self.point_at_angle(self.start_angle + t * self.sweep_angle)
    }
}

/// A full circle, sampled as a closed regular polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Circle {
    center: Point3<f64>,
    radius: f64,
    x_axis: Vector3<f64>,
    y_axis: Vector3<f64>,
}

impl Circle {
    /// Create a circle about `normal`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] for a non-positive radius or
    /// zero-length normal.
    pub fn new(center: Point3<f64>, radius: f64, normal: Vector3<f64>) -> Result<Self> {
        require_positive("radius", radius)?;
        let (x_axis, y_axis) = plane_axes(&normal)?;
        Ok(Self {
            center,
            radius,
            x_axis,
            y_axis,
        })
    }

    /// Radius of the circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Curve for Circle {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let (sin, cos) = (t * TAU).sin_cos();
        self.center + self.radius * (cos * self.x_axis + sin * self.y_axis)
    }

    fn is_closed(&self) -> bool {
        true
    }
}

/// Sample an elevation-plane arc into `segments` points.
///
/// # Errors
///
/// Returns [`CurveError::InvalidParameters`] for a non-positive radius or
/// fewer than 3 segments.
pub fn circular_arc(
    center: Point3<f64>,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    segments: usize,
) -> Result<CurvePath> {
    CircularArc::in_elevation(center, radius, start_angle, end_angle)?.sample(segments)
}

/// Sample a circle about `normal` into a closed regular polygon.
///
/// # Errors
///
/// Returns [`CurveError::InvalidParameters`] for a non-positive radius,
/// zero-length normal or fewer than 3 sides.
pub fn circle(
    center: Point3<f64>,
    radius: f64,
    normal: Vector3<f64>,
    sides: usize,
) -> Result<CurvePath> {
    require_segments(sides, 3)?;
    Circle::new(center, radius, normal)?.sample(sides)
}

/// Orthonormal in-plane axes for a plane normal.
///
/// `x_axis × y_axis` points along the normal, so angles increase
/// counter-clockwise seen from the normal's tip. Returns the world X/Y axes
/// for `+Z` and world X/Z for `-Y`.
///
/// # Errors
///
/// Returns [`CurveError::InvalidParameters`] for a zero or non-finite normal.
pub fn plane_axes(normal: &Vector3<f64>) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let n = normal
        .try_normalize(1e-12)
        .ok_or_else(|| CurveError::invalid("normal", "normal has zero length"))?;
    let seed = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let x_axis = (seed - n * seed.dot(&n)).normalize();
    let y_axis = n.cross(&x_axis);
    Ok((x_axis, y_axis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_plane_axes_world_aligned() {
        let (x, y) = plane_axes(&Vector3::z()).unwrap();
        assert_relative_eq!(x, Vector3::x());
        assert_relative_eq!(y, Vector3::y());

        let (x, y) = plane_axes(&-Vector3::y()).unwrap();
        assert_relative_eq!(x, Vector3::x());
        assert_relative_eq!(y, Vector3::z());
    }

    #[test]
    fn test_plane_axes_rejects_zero() {
        assert!(plane_axes(&Vector3::zeros()).is_err());
    }

    #[test]
    fn test_half_circle_in_elevation() {
        let path = circular_arc(Point3::origin(), 2.0, 0.0, PI, 5).unwrap();
        assert_eq!(path.len(), 5);
        assert_relative_eq!(path.first(), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(path.points()[2], Point3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(path.last(), Point3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_circle_is_closed_polygon() {
        let square = circle(Point3::origin(), 1.0, Vector3::z(), 4).unwrap();
        assert!(square.is_closed());
        assert_eq!(square.len(), 4);
        assert_relative_eq!(square.points()[1], Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        // Counter-clockwise about +Z
        assert!(square.newell_normal().z > 0.0);
    }

    #[test]
    fn test_invalid_radius() {
        assert!(circle(Point3::origin(), 0.0, Vector3::z(), 8).is_err());
        assert!(CircularArc::in_elevation(Point3::origin(), -1.0, 0.0, PI).is_err());
    }

    #[test]
    fn test_invalid_sides() {
        assert!(circle(Point3::origin(), 1.0, Vector3::z(), 2).is_err());
    }
}
