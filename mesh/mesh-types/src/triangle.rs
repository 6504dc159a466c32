//! Concrete triangle with vertex positions.

use nalgebra::{Point3, Vector3};

/// A triangle with concrete corner positions.
///
/// Used where triangulation code needs per-triangle geometry (hole filling,
/// ear tests) without going through mesh indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a triangle from three positions.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Cross product of the two leading edges; length is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, or `None` for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.normal_unnormalized().try_normalize(f64::EPSILON)
    }

    /// Area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() / 2.0
    }

    /// Centroid.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Whether the area is at most `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() <= epsilon
    }
}
