//! Sampled curve paths.

use crate::{CurveError, Result};
use nalgebra::{Isometry3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of 3D points with an open/closed flag.
///
/// This is the tessellated form every curve primitive is reduced to before
/// it is extruded, lofted or swept into a mesh. A path is immutable once
/// built; transforms return a new path.
///
/// A closed path does not repeat its first point at the end: the closing
/// segment runs implicitly from the last point back to the first.
///
/// # Example
///
/// ```
/// use curve_types::CurvePath;
/// use nalgebra::Point3;
///
/// let path = CurvePath::closed(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ])
/// .unwrap();
///
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segment_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurvePath {
    points: Vec<Point3<f64>>,
    closed: bool,
}

impl CurvePath {
    /// Build a path from points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] for an open path with fewer
    /// than 2 points or a closed path with fewer than 3, and
    /// [`CurveError::InvalidParameters`] if any coordinate is not finite.
    pub fn new(points: Vec<Point3<f64>>, closed: bool) -> Result<Self> {
        let required = if closed { 3 } else { 2 };
        if points.len() < required {
            return Err(CurveError::insufficient_points(required, points.len()));
        }
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(CurveError::invalid(
                "points",
                format!("point {index} has a non-finite coordinate"),
            ));
        }
        Ok(Self { points, closed })
    }

    /// Build an open path.
    ///
    /// # Errors
    ///
    /// See [`CurvePath::new`].
    pub fn open(points: Vec<Point3<f64>>) -> Result<Self> {
        Self::new(points, false)
    }

    /// Build a closed path.
    ///
    /// # Errors
    ///
    /// See [`CurvePath::new`].
    pub fn closed(points: Vec<Point3<f64>>) -> Result<Self> {
        Self::new(points, true)
    }

    /// The sampled points.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Consume the path and return its points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Whether the last point connects back to the first.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed path; present for API symmetry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point.
    #[must_use]
    pub fn first(&self) -> Point3<f64> {
        self.points[0]
    }

    /// Last point.
    #[must_use]
    pub fn last(&self) -> Point3<f64> {
        self.points[self.points.len() - 1]
    }

    /// Number of line segments, including the closing one.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Iterate over `(start, end)` segment pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..self.segment_count()).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Total polyline length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Average of the points.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.points.len() as f64)
    }

    /// Newell normal of the path treated as a polygon (not normalized).
    ///
    /// For a planar closed path its direction follows the right-hand rule and
    /// its length is twice the enclosed area.
    #[must_use]
    pub fn newell_normal(&self) -> Vector3<f64> {
        let n = self.points.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// The same points in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            points,
            closed: self.closed,
        }
    }

    /// Apply a rigid transform to every point.
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        self.map(|p| transform * p)
    }

    /// Translate every point.
    #[must_use]
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        self.map(|p| p + offset)
    }

    /// Scale every point per axis about `center`.
    #[must_use]
    pub fn scaled_about(&self, center: Point3<f64>, factors: Vector3<f64>) -> Self {
        self.map(|p| center + (p - center).component_mul(&factors))
    }

    fn map(&self, f: impl Fn(Point3<f64>) -> Point3<f64>) -> Self {
        Self {
            points: self.points.iter().map(|&p| f(p)).collect(),
            closed: self.closed,
        }
    }
}
