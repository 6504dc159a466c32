//! Moving frames along sampled paths.
//!
//! Two strategies are provided: parallel transport, which minimises twist
//! along arbitrary space curves, and fixed-plane frames, which keep the
//! binormal locked to a plane normal so a profile swept along an arch or a
//! circle stays square to its elevation.

use nalgebra::{Point2, Point3, UnitVector3, Vector3};

use crate::error::{SweepError, SweepResult};

/// A reference frame at a point on a curve.
///
/// Consists of three orthonormal vectors with `tangent × normal = binormal`.
/// Profiles are placed with their first coordinate along `normal` and their
/// second along `binormal`, so a profile that is counter-clockwise in its
/// own plane faces along the tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Tangent direction (forward along curve).
    pub tangent: Vector3<f64>,
    /// Normal direction (perpendicular to tangent).
    pub normal: Vector3<f64>,
    /// Binormal direction (perpendicular to both tangent and normal).
    pub binormal: Vector3<f64>,
}

impl Frame {
    /// Create a new frame from tangent, normal, and binormal vectors.
    ///
    /// Vectors are assumed to be orthonormal.
    #[must_use]
    pub fn new(tangent: Vector3<f64>, normal: Vector3<f64>, binormal: Vector3<f64>) -> Self {
        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Create an initial frame from a tangent vector.
    ///
    /// Computes a perpendicular normal and binormal.
    #[must_use]
    pub fn from_tangent(tangent: Vector3<f64>) -> Self {
        let tangent = tangent.try_normalize(f64::EPSILON).unwrap_or(Vector3::z());
        let normal = find_perpendicular(tangent);
        let binormal = tangent.cross(&normal);

        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Create a frame whose normal is as close as possible to `hint`.
    ///
    /// Falls back to [`Frame::from_tangent`] when `hint` is parallel to the
    /// tangent.
    #[must_use]
    pub fn from_tangent_and_hint(tangent: Vector3<f64>, hint: Vector3<f64>) -> Self {
        let Some(tangent) = tangent.try_normalize(f64::EPSILON) else {
            return Self::from_tangent(tangent);
        };
        match (hint - tangent * tangent.dot(&hint)).try_normalize(1e-12) {
            Some(normal) => Self {
                tangent,
                normal,
                binormal: tangent.cross(&normal),
            },
            None => Self::from_tangent(tangent),
        }
    }

    /// Rotate the frame's normal and binormal by an angle around the tangent.
    #[must_use]
    pub fn rotate_around_tangent(&self, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();

        Self {
            tangent: self.tangent,
            normal: self.normal * cos_a + self.binormal * sin_a,
            binormal: -self.normal * sin_a + self.binormal * cos_a,
        }
    }

    /// Map a profile point into 3D around `origin`.
    #[must_use]
    pub fn place(&self, origin: &Point3<f64>, point: &Point2<f64>) -> Point3<f64> {
        origin + self.normal * point.x + self.binormal * point.y
    }
}

/// Find a vector perpendicular to the given vector.
fn find_perpendicular(v: Vector3<f64>) -> Vector3<f64> {
    // Choose the axis most perpendicular to v
    let abs_x = v.x.abs();
    let abs_y = v.y.abs();
    let abs_z = v.z.abs();

    let perp = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::x()
    } else if abs_y <= abs_z {
        Vector3::y()
    } else {
        Vector3::z()
    };

    v.cross(&perp)
        .try_normalize(f64::EPSILON)
        .unwrap_or(Vector3::y())
}

/// Unit tangents at each point.
///
/// Interior points average the incoming and outgoing directions; open ends
/// use their single segment. Zero-length steps reuse the previous tangent.
fn path_tangents(points: &[Point3<f64>], closed: bool) -> Vec<Vector3<f64>> {
    let n = points.len();
    let mut tangents: Vec<Vector3<f64>> = Vec::with_capacity(n);
    for i in 0..n {
        let incoming = if i > 0 {
            Some(points[i] - points[i - 1])
        } else if closed {
            Some(points[0] - points[n - 1])
        } else {
            None
        };
        let outgoing = if i + 1 < n {
            Some(points[i + 1] - points[i])
        } else if closed {
            Some(points[0] - points[i])
        } else {
            None
        };
        let raw = match (incoming, outgoing) {
            (Some(a), Some(b)) => a + b,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => Vector3::zeros(),
        };
        let fallback = tangents.last().copied().unwrap_or(Vector3::z());
        tangents.push(raw.try_normalize(f64::EPSILON).unwrap_or(fallback));
    }
    tangents
}

/// Compute parallel transport frames along an open curve.
///
/// Uses rotation minimizing frames to avoid twisting.
///
/// # Example
///
/// ```
/// use mesh_from_curves::parallel_transport_frames;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
/// ];
///
/// let frames = parallel_transport_frames(&points);
/// assert_eq!(frames.len(), 3);
/// ```
#[must_use]
pub fn parallel_transport_frames(points: &[Point3<f64>]) -> Vec<Frame> {
    transport_frames(points, false, None)
}

/// Parallel transport frames with an optional closing seam and start normal.
///
/// With `closed` set, the tangent at each end also looks across the seam
/// and the twist accumulated around the loop is spread evenly over all
/// frames, so the last frame lines up with the first. `initial_normal`
/// fixes the roll of the first frame; without it a perpendicular is picked
/// from the tangent.
///
/// Returns an empty vector for fewer than two points.
#[must_use]
pub fn transport_frames(
    points: &[Point3<f64>],
    closed: bool,
    initial_normal: Option<Vector3<f64>>,
) -> Vec<Frame> {
    if points.len() < 2 {
        return Vec::new();
    }

    let tangents = path_tangents(points, closed);
    let first = match initial_normal {
        Some(hint) => Frame::from_tangent_and_hint(tangents[0], hint),
        None => Frame::from_tangent(tangents[0]),
    };

    let mut frames = Vec::with_capacity(points.len());
    frames.push(first);
    for &tangent in &tangents[1..] {
        let prev_frame = frames[frames.len() - 1];
        frames.push(parallel_transport_frame(&prev_frame, tangent));
    }

    if closed {
        let n = frames.len();
        let back = parallel_transport_frame(&frames[n - 1], first.tangent);
        let twist = back
            .normal
            .cross(&first.normal)
            .dot(&first.tangent)
            .atan2(back.normal.dot(&first.normal));
        for (k, frame) in frames.iter_mut().enumerate().skip(1) {
            *frame = frame.rotate_around_tangent(twist * k as f64 / n as f64);
        }
    }

    frames
}

/// Transport a frame from one tangent to another.
///
/// Uses the rotation that maps the old tangent to the new one
/// to transform the normal and binormal.
fn parallel_transport_frame(prev_frame: &Frame, new_tangent: Vector3<f64>) -> Frame {
    let new_tangent = new_tangent
        .try_normalize(f64::EPSILON)
        .unwrap_or(prev_frame.tangent);

    let axis = prev_frame.tangent.cross(&new_tangent);
    let axis_len = axis.norm();

    if axis_len < f64::EPSILON {
        // Tangents are parallel
        let sign = if prev_frame.tangent.dot(&new_tangent) > 0.0 {
            1.0
        } else {
            -1.0
        };
        Frame {
            tangent: new_tangent,
            normal: prev_frame.normal * sign,
            binormal: prev_frame.binormal * sign,
        }
    } else {
        let k = UnitVector3::new_normalize(axis).into_inner();
        let angle = prev_frame.tangent.dot(&new_tangent).clamp(-1.0, 1.0).acos();
        let (sin_a, cos_a) = angle.sin_cos();

        // Rodrigues rotation formula
        let rotate = |v: Vector3<f64>| v * cos_a + k.cross(&v) * sin_a + k * k.dot(&v) * (1.0 - cos_a);

        Frame {
            tangent: new_tangent,
            normal: rotate(prev_frame.normal),
            binormal: rotate(prev_frame.binormal),
        }
    }
}

/// Frames whose binormal is locked to a plane normal.
///
/// Tangents are projected into the plane, so the path should lie in (or
/// parallel to) the plane. Sweeping a profile with these frames keeps its
/// second coordinate along `plane_normal` everywhere, which is what an arch
/// band extruded through a wall needs.
///
/// # Errors
///
/// Returns [`SweepError::InvalidParameters`] if `plane_normal` has zero
/// length, fewer than two points are given, or the path runs along the
/// plane normal at some point.
pub fn planar_frames(
    points: &[Point3<f64>],
    closed: bool,
    plane_normal: Vector3<f64>,
) -> SweepResult<Vec<Frame>> {
    if points.len() < 2 {
        return Err(SweepError::invalid(
            "path",
            format!("need at least 2 points, got {}", points.len()),
        ));
    }
    let binormal = plane_normal
        .try_normalize(1e-12)
        .ok_or_else(|| SweepError::invalid("plane_normal", "normal has zero length"))?;

    path_tangents(points, closed)
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let tangent = (raw - binormal * binormal.dot(&raw))
                .try_normalize(1e-9)
                .ok_or_else(|| {
                    SweepError::invalid(
                        "path",
                        format!("path runs along the plane normal at point {i}"),
                    )
                })?;
            Ok(Frame {
                tangent,
                normal: binormal.cross(&tangent),
                binormal,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn assert_orthonormal(frame: &Frame) {
        assert_relative_eq!(frame.tangent.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(frame.normal.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(frame.binormal.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(frame.tangent.dot(&frame.normal), 0.0, epsilon = 1e-10);
        assert_relative_eq!(
            frame.tangent.cross(&frame.normal),
            frame.binormal,
            epsilon = 1e-10
        );
    }

    fn ring(n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn frame_from_tangent_is_orthonormal() {
        for t in [Vector3::x(), Vector3::y(), Vector3::z(), Vector3::new(1.0, 2.0, 3.0)] {
            assert_orthonormal(&Frame::from_tangent(t));
        }
    }

    #[test]
    fn frame_from_hint() {
        let frame = Frame::from_tangent_and_hint(Vector3::z(), Vector3::new(1.0, 0.0, 5.0));
        assert_relative_eq!(frame.normal, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(frame.binormal, Vector3::y(), epsilon = 1e-12);

        // Parallel hint falls back
        let frame = Frame::from_tangent_and_hint(Vector3::z(), Vector3::z());
        assert_orthonormal(&frame);
    }

    #[test]
    fn frame_rotate_quarter_turn() {
        let frame = Frame::from_tangent_and_hint(Vector3::z(), Vector3::x());
        let rotated = frame.rotate_around_tangent(FRAC_PI_2);
        assert_relative_eq!(rotated.normal, Vector3::y(), epsilon = 1e-12);
        assert_orthonormal(&rotated);
    }

    #[test]
    fn frame_place() {
        let frame = Frame::from_tangent_and_hint(Vector3::z(), Vector3::x());
        let p = frame.place(&Point3::new(0.0, 0.0, 2.0), &Point2::new(1.0, 3.0));
        assert_relative_eq!(p, Point3::new(1.0, 3.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn parallel_transport_straight_line() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];

        let frames = parallel_transport_frames(&points);
        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert_relative_eq!(frame.tangent.x, 1.0, epsilon = 1e-10);
            assert_relative_eq!(frame.normal, frames[0].normal, epsilon = 1e-10);
        }
    }

    #[test]
    fn parallel_transport_quarter_turn() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];

        let frames = parallel_transport_frames(&points);
        assert!(frames[0].tangent.x > 0.5);
        assert!(frames[2].tangent.y > 0.5);
        frames.iter().for_each(assert_orthonormal);
    }

    #[test]
    fn parallel_transport_too_short() {
        assert!(parallel_transport_frames(&[]).is_empty());
        assert!(parallel_transport_frames(&[Point3::origin()]).is_empty());
    }

    #[test]
    fn repeated_points_keep_previous_tangent() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let frames = parallel_transport_frames(&points);
        assert_relative_eq!(frames[2].tangent, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn closed_transport_has_no_seam() {
        let points = ring(24);
        let frames = transport_frames(&points, true, Some(Vector3::z()));
        assert_eq!(frames.len(), 24);
        frames.iter().for_each(assert_orthonormal);
        // A planar loop has no holonomy: the normal stays on +Z
        for frame in &frames {
            assert_relative_eq!(frame.normal, Vector3::z(), epsilon = 1e-9);
        }
    }

    #[test]
    fn closed_transport_on_twisted_loop_closes() {
        // A saddle-shaped loop accumulates twist
        let points: Vec<_> = (0..32)
            .map(|i| {
                let a = TAU * f64::from(i) / 32.0;
                Point3::new(a.cos(), a.sin(), 0.4 * (2.0 * a).sin())
            })
            .collect();
        let frames = transport_frames(&points, true, None);
        frames.iter().for_each(assert_orthonormal);

        // Every step, the seam included, carries the same residual roll
        let roll = |from: &Frame, to: &Frame| {
            parallel_transport_frame(from, to.tangent)
                .normal
                .angle(&to.normal)
        };
        let seam = roll(&frames[31], &frames[0]);
        for k in 0..31 {
            assert_relative_eq!(roll(&frames[k], &frames[k + 1]), seam, epsilon = 1e-6);
        }
    }

    #[test]
    fn planar_frames_lock_binormal() {
        let points = ring(12);
        let frames = planar_frames(&points, true, Vector3::z()).unwrap();
        for (frame, p) in frames.iter().zip(&points) {
            assert_orthonormal(frame);
            assert_relative_eq!(frame.binormal, Vector3::z(), epsilon = 1e-12);
            // Counter-clockwise loop about +Z: normal points inward
            assert!(frame.normal.dot(&p.coords) < 0.0);
        }
    }

    #[test]
    fn planar_frames_reject_bad_input() {
        let points = vec![Point3::origin(), Point3::new(0.0, 0.0, 1.0)];
        assert!(planar_frames(&points, false, Vector3::z()).is_err());
        assert!(planar_frames(&points, false, Vector3::zeros()).is_err());
        assert!(planar_frames(&points[..1], false, Vector3::x()).is_err());
    }

    #[test]
    fn find_perpendicular_axes() {
        for v in [Vector3::x(), Vector3::y(), Vector3::z()] {
            assert_relative_eq!(v.dot(&find_perpendicular(v)), 0.0, epsilon = 1e-10);
        }
    }
}
