//! Sweeping a planar profile along a path.

use curve_types::CurvePath;
use mesh_types::MeshGraph;
use nalgebra::{Point2, Vector3};
use tracing::debug;

use crate::error::{SweepError, SweepResult, require_positive};
use crate::frame::{Frame, planar_frames, transport_frames};
use crate::profile::counter_clockwise;
use crate::ribbon::{Caps, add_caps, bridge_rows};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`sweep`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepOptions {
    /// Preferred direction of the profile's `u` axis at the start of a
    /// parallel-transport sweep.
    pub initial_normal: Option<Vector3<f64>>,
    /// Lock the profile's `v` axis to this plane normal instead of using
    /// parallel transport.
    pub plane_normal: Option<Vector3<f64>>,
    /// Per-section scale factors, one per path point. Empty means 1.
    pub scales: Vec<f64>,
    /// End caps for open paths.
    pub caps: Caps,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            initial_normal: None,
            plane_normal: None,
            scales: Vec::new(),
            caps: Caps::BOTH,
        }
    }
}

impl SweepOptions {
    /// Orient the first frame's normal toward `normal`.
    #[must_use]
    pub fn with_initial_normal(mut self, normal: Vector3<f64>) -> Self {
        self.initial_normal = Some(normal);
        self
    }

    /// Use fixed-plane frames with the given plane normal.
    #[must_use]
    pub fn in_plane(mut self, normal: Vector3<f64>) -> Self {
        self.plane_normal = Some(normal);
        self
    }

    /// Scale each section individually.
    #[must_use]
    pub fn with_scales(mut self, scales: Vec<f64>) -> Self {
        self.scales = scales;
        self
    }

    /// Scale linearly from `start` at the first section to `end` at the
    /// last, for a path of `count` points.
    #[must_use]
    pub fn with_taper(self, start: f64, end: f64, count: usize) -> Self {
        let last = count.saturating_sub(1).max(1) as f64;
        let scales = (0..count)
            .map(|i| start + (end - start) * i as f64 / last)
            .collect();
        self.with_scales(scales)
    }

    /// Set which ends get a cap.
    #[must_use]
    pub fn with_caps(mut self, caps: Caps) -> Self {
        self.caps = caps;
        self
    }
}

/// Sweep a closed 2D profile along a path.
///
/// At each path point the profile is scaled, then placed in that point's
/// frame (`u` along the frame normal, `v` along the binormal). The profile
/// is made counter-clockwise first, so the resulting tube always faces
/// outward. Open paths get the requested caps; a closed path joins its last
/// section back to the first and produces a capless closed tube with torus
/// topology.
///
/// # Errors
///
/// Returns [`SweepError::InvalidParameters`] for a profile with fewer than
/// 3 points or no area, a scale list whose length differs from the path, a
/// non-positive scale, or a path unusable with the requested frames.
///
/// # Example
///
/// ```
/// use curve_types::{Point3, Vector3, circle};
/// use mesh_from_curves::{SweepOptions, rectangle_profile, sweep};
///
/// let path = circle(Point3::origin(), 3.0, Vector3::z(), 24).unwrap();
/// let band = rectangle_profile(0.5, 0.25).unwrap();
/// let ring = sweep(&band, &path, &SweepOptions::default().in_plane(Vector3::z())).unwrap();
///
/// assert_eq!(ring.face_count(), 24 * 4);
/// assert!(ring.adjacency().is_watertight());
/// ```
pub fn sweep(
    profile: &[Point2<f64>],
    path: &CurvePath,
    options: &SweepOptions,
) -> SweepResult<MeshGraph> {
    let profile = counter_clockwise(profile)?;
    let points = path.points();
    let closed = path.is_closed();

    let scales = if options.scales.is_empty() {
        vec![1.0; points.len()]
    } else if options.scales.len() == points.len() {
        for &s in &options.scales {
            require_positive("scales", s)?;
        }
        options.scales.clone()
    } else {
        return Err(SweepError::invalid(
            "scales",
            format!(
                "{} scales given for a path of {} points",
                options.scales.len(),
                points.len()
            ),
        ));
    };

    let frames: Vec<Frame> = match options.plane_normal {
        Some(normal) => planar_frames(points, closed, normal)?,
        None => transport_frames(points, closed, options.initial_normal),
    };
    if frames.len() != points.len() {
        return Err(SweepError::invalid("path", "could not compute frames"));
    }

    let mut mesh = MeshGraph::with_capacity(points.len() * profile.len(), points.len() * profile.len());
    let rows: Vec<Vec<u32>> = points
        .iter()
        .zip(&frames)
        .zip(&scales)
        .map(|((origin, frame), &scale)| {
            profile
                .iter()
                .map(|p| mesh.add_vertex(frame.place(origin, &Point2::from(p.coords * scale))))
                .collect()
        })
        .collect();

    let sides = bridge_rows(&mut mesh, &rows, true, closed)?;
    let capped = if closed {
        0
    } else {
        add_caps(&mut mesh, &rows, options.caps)?
    };

    debug!(
        "Swept {}-point profile along {} path points: {} side faces, {} caps",
        profile.len(),
        points.len(),
        sides,
        capped
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{polygon_profile, rectangle_profile};
    use approx::assert_relative_eq;
    use curve_types::{Point3, circle, pointed_arch};

    fn straight(length: f64, count: usize) -> CurvePath {
        CurvePath::open(
            (0..count)
                .map(|i| Point3::new(0.0, 0.0, length * i as f64 / (count - 1) as f64))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_straight_sweep_is_a_prism() {
        let square = rectangle_profile(1.0, 1.0).unwrap();
        let mesh = sweep(&square, &straight(2.0, 3), &SweepOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 8 + 2);
        assert!(mesh.adjacency().is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_profile_is_fixed() {
        let mut square = rectangle_profile(1.0, 1.0).unwrap();
        square.reverse();
        let mesh = sweep(&square, &straight(1.0, 2), &SweepOptions::default()).unwrap();
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_normal_aligns_profile() {
        let square = rectangle_profile(2.0, 1.0).unwrap();
        let options = SweepOptions::default().with_initial_normal(Vector3::x());
        let mesh = sweep(&square, &straight(1.0, 2), &options).unwrap();
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.size(), Vector3::new(2.0, 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_taper() {
        let hexagon = polygon_profile(1.0, 6).unwrap();
        let options = SweepOptions::default().with_taper(1.0, 0.5, 3);
        assert_eq!(options.scales, vec![1.0, 0.75, 0.5]);
        let mesh = sweep(&hexagon, &straight(2.0, 3), &options).unwrap();
        let tip = mesh.position(12).unwrap();
        assert_relative_eq!(tip.coords.xy().norm(), 0.5, epsilon = 1e-12);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_closed_path_makes_torus() {
        let path = circle(Point3::origin(), 2.0, Vector3::z(), 16).unwrap();
        let square = rectangle_profile(0.5, 0.5).unwrap();
        let options = SweepOptions::default().in_plane(Vector3::z());
        let mesh = sweep(&square, &path, &options).unwrap();

        assert_eq!(mesh.vertex_count(), 64);
        assert_eq!(mesh.face_count(), 64);
        assert!(mesh.adjacency().is_watertight());
        // V - E + F = 0 for a torus
        let euler = mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64;
        assert_eq!(euler, 0);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_arch_band_in_elevation() {
        let arch = pointed_arch(2.0, 1.5, 9).unwrap();
        let band = rectangle_profile(0.2, 0.4).unwrap();
        let options = SweepOptions::default().in_plane(Vector3::y());
        let mesh = sweep(&band, &arch, &options).unwrap();

        assert!(mesh.adjacency().is_watertight());
        assert!(mesh.signed_volume() > 0.0);
        // Depth is exactly the profile's v extent
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.size().y, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_errors() {
        let square = rectangle_profile(1.0, 1.0).unwrap();
        let path = straight(1.0, 3);

        let options = SweepOptions::default().with_scales(vec![1.0, 2.0]);
        assert!(sweep(&square, &path, &options).is_err());

        let options = SweepOptions::default().with_scales(vec![1.0, 0.0, 1.0]);
        assert!(sweep(&square, &path, &options).is_err());

        // Path runs straight along the plane normal
        let options = SweepOptions::default().in_plane(Vector3::z());
        assert!(sweep(&square, &path, &options).is_err());

        assert!(sweep(&square[..2], &path, &SweepOptions::default()).is_err());
    }
}
