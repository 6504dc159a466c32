//! Linear extrusion of a profile path.

use curve_types::CurvePath;
use mesh_types::MeshGraph;
use nalgebra::Vector3;
use tracing::debug;

use crate::error::{SweepError, SweepResult};
use crate::ribbon::{Caps, add_caps, bridge_rows};

/// Extrude a profile along a straight offset.
///
/// A closed profile becomes a prism: one quad per profile edge plus the
/// requested polygon caps, wound so every face points out of the solid. The
/// profile may be given in either orientation; it is reversed internally
/// when its normal opposes `offset`. An open profile becomes a ribbon of
/// quads in profile order and `caps` is ignored.
///
/// Vertices are laid out as the profile points followed by their offset
/// copies. Faces are the side quads first, then the start cap, then the end
/// cap.
///
/// # Errors
///
/// Returns [`SweepError::InvalidParameters`] if `offset` is zero or not
/// finite, or if it lies in the plane of a closed profile.
///
/// # Example
///
/// ```
/// use curve_types::CurvePath;
/// use mesh_from_curves::{Caps, extrude};
/// use nalgebra::{Point3, Vector3};
///
/// let square = CurvePath::closed(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ])
/// .unwrap();
///
/// let cube = extrude(&square, Vector3::z(), Caps::BOTH).unwrap();
/// assert_eq!(cube.face_count(), 6);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
pub fn extrude(profile: &CurvePath, offset: Vector3<f64>, caps: Caps) -> SweepResult<MeshGraph> {
    let length = offset.norm();
    if !length.is_finite() || length <= 0.0 {
        return Err(SweepError::invalid(
            "offset",
            "offset must be finite and non-zero",
        ));
    }

    let closed = profile.is_closed();
    let mut points = profile.points().to_vec();
    if closed {
        let normal = profile.newell_normal();
        let along = normal.dot(&offset);
        if along.abs() <= 1e-12 * normal.norm() * length {
            return Err(SweepError::invalid(
                "offset",
                "offset lies in the plane of the profile",
            ));
        }
        if along < 0.0 {
            points.reverse();
        }
    }

    let mut mesh = MeshGraph::with_capacity(points.len() * 2, points.len() + 2);
    let bottom: Vec<u32> = points.iter().map(|&p| mesh.add_vertex(p)).collect();
    let top: Vec<u32> = points.iter().map(|&p| mesh.add_vertex(p + offset)).collect();
    let rows = [bottom, top];

    let sides = bridge_rows(&mut mesh, &rows, closed, false)?;
    let capped = if closed {
        add_caps(&mut mesh, &rows, caps)?
    } else {
        0
    };

    debug!(
        "Extruded {} profile points into {} side faces and {} caps",
        points.len(),
        sides,
        capped
    );
    Ok(mesh)
}
