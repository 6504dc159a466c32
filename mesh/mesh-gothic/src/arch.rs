//! Pointed arch rings.

use curve_types::{CurvePath, pointed_arch};
use mesh_from_curves::{Caps, extrude};
use nalgebra::Vector3;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerateResult, require_count, require_positive};
use crate::structure::{Structure, StructureKind};

/// Parameters for [`generate_arch`].
///
/// The arch stands in the XZ plane with its opening centred on the origin
/// and is extruded toward +Y.
///
/// # Example
///
/// ```
/// use mesh_gothic::ArchParams;
///
/// let params = ArchParams::new(3.0, 2.0).unwrap().with_segments(12);
/// assert!(params.validate().is_ok());
/// assert!(ArchParams::new(3.0, -1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArchParams {
    /// Width of the opening between the springing points.
    pub span: f64,
    /// Height of the intrados apex above the springing line.
    pub rise: f64,
    /// Points sampled along each of the intrados and extrados (≥ 3).
    pub segments: usize,
    /// Depth of the ring along +Y.
    pub thickness: f64,
    /// Width of the band between intrados and extrados.
    pub band_width: f64,
}

impl Default for ArchParams {
    fn default() -> Self {
        Self {
            span: 2.0,
            rise: 1.5,
            segments: 8,
            thickness: 0.5,
            band_width: 0.25,
        }
    }
}

impl ArchParams {
    /// Arch of the given opening with default ring dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// for a non-positive span or rise.
    pub fn new(span: f64, rise: f64) -> GenerateResult<Self> {
        let params = Self {
            span,
            rise,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the number of points per arch curve.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Set the depth of the ring.
    #[must_use]
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the width of the band.
    #[must_use]
    pub fn with_band_width(mut self, band_width: f64) -> Self {
        self.band_width = band_width;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// naming the first parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("span", self.span)?;
        require_positive("rise", self.rise)?;
        require_count("segments", self.segments, 3)?;
        require_positive("thickness", self.thickness)?;
        require_positive("band_width", self.band_width)?;
        Ok(())
    }
}

/// Closed outline of the ring: the intrados left to right, then the
/// extrados right to left. Has `2 * segments` points.
///
/// # Errors
///
/// Returns an error if the parameters are invalid.
pub fn arch_outline(params: &ArchParams) -> GenerateResult<CurvePath> {
    params.validate()?;
    let intrados = pointed_arch(params.span, params.rise, params.segments)?;
    let extrados = pointed_arch(
        params.span + 2.0 * params.band_width,
        params.rise + params.band_width,
        params.segments,
    )?;
    let mut points = intrados.into_points();
    points.extend(extrados.points().iter().rev());
    Ok(CurvePath::closed(points)?)
}

/// Build a pointed arch ring.
///
/// The outline from [`arch_outline`] is extruded by `thickness` and capped
/// on both sides, giving a closed solid with `4 * segments` vertices and
/// `2 * segments + 2` faces.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`](crate::GenerateError) for
/// invalid parameters.
///
/// # Example
///
/// ```
/// use mesh_gothic::{ArchParams, generate_arch};
///
/// let arch = generate_arch(&ArchParams::default()).unwrap();
/// assert_eq!(arch.mesh.vertex_count(), 32);
/// assert!(arch.mesh.adjacency().is_watertight());
/// ```
pub fn generate_arch(params: &ArchParams) -> GenerateResult<Structure> {
    let outline = arch_outline(params)?;
    let mesh = extrude(&outline, Vector3::y() * params.thickness, Caps::BOTH)?;
    debug!(
        "Arch ring: {} outline points, {} faces",
        outline.len(),
        mesh.face_count()
    );
    Ok(Structure::from_mesh(
        StructureKind::Arch,
        mesh,
        vec!["ring".to_string()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerateError;
    use approx::assert_relative_eq;

    #[test]
    fn test_outline_has_two_curves_of_points() {
        let outline = arch_outline(&ArchParams::default()).unwrap();
        assert_eq!(outline.len(), 16);
        assert!(outline.is_closed());

        let points = outline.points();
        assert_relative_eq!(points[0].x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(points[7].x, 1.0, epsilon = 1e-12);
        // Extrados starts at the outer right springing
        assert_relative_eq!(points[8].x, 1.25, epsilon = 1e-12);
        assert_relative_eq!(points[15].x, -1.25, epsilon = 1e-12);
        assert!(points.iter().all(|p| p.y.abs() < 1e-12 && p.z >= 0.0));
    }

    #[test]
    fn test_ring_is_closed_solid() {
        let arch = generate_arch(&ArchParams::default()).unwrap();
        assert_eq!(arch.kind, StructureKind::Arch);
        assert_eq!(arch.mesh.vertex_count(), 4 * 8);
        assert_eq!(arch.mesh.face_count(), 2 * 8 + 2);
        assert!(arch.mesh.adjacency().is_watertight());
        assert!(arch.mesh.signed_volume() > 0.0);

        let size = arch.mesh.bounds().size();
        assert_relative_eq!(size.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(size.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(size.z, 1.75, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        let params = ArchParams::default().with_segments(2);
        assert!(matches!(
            generate_arch(&params),
            Err(GenerateError::InvalidParameters {
                parameter: "segments",
                ..
            })
        ));
        assert!(ArchParams::default().with_band_width(0.0).validate().is_err());
    }
}
