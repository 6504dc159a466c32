//! Foiled tracery.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use curve_types::circle;
use mesh_from_curves::{SweepOptions, rectangle_profile, sweep};
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, GenerateResult, require_count, require_positive};
use crate::structure::{Structure, StructureKind};

/// Parameters for [`generate_tracery`].
///
/// Tracery stands in the XZ plane, centred on the origin, with the first
/// foil at the top.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceryParams {
    /// Centre-line radius of the enclosing ring.
    pub radius: f64,
    /// Number of foils (≥ 3): 3 for a trefoil, 4 for a quatrefoil.
    pub repeat: usize,
    /// Points around each foil (≥ 3); the ring uses twice as many.
    pub segments: usize,
    /// Width of the stone line, in the tracery plane.
    pub line_width: f64,
    /// Thickness of the stone line, along Y.
    pub depth: f64,
    /// Whether to build the enclosing ring.
    pub enclosing_ring: bool,
}

impl Default for TraceryParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            repeat: 4,
            segments: 24,
            line_width: 0.05,
            depth: 0.1,
            enclosing_ring: true,
        }
    }
}

impl TraceryParams {
    /// Tracery of the given radius and foil count.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] if the values are out of
    /// range or leave no room for the foils.
    pub fn new(radius: f64, repeat: usize) -> GenerateResult<Self> {
        let params = Self {
            radius,
            repeat,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the number of points per foil.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Set the stone line's width and depth.
    #[must_use]
    pub fn with_line(mut self, line_width: f64, depth: f64) -> Self {
        self.line_width = line_width;
        self.depth = depth;
        self
    }

    /// Include or omit the enclosing ring.
    #[must_use]
    pub fn with_enclosing_ring(mut self, enclosing_ring: bool) -> Self {
        self.enclosing_ring = enclosing_ring;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("radius", self.radius)?;
        require_count("repeat", self.repeat, 3)?;
        require_count("segments", self.segments, 3)?;
        require_positive("line_width", self.line_width)?;
        require_positive("depth", self.depth)?;
        let (_, foil_radius) = self.foil_layout();
        if foil_radius <= self.line_width / 2.0 {
            return Err(GenerateError::invalid(
                "line_width",
                format!(
                    "{} is too wide for {} foils in radius {}",
                    self.line_width, self.repeat, self.radius
                ),
            ));
        }
        Ok(())
    }

    /// Distance of the foil centres from the middle, and the foils'
    /// centre-line radius.
    ///
    /// Neighbouring foils touch each other and the inner edge of the ring,
    /// each measured at the outer edge of the stone line.
    #[must_use]
    pub fn foil_layout(&self) -> (f64, f64) {
        let half = self.line_width / 2.0;
        let s = (PI / self.repeat as f64).sin();
        let distance = (self.radius - half) / (1.0 + s);
        (distance, distance * s - half)
    }
}

/// Build a foiled tracery rose.
///
/// Each foil is a circle swept with a rectangular stone section into a
/// closed tube; the optional enclosing ring is swept the same way. Parts
/// touch but never overlap and are left unmerged.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters.
///
/// # Example
///
/// ```
/// use mesh_gothic::{TraceryParams, generate_tracery};
///
/// let trefoil = generate_tracery(&TraceryParams::new(1.0, 3).unwrap()).unwrap();
/// assert_eq!(trefoil.elements, ["foil-0", "foil-1", "foil-2", "ring"]);
/// ```
pub fn generate_tracery(params: &TraceryParams) -> GenerateResult<Structure> {
    params.validate()?;
    let (distance, foil_radius) = params.foil_layout();
    let profile = rectangle_profile(params.line_width, params.depth)?;
    let options = SweepOptions::default().in_plane(Vector3::y());

    let mut structure = Structure::new(StructureKind::Tracery);
    for k in 0..params.repeat {
        let angle = FRAC_PI_2 + TAU * k as f64 / params.repeat as f64;
        let center = Point3::new(distance * angle.cos(), 0.0, distance * angle.sin());
        let path = circle(center, foil_radius, Vector3::y(), params.segments)?;
        let foil = sweep(&profile, &path, &options)?;
        structure.add_part(format!("foil-{k}"), &foil);
    }
    if params.enclosing_ring {
        let path = circle(
            Point3::origin(),
            params.radius,
            Vector3::y(),
            2 * params.segments,
        )?;
        let ring = sweep(&profile, &path, &options)?;
        structure.add_part("ring", &ring);
    }

    debug!(
        "Tracery: {} foils of radius {foil_radius:.4} at {distance:.4}, {} faces",
        params.repeat,
        structure.mesh.face_count()
    );
    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_foils_touch_without_overlap() {
        for repeat in 3..=8 {
            let params = TraceryParams::default().with_segments(12);
            let params = TraceryParams { repeat, ..params };
            let (d, r) = params.foil_layout();
            let outer = r + params.line_width / 2.0;

            // Neighbouring centres are exactly two outer radii apart
            let gap = 2.0 * d * (PI / repeat as f64).sin();
            assert_relative_eq!(gap, 2.0 * outer, epsilon = 1e-12);
            // And each foil reaches the ring's inner edge
            assert_relative_eq!(
                d + outer,
                params.radius - params.line_width / 2.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_quatrefoil_parts() {
        let params = TraceryParams::default();
        let tracery = generate_tracery(&params).unwrap();
        let mesh = &tracery.mesh;

        assert_eq!(tracery.element_count(), 5);
        let quads = 4 * params.segments * 4 + 4 * 2 * params.segments;
        assert_eq!(mesh.face_count(), quads);
        assert_eq!(mesh.vertex_count(), quads);
        assert!(mesh.adjacency().is_watertight());

        // Five disjoint tori
        let euler = mesh.vertex_count() as i64 - mesh.edge_count() as i64
            + mesh.face_count() as i64;
        assert_eq!(euler, 0);
        assert!(mesh.signed_volume() > 0.0);

        let bounds = mesh.bounds();
        let reach = params.radius + params.line_width / 2.0 + 1e-9;
        assert!(bounds.max.x <= reach && bounds.min.x >= -reach);
        assert!(bounds.max.z <= reach && bounds.min.z >= -reach);
        assert_relative_eq!(bounds.size().y, params.depth, epsilon = 1e-12);
    }

    #[test]
    fn test_without_ring() {
        let params = TraceryParams::default().with_enclosing_ring(false);
        let tracery = generate_tracery(&params).unwrap();
        assert_eq!(tracery.elements.last().map(String::as_str), Some("foil-3"));
    }

    #[test]
    fn test_line_too_wide() {
        let params = TraceryParams::default().with_line(0.6, 0.1);
        assert!(matches!(
            params.validate(),
            Err(GenerateError::InvalidParameters {
                parameter: "line_width",
                ..
            })
        ));
    }
}
