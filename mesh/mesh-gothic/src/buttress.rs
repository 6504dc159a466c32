//! Flying buttresses.
//!
//! Both kinds are a vertical support with an arch welded onto its top face.
//! The flying buttress is a tapered polygonal strut whose arch curves out
//! along a Bézier; the divine buttress is a rectangular pier whose inset top
//! receives the foot of a pointed arch band.

use curve_types::{Curve, CubicBezier, CurvePath, circle, pointed_arch};
use mesh_assembly::{InsertionBoundary, weld};
use mesh_from_curves::{
    Caps, LoftOptions, SweepOptions, extrude, loft, polygon_profile, rectangle_profile, sweep,
};
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, GenerateResult, require_count, require_positive, require_unit};
use crate::structure::{Structure, StructureKind};

// =============================================================================
// Flying buttress
// =============================================================================

/// Parameters for [`generate_flying_buttress`].
///
/// The strut stands on the origin; the arch leaves its top heading up and
/// lands `reach` along +X and `rise` above the strut top, arriving
/// horizontally as it would against a wall.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlyingButtressParams {
    /// Height of the strut.
    pub height: f64,
    /// Circumradius of the strut's base.
    pub base_radius: f64,
    /// Circumradius of the strut's top, at most `base_radius`.
    pub top_radius: f64,
    /// Sides of the strut and arch cross-sections (≥ 3).
    pub sides: usize,
    /// Horizontal distance from the strut to the arch's end.
    pub reach: f64,
    /// Height of the arch's end above the strut top.
    pub rise: f64,
    /// How far the arch bulges, in `[0, 1]`.
    pub curvature: f64,
    /// Sections along the arch (≥ 3).
    pub arch_segments: usize,
    /// Cross-section scale at the arch's end relative to its start.
    pub end_scale: f64,
}

impl Default for FlyingButtressParams {
    fn default() -> Self {
        Self {
            height: 3.0,
            base_radius: 0.35,
            top_radius: 0.25,
            sides: 6,
            reach: 2.0,
            rise: 1.0,
            curvature: 0.3,
            arch_segments: 8,
            end_scale: 0.6,
        }
    }
}

impl FlyingButtressParams {
    /// Buttress with the given strut height and arch reach.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] for a non-positive
    /// height or reach.
    pub fn new(height: f64, reach: f64) -> GenerateResult<Self> {
        let params = Self {
            height,
            reach,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the strut radii.
    #[must_use]
    pub fn with_radii(mut self, base_radius: f64, top_radius: f64) -> Self {
        self.base_radius = base_radius;
        self.top_radius = top_radius;
        self
    }

    /// Set the number of sides.
    #[must_use]
    pub fn with_sides(mut self, sides: usize) -> Self {
        self.sides = sides;
        self
    }

    /// Set the arch's end height.
    #[must_use]
    pub fn with_rise(mut self, rise: f64) -> Self {
        self.rise = rise;
        self
    }

    /// Set the arch curvature.
    #[must_use]
    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = curvature;
        self
    }

    /// Set the number of arch sections.
    #[must_use]
    pub fn with_arch_segments(mut self, arch_segments: usize) -> Self {
        self.arch_segments = arch_segments;
        self
    }

    /// Set the arch's end taper.
    #[must_use]
    pub fn with_end_scale(mut self, end_scale: f64) -> Self {
        self.end_scale = end_scale;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("height", self.height)?;
        require_positive("base_radius", self.base_radius)?;
        require_positive("top_radius", self.top_radius)?;
        if self.top_radius > self.base_radius {
            return Err(GenerateError::invalid(
                "top_radius",
                format!(
                    "{} exceeds the base radius {}; the strut must taper",
                    self.top_radius, self.base_radius
                ),
            ));
        }
        require_count("sides", self.sides, 3)?;
        require_positive("reach", self.reach)?;
        require_positive("rise", self.rise)?;
        require_unit("curvature", self.curvature)?;
        require_count("arch_segments", self.arch_segments, 3)?;
        require_positive("end_scale", self.end_scale)?;
        Ok(())
    }

    /// Centre line of the arch.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn arch_path(&self) -> GenerateResult<CurvePath> {
        self.validate()?;
        let pull = (self.reach + self.rise) * (0.5 + self.curvature);
        let curve = CubicBezier::from_hermite(
            Point3::new(0.0, 0.0, self.height),
            Vector3::z() * pull,
            Point3::new(self.reach, 0.0, self.height + self.rise),
            Vector3::x() * pull,
        );
        Ok(curve.sample(self.arch_segments)?)
    }
}

/// Build a flying buttress.
///
/// The strut is a capped loft between two regular polygons. The arch is the
/// strut's top polygon swept along [`FlyingButtressParams::arch_path`],
/// tapering to `end_scale` and capped only at its far end; its open start is
/// welded into the strut's top face, so the buttress is one closed solid.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters, or
/// a merge error if the arch cannot be welded on.
///
/// # Example
///
/// ```
/// use mesh_gothic::{FlyingButtressParams, generate_flying_buttress};
///
/// let buttress = generate_flying_buttress(&FlyingButtressParams::default()).unwrap();
/// assert_eq!(buttress.elements, ["strut", "arch"]);
/// assert!(buttress.mesh.adjacency().is_watertight());
/// ```
pub fn generate_flying_buttress(params: &FlyingButtressParams) -> GenerateResult<Structure> {
    let path = params.arch_path()?;
    let sections = [
        circle(Point3::origin(), params.base_radius, Vector3::z(), params.sides)?,
        circle(
            Point3::new(0.0, 0.0, params.height),
            params.top_radius,
            Vector3::z(),
            params.sides,
        )?,
    ];
    let mut strut = loft(&sections, &LoftOptions::default())?;
    let top = strut.face_count() - 1;

    let options = SweepOptions::default()
        .with_initial_normal(Vector3::x())
        .with_caps(Caps::END)
        .with_taper(1.0, params.end_scale, path.len());
    let arch = sweep(&polygon_profile(params.top_radius, params.sides)?, &path, &options)?;

    let report = weld(&mut strut, &arch, &InsertionBoundary::Face(top))?;
    debug!(
        "Flying buttress: {}-sided strut, {} arch sections, {report}",
        params.sides,
        path.len()
    );
    Ok(Structure::from_mesh(
        StructureKind::FlyingButtress,
        strut,
        vec!["strut".to_string(), "arch".to_string()],
    ))
}

// =============================================================================
// Divine flying buttress
// =============================================================================

/// Parameters for [`generate_divine_buttress`].
///
/// The pier stands centred on the origin. The arch springs from the middle
/// of the pier's top and lands `arch_span` along +X at the same height.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DivineButtressParams {
    /// Pier extent along X.
    pub pier_width: f64,
    /// Pier extent along Y.
    pub pier_depth: f64,
    /// Pier extent along Z.
    pub pier_height: f64,
    /// Distance between the arch's feet.
    pub arch_span: f64,
    /// Height of the arch's apex above the pier top.
    pub arch_height: f64,
    /// Arch band extent along Y, less than `pier_depth`.
    pub arch_thickness: f64,
    /// Arch band width in the arch's plane, less than `pier_width`.
    pub band_width: f64,
    /// Sections along the arch (≥ 3).
    pub arch_segments: usize,
}

impl Default for DivineButtressParams {
    fn default() -> Self {
        Self {
            pier_width: 1.0,
            pier_depth: 1.0,
            pier_height: 5.0,
            arch_span: 4.0,
            arch_height: 3.0,
            arch_thickness: 0.5,
            band_width: 0.3,
            arch_segments: 12,
        }
    }
}

impl DivineButtressParams {
    /// Buttress with the given pier height and arch span.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] for a non-positive
    /// height or span.
    pub fn new(pier_height: f64, arch_span: f64) -> GenerateResult<Self> {
        let params = Self {
            pier_height,
            arch_span,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the pier footprint.
    #[must_use]
    pub fn with_pier(mut self, width: f64, depth: f64) -> Self {
        self.pier_width = width;
        self.pier_depth = depth;
        self
    }

    /// Set the arch's apex height.
    #[must_use]
    pub fn with_arch_height(mut self, arch_height: f64) -> Self {
        self.arch_height = arch_height;
        self
    }

    /// Set the arch band's cross-section.
    #[must_use]
    pub fn with_band(mut self, band_width: f64, arch_thickness: f64) -> Self {
        self.band_width = band_width;
        self.arch_thickness = arch_thickness;
        self
    }

    /// Set the number of arch sections.
    #[must_use]
    pub fn with_arch_segments(mut self, arch_segments: usize) -> Self {
        self.arch_segments = arch_segments;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("pier_width", self.pier_width)?;
        require_positive("pier_depth", self.pier_depth)?;
        require_positive("pier_height", self.pier_height)?;
        require_positive("arch_span", self.arch_span)?;
        require_positive("arch_height", self.arch_height)?;
        require_positive("arch_thickness", self.arch_thickness)?;
        require_positive("band_width", self.band_width)?;
        require_count("arch_segments", self.arch_segments, 3)?;
        if self.band_width >= self.pier_width {
            return Err(GenerateError::invalid(
                "band_width",
                "arch band must be narrower than the pier",
            ));
        }
        if self.arch_thickness >= self.pier_depth {
            return Err(GenerateError::invalid(
                "arch_thickness",
                "arch band must be thinner than the pier",
            ));
        }
        Ok(())
    }
}

/// Build a divine flying buttress.
///
/// The pier's top face is inset and the inset loop is reshaped into the
/// arch band's footprint. The arch is a rectangular band swept along a
/// pointed arch with fixed-plane frames, capped at its far foot, and its
/// open near foot is welded into the inset face.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters, or
/// a merge error if the arch cannot be welded on.
///
/// # Example
///
/// ```
/// use mesh_gothic::{DivineButtressParams, generate_divine_buttress};
///
/// let buttress = generate_divine_buttress(&DivineButtressParams::default()).unwrap();
/// assert_eq!(buttress.elements, ["pier", "arch"]);
/// assert!(buttress.mesh.adjacency().is_watertight());
/// ```
pub fn generate_divine_buttress(params: &DivineButtressParams) -> GenerateResult<Structure> {
    params.validate()?;
    let (hw, hd, h) = (
        params.pier_width / 2.0,
        params.pier_depth / 2.0,
        params.pier_height,
    );
    let footprint = CurvePath::closed(vec![
        Point3::new(-hw, -hd, 0.0),
        Point3::new(hw, -hd, 0.0),
        Point3::new(hw, hd, 0.0),
        Point3::new(-hw, hd, 0.0),
    ])?;
    let mut pier = extrude(&footprint, Vector3::z() * h, Caps::BOTH)?;
    let top = pier.face_count() - 1;

    // Reshape the inset loop into the band's footprint, corner for corner
    let inset = pier.inset_face(top, 0.5)?;
    let (bx, by) = (params.band_width / 2.0, params.arch_thickness / 2.0);
    for &v in &inset.inner_loop {
        if let Some(p) = pier.position(v) {
            pier.set_position(v, Point3::new(bx * p.x.signum(), by * p.y.signum(), h))?;
        }
    }

    let path = pointed_arch(params.arch_span, params.arch_height, params.arch_segments)?
        .translated(Vector3::new(params.arch_span / 2.0, 0.0, h));
    let options = SweepOptions::default()
        .in_plane(Vector3::y())
        .with_caps(Caps::END);
    let arch = sweep(
        &rectangle_profile(params.band_width, params.arch_thickness)?,
        &path,
        &options,
    )?;

    let report = weld(&mut pier, &arch, &InsertionBoundary::Face(inset.face))?;
    debug!(
        "Divine buttress: {} arch sections, {report}",
        params.arch_segments
    );
    Ok(Structure::from_mesh(
        StructureKind::DivineButtress,
        pier,
        vec!["pier".to_string(), "arch".to_string()],
    ))
}
