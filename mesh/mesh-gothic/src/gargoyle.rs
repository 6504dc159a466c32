//! Gargoyle spouts.

use std::f64::consts::TAU;

use curve_types::{CubicBezier, Curve, CurvePath};
use mesh_from_curves::{SweepOptions, polygon_profile, sweep};
use nalgebra::{Isometry3, Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{
    GenerateError, GenerateResult, require_count, require_non_negative, require_positive,
};
use crate::structure::{Structure, StructureKind};

/// Parameters for [`generate_gargoyles`].
///
/// One spout leaves the point `(ring_radius, 0, height)` heading out along
/// +X and drooping by `drop` at its tip; the others are copies turned about
/// Z at equal angles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GargoyleParams {
    /// Horizontal length of a spout.
    pub length: f64,
    /// How far the tip hangs below the root.
    pub drop: f64,
    /// Section circumradius at the root.
    pub base_radius: f64,
    /// Section circumradius at the tip.
    pub tip_radius: f64,
    /// Sides of the section (≥ 3).
    pub sides: usize,
    /// Sections along the spout (≥ 3).
    pub segments: usize,
    /// Number of spouts (≥ 1).
    pub count: usize,
    /// Distance of the spout roots from the Z axis.
    pub ring_radius: f64,
    /// Height of the spout roots.
    pub height: f64,
}

impl Default for GargoyleParams {
    fn default() -> Self {
        Self {
            length: 1.5,
            drop: 0.5,
            base_radius: 0.2,
            tip_radius: 0.08,
            sides: 8,
            segments: 10,
            count: 4,
            ring_radius: 2.0,
            height: 10.0,
        }
    }
}

impl GargoyleParams {
    /// `count` spouts around a ring at the given radius and height.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// if the values are out of range.
    pub fn new(count: usize, ring_radius: f64, height: f64) -> GenerateResult<Self> {
        let params = Self {
            count,
            ring_radius,
            height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the spout's length and droop.
    #[must_use]
    pub fn with_spout(mut self, length: f64, drop: f64) -> Self {
        self.length = length;
        self.drop = drop;
        self
    }

    /// Set the section radii at root and tip.
    #[must_use]
    pub fn with_radii(mut self, base_radius: f64, tip_radius: f64) -> Self {
        self.base_radius = base_radius;
        self.tip_radius = tip_radius;
        self
    }

    /// Set the section and path resolution.
    #[must_use]
    pub fn with_resolution(mut self, sides: usize, segments: usize) -> Self {
        self.sides = sides;
        self.segments = segments;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// naming the first parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("length", self.length)?;
        require_non_negative("drop", self.drop)?;
        require_positive("base_radius", self.base_radius)?;
        require_positive("tip_radius", self.tip_radius)?;
        require_count("sides", self.sides, 3)?;
        require_count("segments", self.segments, 3)?;
        require_count("count", self.count, 1)?;
        require_non_negative("ring_radius", self.ring_radius)?;
        if !self.height.is_finite() {
            return Err(GenerateError::invalid("height", "must be finite"));
        }
        Ok(())
    }

    /// Centre line of a single spout rooted at the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn spout_path(&self) -> GenerateResult<CurvePath> {
        self.validate()?;
        let l = self.length;
        let curve = CubicBezier::new(
            Point3::origin(),
            Point3::new(l / 3.0, 0.0, 0.0),
            Point3::new(2.0 * l / 3.0, 0.0, 0.0),
            Point3::new(l, 0.0, -self.drop),
        );
        Ok(curve.sample(self.segments)?)
    }
}

/// Build a ring of gargoyle spouts.
///
/// A polygon section is swept along [`GargoyleParams::spout_path`],
/// tapering from `base_radius` to `tip_radius`, and capped at both ends.
/// Each instance is turned into place about Z; spouts are separate closed
/// solids.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`](crate::GenerateError) for
/// invalid parameters.
///
/// # Example
///
/// ```
/// use mesh_gothic::{GargoyleParams, generate_gargoyles};
///
/// let gargoyles = generate_gargoyles(&GargoyleParams::new(6, 3.0, 12.0).unwrap()).unwrap();
/// assert_eq!(gargoyles.element_count(), 6);
/// ```
pub fn generate_gargoyles(params: &GargoyleParams) -> GenerateResult<Structure> {
    let path = params.spout_path()?;
    let options = SweepOptions::default()
        .with_initial_normal(Vector3::z())
        .with_taper(1.0, params.tip_radius / params.base_radius, path.len());
    let spout = sweep(&polygon_profile(params.base_radius, params.sides)?, &path, &options)?;

    let mut structure = Structure::new(StructureKind::Gargoyle);
    for k in 0..params.count {
        let angle = TAU * k as f64 / params.count as f64;
        let placement = Isometry3::new(
            Vector3::new(
                params.ring_radius * angle.cos(),
                params.ring_radius * angle.sin(),
                params.height,
            ),
            Vector3::z() * angle,
        );
        let mut instance = spout.clone();
        instance.transform(&placement);
        structure.add_part(format!("gargoyle-{k}"), &instance);
    }

    debug!(
        "Gargoyles: {} spouts of {} faces each",
        params.count,
        spout.face_count()
    );
    Ok(structure)
}
